//! stockbook-core
//!
//! Daily inventory reconciliation engine for Stockbook.
//! Depends on stockbook-domain. No CLI, no terminal I/O; persistence goes through [`LedgerStore`].

pub mod carry_forward_service;
pub mod error;
pub mod ledger_service;
pub mod memory_store;
pub mod public_api;
pub mod storage;
pub mod sync_service;
pub mod time;


pub use carry_forward_service::*;
pub use error::CoreError;
pub use ledger_service::*;
pub use memory_store::InMemoryLedgerStore;
pub use storage::LedgerStore;
pub use sync_service::*;
