//! stockbook-domain
//!
//! Pure inventory ledger models (line items, ledger records, department catalogs, totals).
//! No I/O, no CLI, no storage. Only data types, formulas, and core enums.

pub mod catalog;
pub mod common;
pub mod department;
pub mod ledger;
pub mod line_item;
pub mod totals;

pub use catalog::*;
pub use common::*;
pub use department::*;
pub use ledger::*;
pub use line_item::*;
pub use totals::*;
