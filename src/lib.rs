#![doc(test(attr(deny(warnings))))]

//! Stockbook records daily inventory movements per branch and department and
//! reconciles them: ending balances, carry-forward into the next day, and
//! Cashier to Bakery synchronization on save.
//!
//! The engine lives in the workspace crates; this crate wires them into the
//! `stockbook_cli` shell.

pub mod cli;
pub mod errors;
pub mod utils;

pub use errors::StockbookError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Stockbook tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
