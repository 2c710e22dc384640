//! Stable, public-facing helpers that wrap the internal service layer.
//!
//! Presentation layers (CLI, GUI) call these instead of the individual services. Failures come
//! back as `Err`; "no record" and "no match" are ordinary outcomes, never errors.

use stockbook_domain::{LedgerKey, LedgerKind, LedgerRecord, LineItem, TotalsRow};

use crate::{ledger_service::LedgerEngine, CoreError};

/// Beginnings for a day, with the catalog template already substituted when carry-forward
/// found nothing.
#[derive(Debug, Clone)]
pub struct ApiBeginnings {
    pub record: LedgerRecord,
    /// True when yesterday's endings were used.
    pub resolved: bool,
}

/// Summary of a save for status messages.
#[derive(Debug, Clone)]
pub struct ApiSaveSummary {
    pub record: LedgerRecord,
    pub synced_bakery: bool,
    pub message: String,
}

/// Summary of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiDeleteSummary {
    pub deleted: bool,
}

/// Zero-valued catalog template for the key's department.
pub fn api_default_catalog(engine: &LedgerEngine, key: &LedgerKey) -> LedgerRecord {
    engine.default_catalog(key)
}

/// Carries yesterday's endings forward, falling back to the catalog template.
///
/// Endings are left as produced; run [`api_recompute_ending`] (or
/// [`LedgerRecord::recompute_endings`]) before showing them.
pub fn api_resolve_beginnings(
    engine: &LedgerEngine,
    key: &LedgerKey,
) -> Result<ApiBeginnings, CoreError> {
    Ok(match engine.resolve_beginnings(key)? {
        Some(carried) => ApiBeginnings {
            record: carried.record,
            resolved: true,
        },
        None => ApiBeginnings {
            record: engine.default_catalog(key),
            resolved: false,
        },
    })
}

/// Ending balance of one row under its sub-ledger's formula.
pub fn api_recompute_ending(item: &LineItem, kind: LedgerKind) -> f64 {
    LedgerEngine::recompute_ending(item, kind.formula())
}

/// Footer totals of one sub-ledger.
pub fn api_aggregate_totals(items: &[LineItem], kind: LedgerKind) -> TotalsRow {
    LedgerEngine::aggregate_totals(items, kind.formula())
}

/// Persists the record and reports whether the Bakery ledger was synchronized.
pub fn api_save_ledger(
    engine: &LedgerEngine,
    record: &LedgerRecord,
) -> Result<ApiSaveSummary, CoreError> {
    let outcome = engine.save_ledger(record)?;
    let synced_bakery = outcome.synced_bakery();
    let mut message = format!("Saved {} ledger for {}.", record.key.department, record.key.date);
    if synced_bakery {
        message.push_str(" Bakery ledger updated from cashier deliveries.");
    }
    Ok(ApiSaveSummary {
        record: outcome.record,
        synced_bakery,
        message,
    })
}

/// Deletes the record for the key.
pub fn api_delete_ledger(
    engine: &LedgerEngine,
    key: &LedgerKey,
) -> Result<ApiDeleteSummary, CoreError> {
    Ok(ApiDeleteSummary {
        deleted: engine.delete_ledger(key)?,
    })
}
