use std::sync::Arc;

use chrono::NaiveDate;
use stockbook_domain::{Branch, Department, LedgerKey, LedgerRecord};

use crate::CoreError;

/// Persistence collaborator the engine reads and writes ledgers through.
///
/// `load` returning `Ok(None)` means no record exists for the key; an `Err` is a store outage
/// and must never be read as "nothing saved". `save` replaces the whole record and is safe
/// to repeat with identical data. `delete` reports whether a record was removed.
pub trait LedgerStore: Send + Sync {
    fn load(&self, key: &LedgerKey) -> Result<Option<LedgerRecord>, CoreError>;
    fn save(&self, record: &LedgerRecord) -> Result<(), CoreError>;
    fn delete(&self, key: &LedgerKey) -> Result<bool, CoreError>;
    /// Dates with a saved record for the branch and department, ascending.
    fn list_dates(&self, branch: &Branch, department: Department)
        -> Result<Vec<NaiveDate>, CoreError>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for Arc<S> {
    fn load(&self, key: &LedgerKey) -> Result<Option<LedgerRecord>, CoreError> {
        (**self).load(key)
    }

    fn save(&self, record: &LedgerRecord) -> Result<(), CoreError> {
        (**self).save(record)
    }

    fn delete(&self, key: &LedgerKey) -> Result<bool, CoreError> {
        (**self).delete(key)
    }

    fn list_dates(
        &self,
        branch: &Branch,
        department: Department,
    ) -> Result<Vec<NaiveDate>, CoreError> {
        (**self).list_dates(branch, department)
    }
}
