//! Process-local [`LedgerStore`] used for embedding and tests.

use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::NaiveDate;
use stockbook_domain::{Branch, Department, LedgerKey, LedgerRecord, LineItem};

use crate::{storage::LedgerStore, CoreError};

/// Keeps records as flat item lists, the same shape the JSON store persists.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    records: RwLock<HashMap<LedgerKey, Vec<LineItem>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<LedgerKey, Vec<LineItem>>>, CoreError> {
        self.records
            .read()
            .map_err(|_| CoreError::Storage("ledger store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<LedgerKey, Vec<LineItem>>>, CoreError> {
        self.records
            .write()
            .map_err(|_| CoreError::Storage("ledger store lock poisoned".into()))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self, key: &LedgerKey) -> Result<Option<LedgerRecord>, CoreError> {
        let records = self.read()?;
        Ok(records
            .get(key)
            .map(|items| LedgerRecord::from_flat(key.clone(), items.clone())))
    }

    fn save(&self, record: &LedgerRecord) -> Result<(), CoreError> {
        self.write()?.insert(record.key.clone(), record.to_flat());
        Ok(())
    }

    fn delete(&self, key: &LedgerKey) -> Result<bool, CoreError> {
        Ok(self.write()?.remove(key).is_some())
    }

    fn list_dates(
        &self,
        branch: &Branch,
        department: Department,
    ) -> Result<Vec<NaiveDate>, CoreError> {
        let mut dates: Vec<NaiveDate> = self
            .read()?
            .keys()
            .filter(|key| &key.branch == branch && key.department == department)
            .map(|key| key.date)
            .collect();
        dates.sort();
        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_domain::PREP_ID_BASE;

    fn key(day: u32) -> LedgerKey {
        LedgerKey::new(
            NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            Branch::new("Main Branch").unwrap(),
            Department::MainKitchen,
        )
    }

    #[test]
    fn save_replaces_and_load_splits_prep_rows() {
        let store = InMemoryLedgerStore::new();
        let record = LedgerRecord::from_parts(
            key(1),
            vec![LineItem::new(1, "Adobo")],
            vec![LineItem::new(PREP_ID_BASE, "Garlic Rice")],
        );
        store.save(&record).unwrap();
        store.save(&record).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(&key(1)).unwrap(), Some(record));
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let store = InMemoryLedgerStore::new();
        store.save(&LedgerRecord::new(key(2))).unwrap();
        assert!(store.delete(&key(2)).unwrap());
        assert!(!store.delete(&key(2)).unwrap());
        assert_eq!(store.load(&key(2)).unwrap(), None);
    }

    #[test]
    fn list_dates_filters_by_branch_and_department() {
        let store = InMemoryLedgerStore::new();
        store.save(&LedgerRecord::new(key(3))).unwrap();
        store.save(&LedgerRecord::new(key(1))).unwrap();
        store
            .save(&LedgerRecord::new(key(2).with_department(Department::Bar)))
            .unwrap();
        let dates = store
            .list_dates(&Branch::new("Main Branch").unwrap(), Department::MainKitchen)
            .unwrap();
        assert_eq!(dates, vec![key(1).date, key(3).date]);
    }
}
