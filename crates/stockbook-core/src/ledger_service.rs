//! High-level ledger orchestration: open, save, and delete a day's ledger.

use stockbook_domain::{
    Department, DepartmentCatalog, EndingFormula, LedgerKey, LedgerRecord, LineItem, TotalsRow,
};
use tracing::{info, warn};

use crate::{
    carry_forward_service::{CarryForward, CarryForwardService, KindReport},
    storage::LedgerStore,
    sync_service::{HookContext, SaveHookRegistry},
    CoreError,
};

const DEFAULT_PRIMARY_WRITE_ATTEMPTS: u32 = 2;

/// Where the rows of an opened ledger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerSource {
    Stored,
    CarriedForward,
    Catalog,
}

/// A ready-to-edit ledger plus how it was obtained.
#[derive(Debug, Clone)]
pub struct OpenedLedger {
    pub record: LedgerRecord,
    pub source: LedgerSource,
    /// Match details when the record was carried forward.
    pub carry_forward: Vec<KindReport>,
}

/// Result of a successful save.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The record as persisted, endings recomputed.
    pub record: LedgerRecord,
    /// Linked ledgers written by post-save hooks.
    pub synced: Vec<LedgerKey>,
}

impl SaveOutcome {
    pub fn synced_bakery(&self) -> bool {
        self.synced
            .iter()
            .any(|key| key.department == Department::Bakery)
    }
}

/// Facade that coordinates the catalog, carry-forward, hooks, and persistence.
pub struct LedgerEngine {
    store: Box<dyn LedgerStore>,
    catalog: DepartmentCatalog,
    hooks: SaveHookRegistry,
    primary_write_attempts: u32,
}

impl LedgerEngine {
    /// Creates an engine with the default Cashier to Bakery hook.
    pub fn new(store: Box<dyn LedgerStore>, catalog: DepartmentCatalog) -> Self {
        Self {
            store,
            catalog,
            hooks: SaveHookRegistry::with_defaults(),
            primary_write_attempts: DEFAULT_PRIMARY_WRITE_ATTEMPTS,
        }
    }

    pub fn with_hooks(mut self, hooks: SaveHookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Attempts for the primary write once linked ledgers were already written. Minimum 1.
    pub fn with_primary_write_attempts(mut self, attempts: u32) -> Self {
        self.primary_write_attempts = attempts.max(1);
        self
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn catalog(&self) -> &DepartmentCatalog {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: DepartmentCatalog) {
        self.catalog = catalog;
    }

    /// Zero-valued record for the key, seeded from the catalog.
    pub fn default_catalog(&self, key: &LedgerKey) -> LedgerRecord {
        self.catalog.template(key)
    }

    pub fn resolve_beginnings(&self, key: &LedgerKey) -> Result<Option<CarryForward>, CoreError> {
        CarryForwardService::resolve_beginnings(self.store(), &self.catalog, key)
    }

    /// Loads the stored record, else carries yesterday forward, else seeds from the catalog.
    pub fn open_ledger(&self, key: &LedgerKey) -> Result<OpenedLedger, CoreError> {
        if let Some(record) = self.store.load(key)? {
            info!(key = %key, items = record.len(), "loaded stored ledger");
            return Ok(OpenedLedger {
                record,
                source: LedgerSource::Stored,
                carry_forward: Vec::new(),
            });
        }

        if let Some(CarryForward {
            mut record,
            reports,
        }) = self.resolve_beginnings(key)?
        {
            record.recompute_endings();
            info!(key = %key, "opened ledger with carried-forward beginnings");
            return Ok(OpenedLedger {
                record,
                source: LedgerSource::CarriedForward,
                carry_forward: reports,
            });
        }

        info!(key = %key, "opened ledger from catalog defaults");
        Ok(OpenedLedger {
            record: self.default_catalog(key),
            source: LedgerSource::Catalog,
            carry_forward: Vec::new(),
        })
    }

    pub fn recompute_ending(item: &LineItem, formula: EndingFormula) -> f64 {
        formula.ending(item)
    }

    pub fn aggregate_totals(items: &[LineItem], formula: EndingFormula) -> TotalsRow {
        TotalsRow::aggregate(items, formula)
    }

    /// Runs the department's post-save hooks, then persists the record with fresh endings.
    ///
    /// Hooks write first. If the primary write then fails, it is retried and finally reported
    /// as [`CoreError::PartialSync`] so callers can warn that linked ledgers may disagree.
    pub fn save_ledger(&self, record: &LedgerRecord) -> Result<SaveOutcome, CoreError> {
        let mut synced = Vec::new();
        let ctx = HookContext {
            record,
            store: self.store(),
            catalog: &self.catalog,
        };
        for hook in self.hooks.hooks_for(record.key.department) {
            match hook.run(&ctx) {
                Ok(Some(linked)) => synced.push(linked),
                Ok(None) => {}
                Err(err) if synced.is_empty() => return Err(err),
                Err(err) => {
                    let failed = hook.target(&record.key);
                    warn!(hook = hook.name(), key = %failed, error = %err, "linked ledger update failed");
                    return Err(CoreError::PartialSync {
                        written: synced,
                        failed,
                        message: format!("{} hook: {}", hook.name(), err),
                    });
                }
            }
        }

        let mut snapshot = record.clone();
        snapshot.recompute_endings();

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.save(&snapshot) {
                Ok(()) => break,
                Err(err) if synced.is_empty() => return Err(err),
                Err(err) if attempt < self.primary_write_attempts => {
                    warn!(key = %snapshot.key, attempt, error = %err, "retrying ledger save");
                }
                Err(err) => {
                    warn!(key = %snapshot.key, error = %err, "ledger save failed after linked updates");
                    return Err(CoreError::PartialSync {
                        written: synced,
                        failed: snapshot.key.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(key = %snapshot.key, items = snapshot.len(), linked = synced.len(), "saved ledger");
        Ok(SaveOutcome {
            record: snapshot,
            synced,
        })
    }

    /// Key of the same branch and department `days` away (negative steps go back).
    pub fn step_day(key: &LedgerKey, days: i64) -> Result<LedgerKey, CoreError> {
        key.shifted(days)
            .ok_or_else(|| CoreError::InvalidDate(format!("{} shifted by {} days", key.date, days)))
    }

    /// Removes the record entirely. `Ok(false)` means nothing was stored for the key.
    pub fn delete_ledger(&self, key: &LedgerKey) -> Result<bool, CoreError> {
        let deleted = self.store.delete(key)?;
        info!(key = %key, deleted, "delete ledger");
        Ok(deleted)
    }
}
