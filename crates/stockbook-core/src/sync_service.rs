//! Post-save hooks that propagate figures between related department ledgers.

use std::collections::HashMap;

use stockbook_domain::{Department, DepartmentCatalog, ItemId, LedgerKey, LedgerRecord, LineItem};
use tracing::{debug, info};

use crate::{storage::LedgerStore, CoreError};

/// Everything a hook may read while reacting to a save.
pub struct HookContext<'a> {
    /// The record being saved, as submitted by the caller.
    pub record: &'a LedgerRecord,
    pub store: &'a dyn LedgerStore,
    pub catalog: &'a DepartmentCatalog,
}

/// Reacts to an explicit save of a department ledger by updating linked ledgers.
pub trait SaveHook: Send + Sync {
    fn name(&self) -> &'static str;

    /// The linked ledger this hook writes when `source` is saved.
    fn target(&self, source: &LedgerKey) -> LedgerKey;

    /// Returns the key of the linked record it wrote, if any.
    fn run(&self, ctx: &HookContext<'_>) -> Result<Option<LedgerKey>, CoreError>;
}

/// Hooks keyed by the department whose save triggers them.
#[derive(Default)]
pub struct SaveHookRegistry {
    hooks: HashMap<Department, Vec<Box<dyn SaveHook>>>,
}

impl SaveHookRegistry {
    /// A registry with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard wiring: Cashier saves feed the Bakery ledger.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Department::Cashier, Box::new(CashierBakerySync));
        registry
    }

    pub fn register(&mut self, department: Department, hook: Box<dyn SaveHook>) {
        self.hooks.entry(department).or_default().push(hook);
    }

    pub fn hooks_for(&self, department: Department) -> &[Box<dyn SaveHook>] {
        self.hooks
            .get(&department)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }
}

/// Items touched by a Cashier to Bakery propagation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub updated: Vec<ItemId>,
    /// Bakery items with no Cashier row of the same id; left as they were.
    pub missed: Vec<ItemId>,
}

/// Copies each Cashier item's `delivery` into the Bakery item's `cashier_out` and `production`.
pub struct CashierBakerySync;

impl CashierBakerySync {
    pub fn apply(bakery: &mut [LineItem], cashier: &[LineItem]) -> SyncReport {
        let mut report = SyncReport::default();
        for item in bakery.iter_mut() {
            match cashier.iter().find(|source| source.id == item.id) {
                Some(source) => {
                    item.cashier_out = source.delivery;
                    item.production = source.delivery;
                    report.updated.push(item.id);
                }
                None => {
                    debug!(item_id = item.id, item_name = %item.name, "no cashier row for bakery item");
                    report.missed.push(item.id);
                }
            }
        }
        report
    }
}

impl SaveHook for CashierBakerySync {
    fn name(&self) -> &'static str {
        "cashier-to-bakery"
    }

    fn target(&self, source: &LedgerKey) -> LedgerKey {
        source.with_department(Department::Bakery)
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<Option<LedgerKey>, CoreError> {
        let bakery_key = self.target(&ctx.record.key);
        let mut bakery = match ctx.store.load(&bakery_key)? {
            Some(existing) if !existing.is_empty() => existing,
            _ => {
                info!(key = %bakery_key, "no bakery ledger yet; seeding from catalog");
                ctx.catalog.template(&bakery_key)
            }
        };

        let report = Self::apply(&mut bakery.main, &ctx.record.main);
        bakery.recompute_endings();
        ctx.store.save(&bakery)?;
        info!(
            key = %bakery_key,
            updated = report.updated.len(),
            missed = report.missed.len(),
            "bakery ledger synchronized from cashier"
        );
        Ok(Some(bakery_key))
    }
}
