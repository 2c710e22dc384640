//! Seeds a day's beginning balances from the previous calendar day's endings.

use stockbook_domain::{
    quantity, same_identity, DepartmentCatalog, ItemId, LedgerKey, LedgerKind, LedgerRecord,
    LineItem,
};
use tracing::{debug, info};

use crate::{storage::LedgerStore, CoreError};

/// Match results for one sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: LedgerKind,
    /// False when the prior day had no rows for this sub-ledger.
    pub source_found: bool,
    pub matched: Vec<ItemId>,
    /// Catalog items with no counterpart in the prior day's rows.
    pub missed: Vec<ItemId>,
}

/// A record whose beginnings were carried forward, with per-kind match details.
#[derive(Debug, Clone, PartialEq)]
pub struct CarryForward {
    pub record: LedgerRecord,
    pub reports: Vec<KindReport>,
}

impl CarryForward {
    pub fn report(&self, kind: LedgerKind) -> Option<&KindReport> {
        self.reports.iter().find(|report| report.kind == kind)
    }
}

pub struct CarryForwardService;

impl CarryForwardService {
    /// Builds the day's record from the current catalog with beginnings taken from yesterday.
    ///
    /// Returns `Ok(None)` when yesterday has no record or an empty one. Endings in the returned
    /// record are untouched; callers recompute them before display.
    pub fn resolve_beginnings(
        store: &dyn LedgerStore,
        catalog: &DepartmentCatalog,
        key: &LedgerKey,
    ) -> Result<Option<CarryForward>, CoreError> {
        let prior_key = key.previous_day().ok_or_else(|| {
            CoreError::InvalidDate(format!("no calendar day precedes {}", key.date))
        })?;

        let prior = match store.load(&prior_key)? {
            Some(record) if !record.is_empty() => record,
            Some(_) => {
                info!(key = %key, prior = %prior_key, "prior-day record is empty; nothing to carry forward");
                return Ok(None);
            }
            None => {
                info!(key = %key, prior = %prior_key, "no prior-day record; nothing to carry forward");
                return Ok(None);
            }
        };

        let mut record = LedgerRecord::new(key.clone());
        let mut reports = Vec::with_capacity(LedgerKind::BOTH.len());
        for kind in LedgerKind::BOTH {
            let base = catalog.template_items(key.department, kind);
            let (items, report) = Self::carry_items(kind, base, prior.items(kind));
            *record.items_mut(kind) = items;
            reports.push(report);
        }

        Ok(Some(CarryForward { record, reports }))
    }

    /// Copies each prior ending into the matching base item's `beginning`.
    ///
    /// Matching requires equal ids and equal names after trim + lowercase. The prior ending
    /// is used as stored.
    pub fn carry_items(
        kind: LedgerKind,
        mut base: Vec<LineItem>,
        prior: &[LineItem],
    ) -> (Vec<LineItem>, KindReport) {
        let mut report = KindReport {
            kind,
            source_found: !prior.is_empty(),
            matched: Vec::new(),
            missed: Vec::new(),
        };
        if prior.is_empty() {
            return (base, report);
        }

        for item in base.iter_mut() {
            match prior.iter().find(|candidate| same_identity(*candidate, &*item)) {
                Some(previous) => {
                    item.beginning = quantity(previous.ending);
                    report.matched.push(item.id);
                }
                None => {
                    debug!(
                        kind = %kind,
                        item_id = item.id,
                        item_name = %item.name,
                        "carry-forward match miss"
                    );
                    report.missed.push(item.id);
                }
            }
        }
        (base, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior_row(id: ItemId, name: &str, ending: f64) -> LineItem {
        let mut item = LineItem::new(id, name);
        item.ending = ending;
        item
    }

    #[test]
    fn matches_on_id_and_normalized_name() {
        let base = vec![LineItem::new(5, "loaf"), LineItem::new(6, "Monay")];
        let prior = vec![prior_row(5, "  Loaf ", 12.0), prior_row(6, "Pandesal", 4.0)];
        let (items, report) = CarryForwardService::carry_items(LedgerKind::Main, base, &prior);
        assert_eq!(items[0].beginning, 12.0);
        assert_eq!(items[1].beginning, 0.0);
        assert_eq!(report.matched, vec![5]);
        assert_eq!(report.missed, vec![6]);
    }

    #[test]
    fn stored_ending_is_used_without_recomputation() {
        let mut previous = prior_row(1, "Ube Roll", 9.0);
        previous.beginning = 100.0;
        let (items, _) = CarryForwardService::carry_items(
            LedgerKind::Main,
            vec![LineItem::new(1, "Ube Roll")],
            &[previous],
        );
        assert_eq!(items[0].beginning, 9.0);
    }

    #[test]
    fn empty_prior_list_marks_source_missing() {
        let (items, report) = CarryForwardService::carry_items(
            LedgerKind::Prep,
            vec![LineItem::new(10_000, "Garlic Rice")],
            &[],
        );
        assert!(!report.source_found);
        assert!(report.missed.is_empty());
        assert_eq!(items[0].beginning, 0.0);
    }
}
