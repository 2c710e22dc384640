//! Ledger records keyed by (date, branch, department).

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    common::ItemId,
    department::{Branch, Department, LedgerKind},
    line_item::LineItem,
};

/// First id of the reserved prep range. Main-ledger ids stay below it.
pub const PREP_ID_BASE: ItemId = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Composite persistence key of a ledger record.
pub struct LedgerKey {
    pub date: NaiveDate,
    pub branch: Branch,
    pub department: Department,
}

impl LedgerKey {
    pub fn new(date: NaiveDate, branch: Branch, department: Department) -> Self {
        Self {
            date,
            branch,
            department,
        }
    }

    /// Same branch and department, one calendar day earlier.
    pub fn previous_day(&self) -> Option<Self> {
        self.shifted(-1)
    }

    /// Same branch and department, `days` calendar days away.
    pub fn shifted(&self, days: i64) -> Option<Self> {
        let date = if days >= 0 {
            self.date.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.date.checked_sub_days(Days::new(days.unsigned_abs()))
        }?;
        Some(Self {
            date,
            ..self.clone()
        })
    }

    /// Same date and branch, another department.
    pub fn with_department(&self, department: Department) -> Self {
        Self {
            department,
            ..self.clone()
        }
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.date, self.branch, self.department)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Line items for one (date, branch, department), with the optional prep sub-ledger.
pub struct LedgerRecord {
    pub key: LedgerKey,
    #[serde(default)]
    pub main: Vec<LineItem>,
    #[serde(default)]
    pub prep: Vec<LineItem>,
}

impl LedgerRecord {
    pub fn new(key: LedgerKey) -> Self {
        Self {
            key,
            main: Vec::new(),
            prep: Vec::new(),
        }
    }

    pub fn from_parts(key: LedgerKey, main: Vec<LineItem>, prep: Vec<LineItem>) -> Self {
        Self { key, main, prep }
    }

    /// Rebuilds a record from a flat payload, splitting prep rows by id range.
    pub fn from_flat(key: LedgerKey, items: Vec<LineItem>) -> Self {
        let (prep, main): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| LedgerKind::of_id(item.id) == LedgerKind::Prep);
        Self { key, main, prep }
    }

    /// Main rows followed by prep rows, the layout stores persist.
    pub fn to_flat(&self) -> Vec<LineItem> {
        self.main.iter().chain(self.prep.iter()).cloned().collect()
    }

    pub fn items(&self, kind: LedgerKind) -> &[LineItem] {
        match kind {
            LedgerKind::Main => &self.main,
            LedgerKind::Prep => &self.prep,
        }
    }

    pub fn items_mut(&mut self, kind: LedgerKind) -> &mut Vec<LineItem> {
        match kind {
            LedgerKind::Main => &mut self.main,
            LedgerKind::Prep => &mut self.prep,
        }
    }

    pub fn item(&self, kind: LedgerKind, id: ItemId) -> Option<&LineItem> {
        self.items(kind).iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, kind: LedgerKind, id: ItemId) -> Option<&mut LineItem> {
        self.items_mut(kind).iter_mut().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.prep.is_empty()
    }

    pub fn len(&self) -> usize {
        self.main.len() + self.prep.len()
    }

    /// Recomputes every stored ending with the formula of its sub-ledger.
    pub fn recompute_endings(&mut self) {
        for kind in LedgerKind::BOTH {
            let formula = kind.formula();
            for item in self.items_mut(kind) {
                item.refresh_ending(formula);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(y: i32, m: u32, d: u32) -> LedgerKey {
        LedgerKey::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            Branch::new("Main Branch").unwrap(),
            Department::MainKitchen,
        )
    }

    #[test]
    fn previous_day_crosses_month_and_year_boundaries() {
        assert_eq!(key(2024, 3, 1).previous_day().unwrap().date, key(2024, 2, 29).date);
        assert_eq!(key(2023, 3, 1).previous_day().unwrap().date, key(2023, 2, 28).date);
        assert_eq!(key(2025, 1, 1).previous_day().unwrap().date, key(2024, 12, 31).date);
    }

    #[test]
    fn flat_layout_splits_back_by_id_range() {
        let record = LedgerRecord::from_parts(
            key(2024, 5, 1),
            vec![LineItem::new(1, "Adobo"), LineItem::new(2, "Sinigang")],
            vec![LineItem::new(PREP_ID_BASE, "Garlic Rice")],
        );
        let flat = record.to_flat();
        assert_eq!(
            flat.iter().map(|item| item.id).collect::<Vec<_>>(),
            vec![1, 2, PREP_ID_BASE]
        );
        let rebuilt = LedgerRecord::from_flat(record.key.clone(), flat);
        assert_eq!(rebuilt, record);
    }

    #[test]
    fn recompute_uses_prep_formula_for_prep_rows() {
        let mut main = LineItem::new(1, "Adobo");
        main.beginning = 5.0;
        main.sold = 2.0;
        let mut prep = LineItem::new(PREP_ID_BASE, "Garlic Rice");
        prep.beginning = 5.0;
        prep.sold = 2.0;
        let mut record = LedgerRecord::from_parts(key(2024, 5, 1), vec![main], vec![prep]);
        record.recompute_endings();
        assert_eq!(record.main[0].ending, 5.0);
        assert_eq!(record.prep[0].ending, 3.0);
    }
}
