//! Footer totals for a ledger.

use serde::{Deserialize, Serialize};

use crate::line_item::{EndingFormula, Field, LineItem};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Column sums across every item of a ledger.
pub struct TotalsRow {
    pub item_count: usize,
    pub beginning: f64,
    pub production: f64,
    pub delivery: f64,
    pub returned: f64,
    pub over: f64,
    pub used: f64,
    pub cashier_out: f64,
    pub bar_out: f64,
    pub kitchen_out: f64,
    pub one_branch_out: f64,
    pub foodtrays: f64,
    pub event: f64,
    pub spoilage: f64,
    pub short: f64,
    pub sold: f64,
    /// Sum of freshly computed endings; stored endings are ignored.
    pub ending: f64,
}

impl TotalsRow {
    pub fn aggregate(items: &[LineItem], formula: EndingFormula) -> Self {
        items.iter().fold(Self::default(), |mut totals, item| {
            totals.add(item, formula);
            totals
        })
    }

    fn add(&mut self, item: &LineItem, formula: EndingFormula) {
        self.item_count += 1;
        for field in Field::ALL {
            let sum = self.get(field) + item.get(field);
            self.set(field, sum);
        }
        self.ending += formula.ending(item);
    }

    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Beginning => self.beginning,
            Field::Production => self.production,
            Field::Delivery => self.delivery,
            Field::Returned => self.returned,
            Field::Over => self.over,
            Field::Used => self.used,
            Field::CashierOut => self.cashier_out,
            Field::BarOut => self.bar_out,
            Field::KitchenOut => self.kitchen_out,
            Field::OneBranchOut => self.one_branch_out,
            Field::Foodtrays => self.foodtrays,
            Field::Event => self.event,
            Field::Spoilage => self.spoilage,
            Field::Short => self.short,
            Field::Sold => self.sold,
        }
    }

    fn set(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::Beginning => &mut self.beginning,
            Field::Production => &mut self.production,
            Field::Delivery => &mut self.delivery,
            Field::Returned => &mut self.returned,
            Field::Over => &mut self.over,
            Field::Used => &mut self.used,
            Field::CashierOut => &mut self.cashier_out,
            Field::BarOut => &mut self.bar_out,
            Field::KitchenOut => &mut self.kitchen_out,
            Field::OneBranchOut => &mut self.one_branch_out,
            Field::Foodtrays => &mut self.foodtrays,
            Field::Event => &mut self.event,
            Field::Spoilage => &mut self.spoilage,
            Field::Short => &mut self.short,
            Field::Sold => &mut self.sold,
        };
        *slot = value;
    }
}
