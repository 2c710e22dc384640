//! Per-item ledger rows and the ending-balance formulas.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::{lenient_quantity, quantity, Identifiable, ItemId, NamedEntity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One row of a ledger: the movements of a single item on a single day.
pub struct LineItem {
    pub id: ItemId,
    #[serde(alias = "item", default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub beginning: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub production: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub delivery: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub returned: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub over: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub used: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub cashier_out: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub bar_out: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub kitchen_out: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub one_branch_out: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub foodtrays: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub event: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub spoilage: f64,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub short: f64,
    /// Bookkeeping only; read by the prep formula as a stand-in for `foodtrays`.
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub sold: f64,
    /// Derived. Recomputed before every save, never trusted as input.
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub ending: f64,
}

impl LineItem {
    /// Creates a zero-valued row for the given catalog item.
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            beginning: 0.0,
            production: 0.0,
            delivery: 0.0,
            returned: 0.0,
            over: 0.0,
            used: 0.0,
            cashier_out: 0.0,
            bar_out: 0.0,
            kitchen_out: 0.0,
            one_branch_out: 0.0,
            foodtrays: 0.0,
            event: 0.0,
            spoilage: 0.0,
            short: 0.0,
            sold: 0.0,
            ending: 0.0,
        }
    }

    /// Ending balance under the main-ledger formula.
    pub fn computed_ending(&self) -> f64 {
        EndingFormula::Standard.ending(self)
    }

    /// Recomputes and stores `ending`, discarding the previous value.
    pub fn refresh_ending(&mut self, formula: EndingFormula) -> f64 {
        self.ending = formula.ending(self);
        self.ending
    }

    pub fn get(&self, field: Field) -> f64 {
        let value = match field {
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
        };
        quantity(value)
    }

    pub fn set(&mut self, field: Field, value: f64) {
        let value = quantity(value);
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

impl Identifiable for LineItem {
    fn id(&self) -> ItemId {
        self.id
    }
}

impl NamedEntity for LineItem {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Selects which inflow/outflow set computes an ending balance.
pub enum EndingFormula {
    /// Main ledger: inflows minus outflows, `sold` ignored.
    #[default]
    Standard,
    /// Prep sub-ledger: `foodtrays` is read from `sold` whenever `sold` is non-zero.
    Prep,
}

impl EndingFormula {
    pub fn ending(self, item: &LineItem) -> f64 {
        let inflows = quantity(item.beginning)
            + quantity(item.production)
            + quantity(item.delivery)
            + quantity(item.returned)
            + quantity(item.over);
        let foodtrays = match self {
            EndingFormula::Standard => quantity(item.foodtrays),
            EndingFormula::Prep => {
                let sold = quantity(item.sold);
                if sold != 0.0 {
                    sold
                } else {
                    quantity(item.foodtrays)
                }
            }
        };
        let outflows = quantity(item.used)
            + quantity(item.cashier_out)
            + quantity(item.bar_out)
            + quantity(item.kitchen_out)
            + quantity(item.one_branch_out)
            + foodtrays
            + quantity(item.event)
            + quantity(item.spoilage)
            + quantity(item.short);
        inflows - outflows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Editable movement columns of a [`LineItem`].
pub enum Field {
    Beginning,
    Production,
    Delivery,
    Returned,
    Over,
    Used,
    CashierOut,
    BarOut,
    KitchenOut,
    OneBranchOut,
    Foodtrays,
    Event,
    Spoilage,
    Short,
    Sold,
}

impl Field {
    pub const INFLOWS: [Field; 5] = [
        Field::Beginning,
        Field::Production,
        Field::Delivery,
        Field::Returned,
        Field::Over,
    ];

    pub const OUTFLOWS: [Field; 9] = [
        Field::Used,
        Field::CashierOut,
        Field::BarOut,
        Field::KitchenOut,
        Field::OneBranchOut,
        Field::Foodtrays,
        Field::Event,
        Field::Spoilage,
        Field::Short,
    ];

    /// Every movement column in display order, `sold` last.
    pub const ALL: [Field; 15] = [
        Field::Beginning,
        Field::Production,
        Field::Delivery,
        Field::Returned,
        Field::Over,
        Field::Used,
        Field::CashierOut,
        Field::BarOut,
        Field::KitchenOut,
        Field::OneBranchOut,
        Field::Foodtrays,
        Field::Event,
        Field::Spoilage,
        Field::Short,
        Field::Sold,
    ];

    /// Wire name, matching the serialized `LineItem` keys.
    pub fn key(self) -> &'static str {
        match self {
            Field::Beginning => "beginning",
            Field::Production => "production",
            Field::Delivery => "delivery",
            Field::Returned => "returned",
            Field::Over => "over",
            Field::Used => "used",
            Field::CashierOut => "cashierOut",
            Field::BarOut => "barOut",
            Field::KitchenOut => "kitchenOut",
            Field::OneBranchOut => "oneBranchOut",
            Field::Foodtrays => "foodtrays",
            Field::Event => "event",
            Field::Spoilage => "spoilage",
            Field::Short => "short",
            Field::Sold => "sold",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when text does not name a movement column.
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field `{}`", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let folded: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.key().to_ascii_lowercase() == folded)
            .ok_or_else(|| UnknownField(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy_item() -> LineItem {
        let mut item = LineItem::new(1, "Ensaymada");
        item.beginning = 10.0;
        item.production = 20.0;
        item.delivery = 5.0;
        item.returned = 2.0;
        item.over = 1.0;
        item.used = 3.0;
        item.cashier_out = 4.0;
        item.bar_out = 1.0;
        item.kitchen_out = 2.0;
        item.one_branch_out = 1.0;
        item.foodtrays = 6.0;
        item.event = 1.0;
        item.spoilage = 2.0;
        item.short = 1.0;
        item
    }

    #[test]
    fn standard_formula_subtracts_outflows_from_inflows() {
        let item = busy_item();
        assert_eq!(item.computed_ending(), 38.0 - 21.0);
    }

    #[test]
    fn shortages_are_not_clamped() {
        let mut item = LineItem::new(2, "Spanish Bread");
        item.beginning = 1.0;
        item.spoilage = 4.0;
        assert_eq!(item.computed_ending(), -3.0);
    }

    #[test]
    fn standard_formula_ignores_sold() {
        let mut item = busy_item();
        let before = item.computed_ending();
        item.sold = 50.0;
        assert_eq!(item.computed_ending(), before);
    }

    #[test]
    fn prep_formula_reads_foodtrays_from_sold_when_present() {
        let mut item = busy_item();
        item.sold = 10.0;
        assert_eq!(EndingFormula::Prep.ending(&item), 38.0 - 25.0);
        item.sold = 0.0;
        assert_eq!(EndingFormula::Prep.ending(&item), 38.0 - 21.0);
    }

    #[test]
    fn refresh_is_idempotent_and_overwrites_stale_ending() {
        let mut item = busy_item();
        item.ending = 999.0;
        let first = item.refresh_ending(EndingFormula::Standard);
        let second = item.refresh_ending(EndingFormula::Standard);
        assert_eq!(first, second);
        assert_eq!(item.ending, 17.0);
    }

    #[test]
    fn non_finite_values_count_as_zero() {
        let mut item = LineItem::new(3, "Pan de Coco");
        item.beginning = f64::NAN;
        item.production = 4.0;
        assert_eq!(item.computed_ending(), 4.0);
    }

    #[test]
    fn lenient_deserialization_coerces_bad_values() {
        let json = r#"{"id":7,"item":"Cheese Roll","beginning":"5","production":null,"delivery":"x","used":true,"cashierOut":2}"#;
        let item: LineItem = serde_json::from_str(json).expect("parse line item");
        assert_eq!(item.name, "Cheese Roll");
        assert_eq!(item.beginning, 5.0);
        assert_eq!(item.production, 0.0);
        assert_eq!(item.delivery, 0.0);
        assert_eq!(item.used, 0.0);
        assert_eq!(item.cashier_out, 2.0);
        assert_eq!(item.computed_ending(), 3.0);
    }

    #[test]
    fn field_names_parse_in_several_spellings() {
        assert_eq!("cashierOut".parse::<Field>(), Ok(Field::CashierOut));
        assert_eq!("one_branch_out".parse::<Field>(), Ok(Field::OneBranchOut));
        assert_eq!("Kitchen-Out".parse::<Field>(), Ok(Field::KitchenOut));
        assert!("ending".parse::<Field>().is_err());
    }

    #[test]
    fn set_and_get_round_trip_each_field() {
        let mut item = LineItem::new(4, "Monay");
        for (index, field) in Field::ALL.into_iter().enumerate() {
            item.set(field, index as f64);
        }
        for (index, field) in Field::ALL.into_iter().enumerate() {
            assert_eq!(item.get(field), index as f64);
        }
    }
}
