//! Shared traits, identity matching, and numeric coercion helpers.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// Numeric identity of an item inside a department catalog.
pub type ItemId = u32;

/// Exposes the catalog identity of an entity stored in a ledger.
pub trait Identifiable {
    fn id(&self) -> ItemId;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Canonical form of an item name used for cross-day matching.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// True when both entities share an id and their names are equal after normalisation.
pub fn same_identity<A, B>(left: &A, right: &B) -> bool
where
    A: Identifiable + NamedEntity,
    B: Identifiable + NamedEntity,
{
    left.id() == right.id() && normalize_name(left.name()) == normalize_name(right.name())
}

/// Replaces non-finite values with zero so formulas never propagate NaN.
pub fn quantity(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Parses user-supplied text into a quantity. Anything non-numeric becomes zero.
pub fn coerce_quantity(raw: &str) -> f64 {
    raw.trim().parse::<f64>().map(quantity).unwrap_or(0.0)
}

/// Serde helper accepting numbers, numeric strings, `null`, or any other value (as zero).
pub fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(QuantityVisitor)
}

struct QuantityVisitor;

impl<'de> Visitor<'de> for QuantityVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a quantity")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
        Ok(quantity(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
        Ok(value as f64)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
        Ok(value as f64)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
        Ok(coerce_quantity(value))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_none<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<f64, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(0.0)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<f64, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(0.0)
    }
}
