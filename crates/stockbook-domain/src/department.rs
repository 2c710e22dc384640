//! Organisational partitions of the ledgers: branches, departments, and sub-ledger kinds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{common::ItemId, ledger::PREP_ID_BASE, line_item::EndingFormula};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Operational unit within a branch, each with its own catalog and ledger.
pub enum Department {
    Bakery,
    Bar,
    Cashier,
    Commissary,
    #[serde(rename = "Main Kitchen", alias = "MainKitchen")]
    MainKitchen,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::Bakery,
        Department::Bar,
        Department::Cashier,
        Department::Commissary,
        Department::MainKitchen,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Department::Bakery => "Bakery",
            Department::Bar => "Bar",
            Department::Cashier => "Cashier",
            Department::Commissary => "Commissary",
            Department::MainKitchen => "Main Kitchen",
        }
    }

    /// Only Main Kitchen keeps a prep sub-ledger.
    pub fn has_prep_ledger(self) -> bool {
        matches!(self, Department::MainKitchen)
    }

    /// Filesystem-safe identifier.
    pub fn slug(self) -> &'static str {
        match self {
            Department::Bakery => "bakery",
            Department::Bar => "bar",
            Department::Cashier => "cashier",
            Department::Commissary => "commissary",
            Department::MainKitchen => "main_kitchen",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when text does not name a known department.
pub struct UnknownDepartment(pub String);

impl fmt::Display for UnknownDepartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown department `{}`", self.0)
    }
}

impl std::error::Error for UnknownDepartment {}

impl FromStr for Department {
    type Err = UnknownDepartment;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let folded: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "bakery" => Ok(Department::Bakery),
            "bar" => Ok(Department::Bar),
            "cashier" => Ok(Department::Cashier),
            "commissary" => Ok(Department::Commissary),
            "mainkitchen" | "kitchen" => Ok(Department::MainKitchen),
            _ => Err(UnknownDepartment(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// A physical restaurant location.
pub struct Branch(String);

impl Branch {
    pub fn new(name: impl AsRef<str>) -> Result<Self, InvalidBranch> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidBranch);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path-safe identifier, distinct for every case-insensitively distinct name.
    ///
    /// `a-z` and `0-9` pass through and spaces become `_`. Every other byte of the
    /// lowercased UTF-8 name is written as `-` plus two hex digits.
    pub fn slug(&self) -> String {
        let lowered = self.0.to_lowercase();
        let mut slug = String::with_capacity(lowered.len());
        for c in lowered.chars() {
            match c {
                'a'..='z' | '0'..='9' => slug.push(c),
                ' ' => slug.push('_'),
                _ => {
                    let mut buf = [0u8; 4];
                    for byte in c.encode_utf8(&mut buf).bytes() {
                        slug.push_str(&format!("-{:02x}", byte));
                    }
                }
            }
        }
        slug
    }

    /// Case-insensitive comparison against a configured branch name.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Branch {
    type Error = InvalidBranch;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Branch::new(value)
    }
}

impl From<Branch> for String {
    fn from(value: Branch) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when constructing [`Branch`] values.
pub struct InvalidBranch;

impl fmt::Display for InvalidBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("branch name must not be empty")
    }
}

impl std::error::Error for InvalidBranch {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Tags one of the two item collections a ledger record can hold.
pub enum LedgerKind {
    Main,
    Prep,
}

impl LedgerKind {
    pub const BOTH: [LedgerKind; 2] = [LedgerKind::Main, LedgerKind::Prep];

    pub fn formula(self) -> EndingFormula {
        match self {
            LedgerKind::Main => EndingFormula::Standard,
            LedgerKind::Prep => EndingFormula::Prep,
        }
    }

    /// Kind implied by the reserved id ranges used in flat payloads.
    pub fn of_id(id: ItemId) -> Self {
        if id >= PREP_ID_BASE {
            LedgerKind::Prep
        } else {
            LedgerKind::Main
        }
    }

    pub fn id_range_contains(self, id: ItemId) -> bool {
        Self::of_id(id) == self
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LedgerKind::Main => "main",
            LedgerKind::Prep => "prep",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn departments_parse_loosely() {
        assert_eq!("cashier".parse::<Department>(), Ok(Department::Cashier));
        assert_eq!("Main Kitchen".parse::<Department>(), Ok(Department::MainKitchen));
        assert_eq!("main-kitchen".parse::<Department>(), Ok(Department::MainKitchen));
        assert!("laundry".parse::<Department>().is_err());
    }

    #[test]
    fn department_serializes_with_display_name() {
        let json = serde_json::to_string(&Department::MainKitchen).unwrap();
        assert_eq!(json, "\"Main Kitchen\"");
        let parsed: Department = serde_json::from_str("\"MainKitchen\"").unwrap();
        assert_eq!(parsed, Department::MainKitchen);
    }

    #[test]
    fn branch_rejects_blank_names_and_slugifies() {
        assert!(Branch::new("   ").is_err());
        let branch = Branch::new(" Quezon Ave. ").unwrap();
        assert_eq!(branch.as_str(), "Quezon Ave.");
        assert_eq!(branch.slug(), "quezon_ave-2e");
        assert!(branch.matches("quezon ave."));
    }

    #[test]
    fn branch_slugs_keep_distinct_names_apart() {
        let slug = |name: &str| Branch::new(name).unwrap().slug();
        assert_eq!(slug("Main Branch"), "main_branch");
        assert_eq!(slug("MAIN branch"), "main_branch");
        assert_eq!(slug("San-Juan"), "san-2djuan");
        assert_eq!(slug("San_Juan"), "san-5fjuan");
        assert_eq!(slug("Parañaque"), "para-c3-b1aque");

        let names = ["San Juan", "San-Juan", "San_Juan", "San.Juan", "Sañ Juan", "#", "%", "San Juan-20"];
        let mut slugs: Vec<String> = names.iter().map(|name| slug(name)).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), names.len());
    }

    #[test]
    fn ledger_kind_follows_id_ranges() {
        assert_eq!(LedgerKind::of_id(42), LedgerKind::Main);
        assert_eq!(LedgerKind::of_id(PREP_ID_BASE), LedgerKind::Prep);
        assert_eq!(LedgerKind::Prep.formula(), EndingFormula::Prep);
    }
}
