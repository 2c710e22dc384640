//! Static, branch-independent item catalogs per department.

use std::{collections::BTreeMap, collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    common::{Identifiable, ItemId, NamedEntity},
    department::{Department, LedgerKind},
    ledger::{LedgerKey, LedgerRecord, PREP_ID_BASE},
    line_item::LineItem,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Catalog entry: the identity a day's line item is seeded from.
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
}

impl CatalogItem {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn to_line_item(&self) -> LineItem {
        LineItem::new(self.id, self.name.clone())
    }
}

impl Identifiable for CatalogItem {
    fn id(&self) -> ItemId {
        self.id
    }
}

impl NamedEntity for CatalogItem {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Default items of one department; `prep` is only populated where a prep sub-ledger exists.
pub struct CatalogSection {
    #[serde(default)]
    pub main: Vec<CatalogItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prep: Vec<CatalogItem>,
}

impl CatalogSection {
    pub fn new(main: Vec<CatalogItem>) -> Self {
        Self {
            main,
            prep: Vec::new(),
        }
    }

    pub fn with_prep(mut self, prep: Vec<CatalogItem>) -> Self {
        self.prep = prep;
        self
    }

    pub fn items(&self, kind: LedgerKind) -> &[CatalogItem] {
        match kind {
            LedgerKind::Main => &self.main,
            LedgerKind::Prep => &self.prep,
        }
    }

    fn items_mut(&mut self, kind: LedgerKind) -> &mut Vec<CatalogItem> {
        match kind {
            LedgerKind::Main => &mut self.main,
            LedgerKind::Prep => &mut self.prep,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Immutable reference table mapping each department to its default items.
pub struct DepartmentCatalog {
    departments: BTreeMap<Department, CatalogSection>,
}

impl DepartmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, department: Department, section: CatalogSection) -> Self {
        self.departments.insert(department, section);
        self
    }

    pub fn section(&self, department: Department) -> Option<&CatalogSection> {
        self.departments.get(&department)
    }

    pub fn departments(&self) -> impl Iterator<Item = Department> + '_ {
        self.departments.keys().copied()
    }

    pub fn items(&self, department: Department, kind: LedgerKind) -> &[CatalogItem] {
        self.section(department)
            .map(|section| section.items(kind))
            .unwrap_or(&[])
    }

    pub fn has_prep(&self, department: Department) -> bool {
        !self.items(department, LedgerKind::Prep).is_empty()
    }

    /// Zero-valued rows for one sub-ledger of a department.
    pub fn template_items(&self, department: Department, kind: LedgerKind) -> Vec<LineItem> {
        self.items(department, kind)
            .iter()
            .map(CatalogItem::to_line_item)
            .collect()
    }

    /// Zero-valued record for the key, both sub-ledgers seeded.
    pub fn template(&self, key: &LedgerKey) -> LedgerRecord {
        LedgerRecord::from_parts(
            key.clone(),
            self.template_items(key.department, LedgerKind::Main),
            self.template_items(key.department, LedgerKind::Prep),
        )
    }

    /// One greater than the largest id in use, kept inside the kind's id range.
    pub fn next_item_id(&self, department: Department, kind: LedgerKind) -> ItemId {
        let max = self.items(department, kind).iter().map(|item| item.id).max();
        match (kind, max) {
            (LedgerKind::Main, Some(id)) => id + 1,
            (LedgerKind::Main, None) => 1,
            (LedgerKind::Prep, Some(id)) => id.max(PREP_ID_BASE - 1) + 1,
            (LedgerKind::Prep, None) => PREP_ID_BASE,
        }
    }

    /// Returns a copy of the catalog with a new item appended, plus the id it received.
    pub fn with_item(
        &self,
        department: Department,
        kind: LedgerKind,
        name: impl Into<String>,
    ) -> Result<(Self, ItemId), CatalogError> {
        let name = name.into();
        if kind == LedgerKind::Prep && !department.has_prep_ledger() {
            return Err(CatalogError::PrepNotSupported { department });
        }
        if name.trim().is_empty() {
            return Err(CatalogError::BlankName { department });
        }
        let id = self.next_item_id(department, kind);
        if kind == LedgerKind::Main && id >= PREP_ID_BASE {
            return Err(CatalogError::IdOutOfRange {
                department,
                kind,
                id,
            });
        }
        let mut next = self.clone();
        next.departments
            .entry(department)
            .or_default()
            .items_mut(kind)
            .push(CatalogItem::new(id, name.trim()));
        Ok((next, id))
    }

    /// Checks id ranges and uniqueness inside every sub-ledger.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (department, section) in &self.departments {
            if !department.has_prep_ledger() && !section.items(LedgerKind::Prep).is_empty() {
                return Err(CatalogError::PrepNotSupported {
                    department: *department,
                });
            }
            for kind in LedgerKind::BOTH {
                let mut seen = HashSet::new();
                for item in section.items(kind) {
                    if !kind.id_range_contains(item.id) {
                        return Err(CatalogError::IdOutOfRange {
                            department: *department,
                            kind,
                            id: item.id,
                        });
                    }
                    if !seen.insert(item.id) {
                        return Err(CatalogError::DuplicateId {
                            department: *department,
                            kind,
                            id: item.id,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Structural problems detected in a [`DepartmentCatalog`].
pub enum CatalogError {
    IdOutOfRange {
        department: Department,
        kind: LedgerKind,
        id: ItemId,
    },
    DuplicateId {
        department: Department,
        kind: LedgerKind,
        id: ItemId,
    },
    BlankName {
        department: Department,
    },
    PrepNotSupported {
        department: Department,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::IdOutOfRange {
                department,
                kind,
                id,
            } => write!(f, "{department} {kind} item id {id} is outside its id range"),
            CatalogError::DuplicateId {
                department,
                kind,
                id,
            } => write!(f, "{department} {kind} item id {id} appears more than once"),
            CatalogError::BlankName { department } => {
                write!(f, "{department} catalog items need a name")
            }
            CatalogError::PrepNotSupported { department } => {
                write!(f, "{department} has no prep sub-ledger")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::department::Branch;

    fn kitchen_catalog() -> DepartmentCatalog {
        DepartmentCatalog::new().with_section(
            Department::MainKitchen,
            CatalogSection::new(vec![
                CatalogItem::new(1, "Adobo"),
                CatalogItem::new(4, "Kare-Kare"),
            ])
            .with_prep(vec![CatalogItem::new(PREP_ID_BASE, "Garlic Rice")]),
        )
    }

    #[test]
    fn template_is_zero_valued_and_keyed() {
        let key = LedgerKey::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            Branch::new("Main Branch").unwrap(),
            Department::MainKitchen,
        );
        let record = kitchen_catalog().template(&key);
        assert_eq!(record.key, key);
        assert_eq!(record.main.len(), 2);
        assert_eq!(record.prep.len(), 1);
        assert!(record
            .to_flat()
            .iter()
            .all(|item| item.beginning == 0.0 && item.ending == 0.0));
    }

    #[test]
    fn next_item_id_stays_inside_its_range() {
        let catalog = kitchen_catalog();
        assert_eq!(catalog.next_item_id(Department::MainKitchen, LedgerKind::Main), 5);
        assert_eq!(
            catalog.next_item_id(Department::MainKitchen, LedgerKind::Prep),
            PREP_ID_BASE + 1
        );
        assert_eq!(catalog.next_item_id(Department::Bar, LedgerKind::Main), 1);
        assert_eq!(catalog.next_item_id(Department::Bar, LedgerKind::Prep), PREP_ID_BASE);
    }

    #[test]
    fn with_item_leaves_original_untouched() {
        let catalog = kitchen_catalog();
        let (extended, id) = catalog
            .with_item(Department::MainKitchen, LedgerKind::Main, " Lechon Kawali ")
            .expect("append item");
        assert_eq!(id, 5);
        assert_eq!(catalog.items(Department::MainKitchen, LedgerKind::Main).len(), 2);
        let added = extended.items(Department::MainKitchen, LedgerKind::Main);
        assert_eq!(added.last().unwrap().name, "Lechon Kawali");
    }

    #[test]
    fn validate_flags_duplicates_and_range_violations() {
        let duplicate = DepartmentCatalog::new().with_section(
            Department::Bar,
            CatalogSection::new(vec![CatalogItem::new(1, "Beer"), CatalogItem::new(1, "Soda")]),
        );
        assert!(matches!(
            duplicate.validate(),
            Err(CatalogError::DuplicateId { id: 1, .. })
        ));

        let misplaced = DepartmentCatalog::new().with_section(
            Department::Bar,
            CatalogSection::new(vec![CatalogItem::new(PREP_ID_BASE + 3, "Ice")]),
        );
        assert!(matches!(
            misplaced.validate(),
            Err(CatalogError::IdOutOfRange { .. })
        ));
        assert!(kitchen_catalog().validate().is_ok());
    }

    #[test]
    fn prep_items_belong_to_main_kitchen_only() {
        let catalog = kitchen_catalog();
        assert_eq!(
            catalog.with_item(Department::Bakery, LedgerKind::Prep, "Dough"),
            Err(CatalogError::PrepNotSupported {
                department: Department::Bakery
            })
        );
        assert!(!catalog.has_prep(Department::Bakery));

        let stray = catalog.with_section(
            Department::Bar,
            CatalogSection::new(vec![CatalogItem::new(1, "Beer")])
                .with_prep(vec![CatalogItem::new(PREP_ID_BASE, "Ice")]),
        );
        assert_eq!(
            stray.validate(),
            Err(CatalogError::PrepNotSupported {
                department: Department::Bar
            })
        );
    }

    #[test]
    fn catalog_serializes_as_department_map() {
        let json = serde_json::to_string(&kitchen_catalog()).unwrap();
        assert!(json.starts_with("{\"Main Kitchen\":"));
        let parsed: DepartmentCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, kitchen_catalog());
    }
}
