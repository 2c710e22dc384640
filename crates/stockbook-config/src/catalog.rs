//! Loading and saving the per-department item catalog.

use std::fs;

use stockbook_domain::{CatalogItem, CatalogSection, Department, DepartmentCatalog, PREP_ID_BASE};

use crate::{manager::replace_file, Config, ConfigError};

const BAKERY_GOODS: [&str; 8] = [
    "Pandesal",
    "Monay",
    "Ensaymada",
    "Spanish Bread",
    "Ube Loaf",
    "Cheese Roll",
    "Pan de Coco",
    "Hopia",
];

fn section(names: &[&str]) -> Vec<CatalogItem> {
    names
        .iter()
        .zip(1..)
        .map(|(name, id)| CatalogItem::new(id, *name))
        .collect()
}

fn prep_section(names: &[&str]) -> Vec<CatalogItem> {
    names
        .iter()
        .zip(PREP_ID_BASE..)
        .map(|(name, id)| CatalogItem::new(id, *name))
        .collect()
}

/// The catalog shipped with the application.
///
/// Cashier rows reuse the Bakery ids for baked goods so cashier deliveries line up with the
/// Bakery ledger on save.
pub fn builtin_catalog() -> DepartmentCatalog {
    let mut cashier = section(&BAKERY_GOODS);
    cashier.extend([
        CatalogItem::new(20, "Bottled Water"),
        CatalogItem::new(21, "Iced Tea"),
        CatalogItem::new(22, "Softdrinks in Can"),
    ]);

    DepartmentCatalog::new()
        .with_section(Department::Bakery, CatalogSection::new(section(&BAKERY_GOODS)))
        .with_section(Department::Cashier, CatalogSection::new(cashier))
        .with_section(
            Department::Bar,
            CatalogSection::new(section(&[
                "Pale Pilsen",
                "Red Horse",
                "Dark Rum",
                "Calamansi Juice",
                "Mango Shake",
            ])),
        )
        .with_section(
            Department::Commissary,
            CatalogSection::new(section(&[
                "Rice (kg)",
                "Cooking Oil (L)",
                "Sugar (kg)",
                "Flour (kg)",
                "Eggs (tray)",
            ])),
        )
        .with_section(
            Department::MainKitchen,
            CatalogSection::new(section(&[
                "Chicken Adobo",
                "Pork Sinigang",
                "Kare-Kare",
                "Lechon Kawali",
                "Pancit Canton",
            ]))
            .with_prep(prep_section(&[
                "Garlic Rice",
                "Marinated Pork",
                "Peanut Sauce",
                "Sinigang Broth",
            ])),
        )
}

/// Reads the configured catalog file, or the built-in catalog while no file exists.
pub fn load_catalog(config: &Config) -> Result<DepartmentCatalog, ConfigError> {
    let path = config.resolve_catalog_path();
    if !path.exists() {
        return Ok(builtin_catalog());
    }
    let data = fs::read_to_string(&path)?;
    let catalog: DepartmentCatalog = serde_json::from_str(&data)
        .map_err(|err| ConfigError::Serde(format!("{}: {}", path.display(), err)))?;
    catalog.validate()?;
    Ok(catalog)
}

/// Validates and writes the catalog to the configured catalog file.
pub fn save_catalog(config: &Config, catalog: &DepartmentCatalog) -> Result<(), ConfigError> {
    catalog.validate()?;
    let json = serde_json::to_string_pretty(catalog)
        .map_err(|err| ConfigError::Serde(err.to_string()))?;
    replace_file(&config.resolve_catalog_path(), &json)
}

#[cfg(test)]
mod tests {
    use stockbook_domain::LedgerKind;

    use super::*;

    #[test]
    fn builtin_catalog_is_valid_and_covers_every_department() {
        let catalog = builtin_catalog();
        catalog.validate().unwrap();
        for department in Department::ALL {
            assert!(!catalog.items(department, LedgerKind::Main).is_empty());
        }
        assert!(catalog.has_prep(Department::MainKitchen));
        assert!(!catalog.has_prep(Department::Bakery));
    }

    #[test]
    fn cashier_shares_bakery_ids() {
        let catalog = builtin_catalog();
        let cashier = catalog.items(Department::Cashier, LedgerKind::Main);
        for item in catalog.items(Department::Bakery, LedgerKind::Main) {
            assert!(cashier.iter().any(|row| row.id == item.id && row.name == item.name));
        }
    }
}
