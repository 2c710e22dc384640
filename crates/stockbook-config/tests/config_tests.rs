use std::fs;

use stockbook_config::{builtin_catalog, load_catalog, save_catalog, Config, ConfigError, ConfigManager};
use stockbook_domain::{CatalogError, Department, LedgerKind, PREP_ID_BASE};
use tempfile::tempdir;

#[test]
fn default_config_has_a_usable_branch() {
    let cfg = Config::default();

    assert!(!cfg.branches.is_empty());
    assert_eq!(cfg.resolve_branch(None).unwrap().as_str(), "Main Branch");
    assert_eq!(cfg.default_department, Department::Cashier);
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert_eq!(manager.load().expect("defaults"), Config::default());

    let mut cfg = Config::default();
    cfg.data_root = Some(dir.path().join("data"));
    cfg.branches = vec!["Makati".into(), "Cebu".into()];
    cfg.default_department = Department::MainKitchen;
    cfg.ui_color_enabled = false;

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(
        manager.config_path(),
        dir.path().join("config").join("config.json")
    );
    assert!(!manager.config_path().with_extension("json.tmp").exists());
}

#[test]
fn malformed_config_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    fs::write(manager.config_path(), "[1, 2").unwrap();

    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
}

#[test]
fn catalog_falls_back_to_builtin_until_saved() {
    let dir = tempdir().expect("tempdir");
    let mut cfg = Config::default();
    cfg.data_root = Some(dir.path().to_path_buf());

    assert_eq!(load_catalog(&cfg).unwrap(), builtin_catalog());

    let (extended, id) = builtin_catalog()
        .with_item(Department::MainKitchen, LedgerKind::Prep, "Atchara")
        .unwrap();
    assert!(id >= PREP_ID_BASE);
    save_catalog(&cfg, &extended).unwrap();

    assert!(dir.path().join("catalog.json").exists());
    let reloaded = load_catalog(&cfg).unwrap();
    assert_eq!(reloaded, extended);
    assert!(reloaded
        .items(Department::MainKitchen, LedgerKind::Prep)
        .iter()
        .any(|item| item.id == id && item.name == "Atchara"));
}

#[test]
fn invalid_catalog_file_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let mut cfg = Config::default();
    cfg.catalog_path = Some(dir.path().join("custom.json"));
    fs::write(
        dir.path().join("custom.json"),
        r#"{ "Bar": { "main": [ { "id": 1, "name": "Gin" }, { "id": 1, "name": "Rum" } ] } }"#,
    )
    .unwrap();

    assert!(matches!(load_catalog(&cfg), Err(ConfigError::Catalog(_))));
}

#[test]
fn catalog_file_with_prep_outside_main_kitchen_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let mut cfg = Config::default();
    cfg.catalog_path = Some(dir.path().join("custom.json"));
    fs::write(
        dir.path().join("custom.json"),
        r#"{ "Bakery": { "main": [ { "id": 1, "name": "Pandesal" } ], "prep": [ { "id": 10000, "name": "Dough" } ] } }"#,
    )
    .unwrap();

    let err = load_catalog(&cfg).expect_err("stray prep section");
    assert!(matches!(
        err,
        ConfigError::Catalog(CatalogError::PrepNotSupported {
            department: Department::Bakery
        })
    ));
}
