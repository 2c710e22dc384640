use std::fs;

use chrono::NaiveDate;
use stockbook_core::{storage::LedgerStore, CoreError};
use stockbook_domain::{Branch, Department, LedgerKey, LedgerKind, LedgerRecord, LineItem};
use stockbook_storage_json::{JsonLedgerStore, StoragePaths};
use tempfile::{tempdir, TempDir};

fn store_in(dir: &TempDir) -> (JsonLedgerStore, StoragePaths) {
    let paths = StoragePaths {
        ledger_root: dir.path().join("ledgers"),
        backup_root: dir.path().join("backups"),
    };
    let store = JsonLedgerStore::with_retention(paths.clone(), 2).expect("create store");
    (store, paths)
}

fn key(department: Department) -> LedgerKey {
    LedgerKey::new(
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        Branch::new("Main Branch").unwrap(),
        department,
    )
}

fn kitchen_record() -> LedgerRecord {
    let mut adobo = LineItem::new(1, "Adobo");
    adobo.beginning = 4.0;
    adobo.production = 6.0;
    let mut rice = LineItem::new(10_000, "Garlic Rice");
    rice.beginning = 2.0;
    rice.sold = 1.0;
    let mut record = LedgerRecord::from_parts(key(Department::MainKitchen), vec![adobo], vec![rice]);
    record.recompute_endings();
    record
}

#[test]
fn json_store_saves_and_loads_both_sub_ledgers() {
    let dir = tempdir().expect("tempdir");
    let (store, paths) = store_in(&dir);
    let record = kitchen_record();

    store.save(&record).expect("save ledger");
    let loaded = store
        .load(&record.key)
        .expect("load ledger")
        .expect("record present");

    assert_eq!(loaded, record);
    let path = store.ledger_path(&record.key);
    assert_eq!(
        path,
        paths
            .ledger_root
            .join("main_branch")
            .join("main_kitchen")
            .join("2024-05-02.json")
    );
    assert!(!path.with_extension("json.tmp").exists());

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let ids: Vec<u64> = raw["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 10_000]);
    assert_eq!(raw["department"], "Main Kitchen");
}

#[test]
fn missing_record_is_none_but_corrupt_record_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let (store, _) = store_in(&dir);
    let bar = key(Department::Bar);

    assert!(store.load(&bar).expect("load").is_none());

    let path = store.ledger_path(&bar);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();

    let err = store.load(&bar).expect_err("corrupt file must not read as absent");
    assert!(matches!(err, CoreError::Serde(_)));
}

#[test]
fn hand_edited_files_load_leniently() {
    let dir = tempdir().expect("tempdir");
    let (store, _) = store_in(&dir);
    let bakery = key(Department::Bakery);
    let path = store.ledger_path(&bakery);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{
            "date": "2024-05-02",
            "branch": "Main Branch",
            "department": "Bakery",
            "items": [
                { "id": 9, "item": "Pandesal", "beginning": "12", "sold": null, "spoilage": "n/a" }
            ]
        }"#,
    )
    .unwrap();

    let loaded = store.load(&bakery).unwrap().unwrap();
    let row = loaded.item(LedgerKind::Main, 9).expect("row 9");
    assert_eq!(row.name, "Pandesal");
    assert_eq!(row.beginning, 12.0);
    assert_eq!(row.sold, 0.0);
    assert_eq!(row.spoilage, 0.0);
}

#[test]
fn overwrites_keep_a_bounded_number_of_backups() {
    let dir = tempdir().expect("tempdir");
    let (store, paths) = store_in(&dir);
    let mut record = kitchen_record();

    store.save(&record).expect("first save");
    assert!(store.list_backups(&record.key).unwrap().is_empty());

    record.main[0].used = 1.0;
    store.save(&record).expect("second save");
    let backups = store.list_backups(&record.key).unwrap();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].created_at.is_some());
    assert!(backups[0]
        .path
        .starts_with(paths.backup_root.join("main_branch").join("main_kitchen")));

    let restored = store
        .restore_backup(&record.key, &backups[0])
        .expect("restore backup");
    assert_eq!(restored.main[0].used, 0.0);

    for _ in 0..3 {
        store.save(&record).expect("repeat save");
    }
    assert!(store.list_backups(&record.key).unwrap().len() <= 2);
}

#[test]
fn delete_reports_whether_a_record_existed() {
    let dir = tempdir().expect("tempdir");
    let (store, _) = store_in(&dir);
    let record = kitchen_record();
    store.save(&record).unwrap();

    assert!(store.delete(&record.key).unwrap());
    assert!(store.load(&record.key).unwrap().is_none());
    assert!(!store.delete(&record.key).unwrap());
}

#[test]
fn list_dates_returns_saved_days_in_order() {
    let dir = tempdir().expect("tempdir");
    let (store, _) = store_in(&dir);
    let base = key(Department::Cashier);
    for offset in [3, -1, 0] {
        let day = base.shifted(offset).unwrap();
        store
            .save(&LedgerRecord::from_parts(day, vec![LineItem::new(9, "Pandesal")], Vec::new()))
            .unwrap();
    }
    let stray = store.ledger_path(&base).with_file_name("notes.txt");
    fs::write(stray, "ignored").unwrap();

    let dates = store
        .list_dates(&base.branch, Department::Cashier)
        .unwrap()
        .into_iter()
        .map(|date| date.to_string())
        .collect::<Vec<_>>();
    assert_eq!(dates, vec!["2024-05-01", "2024-05-02", "2024-05-05"]);
    assert!(store
        .list_dates(&base.branch, Department::Bar)
        .unwrap()
        .is_empty());
}

#[test]
fn punctuation_variants_of_a_branch_keep_separate_files() {
    let dir = tempdir().expect("tempdir");
    let (store, _) = store_in(&dir);
    let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let spaced = LedgerKey::new(date, Branch::new("San Juan").unwrap(), Department::Bar);
    let dashed = LedgerKey::new(date, Branch::new("San-Juan").unwrap(), Department::Bar);

    let mut beer = LineItem::new(1, "Beer");
    beer.delivery = 42.0;
    store
        .save(&LedgerRecord::from_parts(spaced.clone(), vec![beer], Vec::new()))
        .unwrap();

    assert_ne!(store.ledger_path(&spaced), store.ledger_path(&dashed));
    assert!(store.load(&dashed).unwrap().is_none());

    store
        .save(&LedgerRecord::from_parts(dashed.clone(), vec![LineItem::new(1, "Beer")], Vec::new()))
        .unwrap();
    let kept = store.load(&spaced).unwrap().unwrap();
    assert_eq!(kept.main[0].delivery, 42.0);
}

#[test]
fn a_file_recorded_for_another_branch_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let (store, _) = store_in(&dir);
    let bar = key(Department::Bar);
    let path = store.ledger_path(&bar);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{ "date": "2024-05-02", "branch": "Cebu", "department": "Bar", "items": [] }"#,
    )
    .unwrap();

    let err = store.load(&bar).expect_err("branch mismatch");
    assert!(matches!(err, CoreError::Storage(ref message) if message.contains("Cebu")));
}

#[test]
fn rapid_overwrites_each_keep_a_backup() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths {
        ledger_root: dir.path().join("ledgers"),
        backup_root: dir.path().join("backups"),
    };
    let store = JsonLedgerStore::with_retention(paths, 10).unwrap();
    let mut record = kitchen_record();

    for used in 0..4 {
        record.main[0].used = f64::from(used);
        store.save(&record).unwrap();
    }

    let backups = store.list_backups(&record.key).unwrap();
    assert_eq!(backups.len(), 3);
    let restored = store.restore_backup(&record.key, &backups[0]).unwrap();
    assert_eq!(restored.main[0].used, 2.0);
    let oldest = store.restore_backup(&record.key, &backups[2]).unwrap();
    assert_eq!(oldest.main[0].used, 0.0);
}
