use std::{path::PathBuf, sync::Mutex};

use once_cell::sync::Lazy;
use stockbook_config::ConfigManager;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated home with a config whose data root sits inside it.
pub fn setup_home(branches: &[&str]) -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let manager = ConfigManager::with_base_dir(base.clone()).expect("config manager");
    let mut config = manager.load().expect("default config");
    config.data_root = Some(base.join("data"));
    config.branches = branches.iter().map(|name| name.to_string()).collect();
    config.ui_color_enabled = false;
    manager.save(&config).expect("save config");
    base
}

pub fn ledger_file(home: &std::path::Path, branch_slug: &str, dept_slug: &str, date: &str) -> PathBuf {
    home.join("data")
        .join("ledgers")
        .join(branch_slug)
        .join(dept_slug)
        .join(format!("{date}.json"))
}
