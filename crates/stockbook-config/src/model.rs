use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stockbook_domain::{Branch, Department};

use crate::ConfigError;

const DATA_DIR_NAME: &str = "Stockbook";
const BACKUP_DIR_NAME: &str = "backups";
const CATALOG_FILE_NAME: &str = "catalog.json";

/// Stores user-configurable preferences: where ledgers live, which branches exist, and CLI defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for ledgers. Defaults to `~/Documents/Stockbook`.
    pub data_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for overwrite backups. Defaults to `<data_root>/backups`.
    pub backup_root: Option<PathBuf>,

    #[serde(default = "Config::default_branches")]
    pub branches: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    #[serde(default = "Config::default_department_value")]
    pub default_department: Department,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Catalog file. Defaults to `<data_root>/catalog.json`; the built-in catalog is used while it is absent.
    pub catalog_path: Option<PathBuf>,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(default = "Config::default_primary_write_attempts")]
    pub primary_write_attempts: u32,

    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: None,
            backup_root: None,
            branches: Self::default_branches(),
            default_branch: None,
            default_department: Self::default_department_value(),
            catalog_path: None,
            backup_retention: Self::default_backup_retention(),
            primary_write_attempts: Self::default_primary_write_attempts(),
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    pub fn default_branches() -> Vec<String> {
        vec!["Main Branch".into()]
    }

    pub fn default_department_value() -> Department {
        Department::Cashier
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_primary_write_attempts() -> u32 {
        2
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(DATA_DIR_NAME)
    }

    pub fn resolve_backup_root(&self) -> PathBuf {
        match &self.backup_root {
            Some(path) => path.clone(),
            None => self.resolve_data_root().join(BACKUP_DIR_NAME),
        }
    }

    pub fn resolve_catalog_path(&self) -> PathBuf {
        match &self.catalog_path {
            Some(path) => path.clone(),
            None => self.resolve_data_root().join(CATALOG_FILE_NAME),
        }
    }

    /// Maps user input to a configured branch; `None` picks the default branch.
    ///
    /// Matching is case-insensitive and returns the configured spelling.
    pub fn resolve_branch(&self, input: Option<&str>) -> Result<Branch, ConfigError> {
        let wanted = match input.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => value.to_string(),
            None => self
                .default_branch
                .clone()
                .or_else(|| self.branches.first().cloned())
                .ok_or_else(|| ConfigError::UnknownBranch(String::new()))?,
        };
        let configured = self
            .branches
            .iter()
            .find(|name| name.trim().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ConfigError::UnknownBranch(wanted.clone()))?;
        Branch::new(configured).map_err(|_| ConfigError::UnknownBranch(wanted))
    }
}
