use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;
use stockbook_config::{load_catalog, Config, ConfigManager};
use stockbook_core::{
    time::{Clock, SystemClock},
    LedgerEngine, LedgerSource,
};
use stockbook_domain::LedgerRecord;
use stockbook_storage_json::{JsonLedgerStore, StoragePaths};

use super::commands;
use super::output::{set_preferences, OutputPreferences};
use super::registry::CommandRegistry;
use crate::errors::CliError;

const LEDGER_DIR: &str = "ledgers";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// The ledger currently being edited in the shell.
#[derive(Debug, Clone)]
pub struct OpenLedger {
    pub record: LedgerRecord,
    pub source: LedgerSource,
    /// Edited since it was opened or last saved.
    pub dirty: bool,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub engine: LedgerEngine,
    pub store: Arc<JsonLedgerStore>,
    pub clock: Box<dyn Clock>,
    pub current: Option<OpenLedger>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::from_env()?)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        set_preferences(OutputPreferences {
            color_enabled: config.ui_color_enabled,
        });

        let store = Arc::new(JsonLedgerStore::with_retention(
            StoragePaths {
                ledger_root: config.resolve_data_root().join(LEDGER_DIR),
                backup_root: config.resolve_backup_root(),
            },
            config.backup_retention,
        )?);
        let catalog = load_catalog(&config)?;
        let engine = LedgerEngine::new(Box::new(Arc::clone(&store)), catalog)
            .with_primary_write_attempts(config.primary_write_attempts);

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        Ok(Self {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            engine,
            store,
            clock: Box::new(SystemClock),
            current: None,
            running: true,
        })
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn prompt(&self) -> String {
        match &self.current {
            Some(open) => format!(
                "stockbook [{} {}/{}{}]> ",
                open.record.key.date,
                open.record.key.branch,
                open.record.key.department,
                if open.dirty { "*" } else { "" }
            ),
            None => "stockbook> ".into(),
        }
    }
}
