use stockbook_config::ConfigError;
use stockbook_core::CoreError;
use thiserror::Error;

/// Unified error type for the engine, storage, and configuration layers.
#[derive(Error, Debug)]
pub enum StockbookError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A save wrote linked ledgers but not the primary one.
    #[error("{0}")]
    PartialSync(String),
}

impl StockbookError {
    pub fn is_partial_sync(&self) -> bool {
        matches!(self, StockbookError::PartialSync(_))
    }
}

impl From<CoreError> for StockbookError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PartialSync { .. } => StockbookError::PartialSync(err.to_string()),
            CoreError::Storage(message) | CoreError::Serde(message) => {
                StockbookError::Storage(message)
            }
            CoreError::Io(io) => StockbookError::Storage(io.to_string()),
            CoreError::InvalidDate(message)
            | CoreError::UnknownDepartment(message)
            | CoreError::InvalidBranch(message)
            | CoreError::Validation(message) => StockbookError::InvalidInput(message),
        }
    }
}

impl From<ConfigError> for StockbookError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => StockbookError::Storage(io.to_string()),
            ConfigError::Serde(message) => StockbookError::Config(message),
            ConfigError::Catalog(err) => StockbookError::Config(err.to_string()),
            ConfigError::UnknownBranch(name) if name.is_empty() => {
                StockbookError::Config("no branches are configured".into())
            }
            ConfigError::UnknownBranch(name) => {
                StockbookError::InvalidInput(format!("unknown branch `{}`", name))
            }
        }
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] StockbookError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(StockbookError::from(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(StockbookError::from(err))
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use stockbook_domain::{Branch, Department, LedgerKey};

    use super::*;

    #[test]
    fn partial_sync_keeps_its_identity() {
        let key = LedgerKey::new(
            chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            Branch::new("Main Branch").unwrap(),
            Department::Cashier,
        );
        let err = StockbookError::from(CoreError::PartialSync {
            written: vec![key.with_department(Department::Bakery)],
            failed: key,
            message: "disk full".into(),
        });
        assert!(err.is_partial_sync());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn store_failures_are_persistence_errors() {
        let err = StockbookError::from(CoreError::Storage("store offline".into()));
        assert!(matches!(err, StockbookError::Storage(message) if message == "store offline"));
    }
}
