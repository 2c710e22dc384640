use stockbook_domain::{CatalogError, InvalidBranch, LedgerKey, UnknownDepartment, UnknownField};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Storage failure: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Ledgers may disagree: linked ledgers were updated but {failed} was not saved: {message}")]
    PartialSync {
        written: Vec<LedgerKey>,
        failed: LedgerKey,
        message: String,
    },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),
    #[error("Invalid branch: {0}")]
    InvalidBranch(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    pub fn is_partial_sync(&self) -> bool {
        matches!(self, CoreError::PartialSync { .. })
    }
}

impl From<UnknownDepartment> for CoreError {
    fn from(err: UnknownDepartment) -> Self {
        CoreError::UnknownDepartment(err.0)
    }
}

impl From<InvalidBranch> for CoreError {
    fn from(err: InvalidBranch) -> Self {
        CoreError::InvalidBranch(err.to_string())
    }
}

impl From<UnknownField> for CoreError {
    fn from(err: UnknownField) -> Self {
        CoreError::Validation(err.to_string())
    }
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        CoreError::Validation(err.to_string())
    }
}
