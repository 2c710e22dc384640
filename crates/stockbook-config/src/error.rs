use std::io;

use stockbook_domain::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Unknown branch `{0}`")]
    UnknownBranch(String),
}
