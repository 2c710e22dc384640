//! stockbook-config
//!
//! Persistent user preferences and the department catalog.
//! Owns the Config data structure plus disk persistence helpers.

pub mod catalog;
pub mod error;
pub mod manager;
pub mod model;

pub use catalog::{builtin_catalog, load_catalog, save_catalog};
pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
