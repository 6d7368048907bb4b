//! Error types for context operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors while watching the overlay config file
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("failed to initialize file watcher")]
    InitWatcher(#[source] notify::Error),

    #[error("failed to watch path {path}")]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("config path {path} has no parent directory")]
    NoParent { path: PathBuf },
}

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read overlay config {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse overlay config {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("alert or variant id '{id}' is used more than once")]
    DuplicateId { id: String },

    #[error("alert '{id}' has an empty id or no hooks")]
    InvalidDefinition { id: String },

    #[error("failed to load settings")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save settings")]
    Save(#[source] confy::ConfyError),
}
