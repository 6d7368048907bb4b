//! Error types for timer replication

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or writing timer state
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("failed to read shared key {key} at {path}")]
    ReadKey {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write shared key {key} at {path}")]
    WriteKey {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed timer state under {key}")]
    DecodeState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode timer state")]
    EncodeState(#[source] serde_json::Error),

    #[error("failed to persist tick for timer {timer_id} to {path}")]
    Persist {
        timer_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shared store lock poisoned")]
    Poisoned,
}
