//! Configuration context
//!
//! Overlay config loading and validation, persisted app settings, and the
//! file watcher that triggers config reloads.

mod config;
mod error;
mod settings;
pub mod watcher;

pub use config::{
    AlertsOverlayConfig, ConfigWarning, load_overlay_config, parse_overlay_config,
    validate_overlay_config,
};
pub use error::{ConfigError, WatcherError};
pub use settings::AppSettings;
pub use watcher::{ConfigEvent, ConfigWatcher};
