//! Application settings persisted with confy
//!
//! Paths default to the platform data directory so a fresh install works
//! without any setup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

const APP_NAME: &str = "alertcast";
const CONFIG_NAME: &str = "settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Overlay config (TOML) to play alerts from
    pub overlay_config: PathBuf,

    /// Root holding `vulgarities/<lang>.txt` and `happy-words/<lang>.txt`
    pub word_list_dir: PathBuf,

    /// Shared store directory for replicated timers
    pub timer_store_dir: PathBuf,

    /// Durable tick files for persistent timers
    pub tick_persistence_dir: PathBuf,

    /// Reload the overlay config when the file changes
    pub watch_config: bool,

    /// Events remembered for duplicate detection
    pub dedup_capacity: usize,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_NAME))
}

impl Default for AppSettings {
    fn default() -> Self {
        let root = data_dir();
        Self {
            overlay_config: root.join("overlay.toml"),
            word_list_dir: root.join("word-lists"),
            timer_store_dir: root.join("timers"),
            tick_persistence_dir: root.join("ticks"),
            watch_config: true,
            dedup_capacity: crate::events::DEFAULT_DEDUP_CAPACITY,
        }
    }
}

impl AppSettings {
    /// Stored settings, or defaults if none exist or they cannot be read
    pub fn load() -> Self {
        match confy::load(APP_NAME, CONFIG_NAME) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load settings, using defaults");
                Self::default()
            }
        }
    }

    /// Stored settings, reporting why they could not be read
    pub fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    /// Location of the settings file
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: AppSettings = toml::from_str("watch_config = false").unwrap();
        assert!(!settings.watch_config);
        assert_eq!(settings.dedup_capacity, 20);
        assert!(settings.overlay_config.ends_with("overlay.toml"));
    }
}
