//! Overlay configuration loading
//!
//! The overlay config is read-mostly: loaded at start and again whenever the
//! file changes. Hard problems (unparseable TOML, ambiguous ids) reject the
//! whole file; soft problems (a rule comparing text numerically) are reported
//! and the rule simply never matches.

use std::path::Path;

use hashbrown::HashSet;

pub use alertcast_types::AlertsOverlayConfig;
use alertcast_types::{EventKind, Filter};

use crate::filter::{FilterError, validate};

use super::ConfigError;

/// Soft problem found while validating a config
#[derive(Debug)]
pub struct ConfigWarning {
    /// `alert`, `alert/variant` or `alert/variant/component`
    pub location: String,
    pub message: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Read, parse and validate an overlay config file
pub fn load_overlay_config(path: &Path) -> Result<AlertsOverlayConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_overlay_config(&content, path)?;

    let warnings = validate_overlay_config(&config)?;
    for warning in &warnings {
        tracing::warn!(path = %path.display(), %warning, "Overlay config problem");
    }

    tracing::info!(
        path = %path.display(),
        alerts = config.alerts.len(),
        warnings = warnings.len(),
        "Loaded overlay config"
    );
    Ok(config)
}

pub fn parse_overlay_config(content: &str, path: &Path) -> Result<AlertsOverlayConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Reject ambiguous configs and collect soft problems.
///
/// Alert and variant ids share one namespace because custom triggers address
/// either by id.
pub fn validate_overlay_config(
    config: &AlertsOverlayConfig,
) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut ids = HashSet::new();
    let mut warnings = Vec::new();

    for alert in &config.alerts {
        if alert.id.is_empty() || alert.hooks.is_empty() {
            return Err(ConfigError::InvalidDefinition {
                id: alert.id.clone(),
            });
        }
        if !ids.insert(alert.id.as_str()) {
            return Err(ConfigError::DuplicateId {
                id: alert.id.clone(),
            });
        }

        if alert.hooks.contains(&EventKind::Rewardredeem) && alert.reward_id.is_none() {
            warnings.push(ConfigWarning {
                location: alert.id.clone(),
                message: "rewardredeem hook without reward_id only matches redeems without one"
                    .to_string(),
            });
        }
        check_filter(&alert.filter, &alert.id, &mut warnings);
        for component in &alert.components {
            let location = format!("{}/{}", alert.id, component.id);
            check_filter(&component.enabled_when, &location, &mut warnings);
        }

        for variant in &alert.variants {
            if !ids.insert(variant.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    id: variant.id.clone(),
                });
            }
            let location = format!("{}/{}", alert.id, variant.id);
            check_filter(&variant.filter, &location, &mut warnings);
            for component in &variant.components {
                let location = format!("{}/{}/{}", alert.id, variant.id, component.id);
                check_filter(&component.enabled_when, &location, &mut warnings);
            }
        }
    }

    Ok(warnings)
}

fn check_filter(filter: &Filter, location: &str, warnings: &mut Vec<ConfigWarning>) {
    warnings.extend(validate(filter).into_iter().map(|e: FilterError| ConfigWarning {
        location: location.to_string(),
        message: e.to_string(),
    }));
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use alertcast_types::{ComponentKind, ProfanityPolicy};

    use super::*;

    const SAMPLE: &str = r#"
alert_delay_ms = 500

[parry]
enabled = true
delay = 1500

[profanity]
policy = "disable-alerts"
languages = ["en"]
custom_words = "darn"

[[alerts]]
id = "tips"
name = "Tips"
hooks = ["tip", "cheer"]
alert_duration = 8000
animation_in = "slideIn"

[alerts.filter]
operator = "and"
items = [{ type = "amount", comparator = "gt-eq", value = "5" }]

[[alerts.components]]
id = "horn"
type = "audio"
gallery_id = "airhorn"

[[alerts.components]]
id = "caption"
type = "text"
message_template = "{name} tipped {amount}"
animation_delay = 250

[[alerts.variants]]
id = "big-tips"
weight = 2
"#;

    fn path() -> PathBuf {
        PathBuf::from("overlay.toml")
    }

    #[test]
    fn parses_full_overlay_config() {
        let config = parse_overlay_config(SAMPLE, &path()).unwrap();

        assert_eq!(config.alert_delay_ms, 500);
        assert!(config.parry.enabled);
        assert_eq!(config.profanity.policy, ProfanityPolicy::DisableAlerts);

        let alert = &config.alerts[0];
        assert_eq!(alert.hooks, vec![EventKind::Tip, EventKind::Cheer]);
        assert_eq!(alert.alert_duration, 8_000);
        assert_eq!(alert.animation.animation_in.as_deref(), Some("slideIn"));
        assert_eq!(alert.filter.items.len(), 1);
        assert!(matches!(alert.components[0].kind, ComponentKind::Audio { volume, .. } if volume == 1.0));
        assert_eq!(alert.components[1].animation_delay, Some(250));
        assert_eq!(alert.variants[0].weight, 2);
        assert!(alert.variants[0].enabled);

        assert!(validate_overlay_config(&config).unwrap().is_empty());
    }

    #[test]
    fn rejects_duplicate_ids_across_alerts_and_variants() {
        let mut config = parse_overlay_config(SAMPLE, &path()).unwrap();
        config.alerts[0].variants[0].id = "tips".to_string();

        assert!(matches!(
            validate_overlay_config(&config),
            Err(ConfigError::DuplicateId { id }) if id == "tips"
        ));
    }

    #[test]
    fn reports_numeric_rule_on_text_field() {
        let content = SAMPLE.replace(
            r#"{ type = "amount", comparator = "gt-eq", value = "5" }"#,
            r#"{ type = "username", comparator = "gt", value = "5" }"#,
        );
        let config = parse_overlay_config(&content, &path()).unwrap();

        let warnings = validate_overlay_config(&config).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].location, "tips");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_overlay_config(&missing),
            Err(ConfigError::ReadFile { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "alerts = 5").unwrap();
        assert!(matches!(
            load_overlay_config(&bad),
            Err(ConfigError::ParseToml { .. })
        ));
    }
}
