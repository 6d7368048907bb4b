//! Common serde default value functions
//!
//! Used across alert definitions, variants and components.

/// Default for enabled fields
pub fn default_true() -> bool {
    true
}

/// Selection weight of an alert or variant
pub fn default_weight() -> u32 {
    1
}

/// Full volume
pub fn default_volume() -> f32 {
    1.0
}

/// On-screen time of an alert, in milliseconds
pub fn default_alert_duration() -> u64 {
    10_000
}
