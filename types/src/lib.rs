//! Shared configuration types for alertcast
//!
//! This crate contains serializable event, alert definition and overlay
//! configuration types that are shared between the engine (alertcast-core),
//! the command line, and any presentation frontend.

pub mod formatting;
mod serde_defaults;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of stream occurrence an alert can hook into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Follow,
    Sub,
    Resub,
    Subgift,
    Subcommunitygift,
    Raid,
    Cheer,
    Tip,
    Promo,
    Rewardredeem,
    Custom,
}

impl EventKind {
    /// Kinds that may cut a playing alert short when parry is enabled
    pub fn is_parryable(self) -> bool {
        matches!(
            self,
            EventKind::Tip | EventKind::Cheer | EventKind::Resub | EventKind::Sub
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Follow => "follow",
            EventKind::Sub => "sub",
            EventKind::Resub => "resub",
            EventKind::Subgift => "subgift",
            EventKind::Subcommunitygift => "subcommunitygift",
            EventKind::Raid => "raid",
            EventKind::Cheer => "cheer",
            EventKind::Tip => "tip",
            EventKind::Promo => "promo",
            EventKind::Rewardredeem => "rewardredeem",
            EventKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-event overrides for programmatically triggered alerts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOptions {
    /// Minimum on-screen duration in milliseconds
    #[serde(default)]
    pub alert_duration: Option<u64>,
}

/// An external occurrence delivered by the transport.
///
/// Field names follow the transport's camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    /// Unique delivery id (used for deduplication)
    pub id: String,

    #[serde(alias = "event")]
    pub kind: EventKind,

    #[serde(default, alias = "name")]
    pub username: String,

    #[serde(default)]
    pub recipient: Option<String>,

    #[serde(default)]
    pub amount: Option<f64>,

    #[serde(default)]
    pub currency: Option<String>,

    /// Subscription tier ("1", "2", "3" or "Prime")
    #[serde(default)]
    pub tier: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub game: Option<String>,

    /// Originating service (e.g. "twitch", "streamlabs")
    #[serde(default)]
    pub service: Option<String>,

    #[serde(default)]
    pub months_name: Option<String>,

    /// Channel point reward id (rewardredeem only)
    #[serde(default)]
    pub reward_id: Option<String>,

    /// Exact alert/variant id to trigger (custom only)
    #[serde(default)]
    pub alert_id: Option<String>,

    #[serde(default, rename = "isSoundMuted")]
    pub is_sound_muted: bool,

    #[serde(default, rename = "isTTSMuted")]
    pub is_tts_muted: bool,

    #[serde(default)]
    pub custom_options: Option<CustomOptions>,
}

impl AlertEvent {
    /// Minimal event with only id, kind and username set
    pub fn new(id: impl Into<String>, kind: EventKind, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            username: username.into(),
            recipient: None,
            amount: None,
            currency: None,
            tier: None,
            message: None,
            game: None,
            service: None,
            months_name: None,
            reward_id: None,
            alert_id: None,
            is_sound_muted: false,
            is_tts_muted: false,
            custom_options: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Boolean connective shared by every rule of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterConnective {
    #[default]
    And,
    Or,
}

/// Event field a filter rule reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Username,
    Amount,
    Tier,
    Game,
    Message,
    Service,
    Recipient,
}

impl FilterField {
    pub fn is_numeric(self) -> bool {
        matches!(self, FilterField::Amount | FilterField::Tier)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterField::Username => "username",
            FilterField::Amount => "amount",
            FilterField::Tier => "tier",
            FilterField::Game => "game",
            FilterField::Message => "message",
            FilterField::Service => "service",
            FilterField::Recipient => "recipient",
        }
    }
}

/// Comparison applied by a filter rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparator {
    Eq,
    Neq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// Case-insensitive substring match
    #[serde(rename = "co")]
    Contains,
    /// Value is a comma separated list, field must equal one of the entries
    Includes,
    /// Field is set and non-empty
    #[serde(rename = "pr")]
    Present,
    IsEven,
    IsOdd,
}

impl Comparator {
    /// Comparators that only make sense on numeric fields
    pub fn is_numeric_only(self) -> bool {
        matches!(
            self,
            Comparator::Lt
                | Comparator::LtEq
                | Comparator::Gt
                | Comparator::GtEq
                | Comparator::IsEven
                | Comparator::IsOdd
        )
    }

    /// Comparators that only make sense on text fields
    pub fn is_text_only(self) -> bool {
        matches!(self, Comparator::Contains | Comparator::Includes)
    }

    /// Whether the rule's `value` is read at all
    pub fn needs_value(self) -> bool {
        !matches!(
            self,
            Comparator::Present | Comparator::IsEven | Comparator::IsOdd
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Neq => "!=",
            Comparator::Lt => "<",
            Comparator::LtEq => "<=",
            Comparator::Gt => ">",
            Comparator::GtEq => ">=",
            Comparator::Contains => "contains",
            Comparator::Includes => "includes",
            Comparator::Present => "is present",
            Comparator::IsEven => "is even",
            Comparator::IsOdd => "is odd",
        }
    }
}

/// A single `{field, comparator, value}` leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    #[serde(rename = "type", alias = "field")]
    pub field: FilterField,
    pub comparator: Comparator,
    #[serde(default)]
    pub value: String,
}

impl FilterRule {
    pub fn new(field: FilterField, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            field,
            comparator,
            value: value.into(),
        }
    }
}

/// Flat rule list combined by one connective. An empty list always passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub operator: FilterConnective,
    #[serde(default)]
    pub items: Vec<FilterRule>,
}

impl Filter {
    pub fn all(items: Vec<FilterRule>) -> Self {
        Self {
            operator: FilterConnective::And,
            items,
        }
    }

    pub fn any(items: Vec<FilterRule>) -> Self {
        Self {
            operator: FilterConnective::Or,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fonts & Animation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub family: String,
    pub size: u32,
    pub weight: u32,
    pub color: String,
    pub highlight_color: String,
    pub border_px: u32,
    pub border_color: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: SYSTEM_FONT.to_string(),
            size: 24,
            weight: 500,
            color: "#ffffff".to_string(),
            highlight_color: "#00ff00".to_string(),
            border_px: 0,
            border_color: "#000000".to_string(),
        }
    }
}

/// Font used when neither the component nor the overlay names one that exists
pub const SYSTEM_FONT: &str = "sans-serif";

/// Which overlay-wide font a text component falls back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalFontSlot {
    #[default]
    Font1,
    Font2,
}

/// Optional animation settings. Unset fields fall back along
/// component → variant → alert definition → overlay defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationOverrides {
    pub animation_in: Option<String>,
    pub animation_in_duration: Option<u64>,
    pub animation_out: Option<String>,
    pub animation_out_duration: Option<u64>,
    pub animation_text: Option<String>,
}

/// Overlay-wide animation values, the last link of the override chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationDefaults {
    pub animation_in: String,
    pub animation_in_duration: u64,
    pub animation_out: String,
    pub animation_out_duration: u64,
    pub animation_text: String,
}

impl Default for AnimationDefaults {
    fn default() -> Self {
        Self {
            animation_in: "fadeIn".to_string(),
            animation_in_duration: 2000,
            animation_out: "fadeOut".to_string(),
            animation_out_duration: 2000,
            animation_text: "wiggle".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub align_x: i32,
    pub align_y: i32,
    pub rotation: f32,
}

/// Type-specific payload of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ComponentKind {
    Audio {
        /// Gallery asset id (None or "%default%" = bundled default sound)
        #[serde(default)]
        gallery_id: Option<String>,
        #[serde(default = "crate::serde_defaults::default_volume")]
        volume: f32,
        /// Delay before playback starts, in milliseconds
        #[serde(default)]
        delay: u64,
    },
    Tts {
        template: String,
        #[serde(default)]
        speak_delay: u64,
        #[serde(default)]
        voice: Option<String>,
        #[serde(default)]
        volume: Option<f32>,
    },
    Text {
        message_template: String,
        #[serde(default)]
        font: Option<Font>,
        #[serde(default)]
        global_font: GlobalFontSlot,
    },
    Gallery {
        #[serde(default)]
        gallery_id: Option<String>,
        #[serde(default)]
        is_video: bool,
        #[serde(default)]
        volume: Option<f32>,
    },
    ProfileImage {
        #[serde(default)]
        fallback_gallery_id: Option<String>,
    },
    Custom {
        #[serde(default)]
        html: String,
        #[serde(default)]
        css: String,
        #[serde(default)]
        javascript: String,
    },
}

impl ComponentKind {
    pub fn is_audio(&self) -> bool {
        matches!(self, ComponentKind::Audio { .. })
    }

    pub fn is_tts(&self) -> bool {
        matches!(self, ComponentKind::Tts { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Audio { .. } => "audio",
            ComponentKind::Tts { .. } => "tts",
            ComponentKind::Text { .. } => "text",
            ComponentKind::Gallery { .. } => "gallery",
            ComponentKind::ProfileImage { .. } => "profile_image",
            ComponentKind::Custom { .. } => "custom",
        }
    }
}

/// One presentable element inside an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,

    #[serde(flatten)]
    pub geometry: Geometry,

    /// Per-component filter (empty = always shown)
    #[serde(default)]
    pub enabled_when: Filter,

    /// Entrance offset from alert start, in milliseconds
    #[serde(default)]
    pub animation_delay: Option<u64>,

    #[serde(flatten)]
    pub animation: AnimationOverrides,

    #[serde(flatten)]
    pub kind: ComponentKind,
}

impl Component {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            geometry: Geometry::default(),
            enabled_when: Filter::default(),
            animation_delay: None,
            animation: AnimationOverrides::default(),
            kind,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Alert Definitions
// ─────────────────────────────────────────────────────────────────────────────

/// Alternate presentation of an alert, sharing the parent's hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default = "crate::serde_defaults::default_true")]
    pub enabled: bool,

    #[serde(default = "crate::serde_defaults::default_weight")]
    pub weight: u32,

    #[serde(default)]
    pub filter: Filter,

    /// On-screen duration in milliseconds (None = inherit from the alert)
    #[serde(default)]
    pub alert_duration: Option<u64>,

    #[serde(flatten)]
    pub animation: AnimationOverrides,

    #[serde(default)]
    pub components: Vec<Component>,
}

/// A user-authored alert bound to one or more event kinds.
/// The definition itself is the "main" variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDefinition {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub hooks: Vec<EventKind>,

    /// Required reward id for `rewardredeem` hooks
    #[serde(default)]
    pub reward_id: Option<String>,

    #[serde(default = "crate::serde_defaults::default_true")]
    pub enabled: bool,

    #[serde(default = "crate::serde_defaults::default_weight")]
    pub weight: u32,

    #[serde(default)]
    pub filter: Filter,

    /// On-screen duration in milliseconds
    #[serde(default = "crate::serde_defaults::default_alert_duration")]
    pub alert_duration: u64,

    #[serde(flatten)]
    pub animation: AnimationOverrides,

    #[serde(default)]
    pub components: Vec<Component>,

    #[serde(default)]
    pub variants: Vec<Variant>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParryConfig {
    pub enabled: bool,
    /// Milliseconds before a parried alert is forcibly cleared
    pub delay: u64,
}

/// What to do with a message containing a listed vulgarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfanityPolicy {
    #[default]
    ReplaceWithAsterisk,
    ReplaceWithHappyWords,
    HideMessages,
    DisableAlerts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfanityConfig {
    #[serde(alias = "type")]
    pub policy: ProfanityPolicy,
    /// Language codes whose bundled lists are enabled (e.g. "en", "cs")
    pub languages: Vec<String>,
    /// Extra comma separated words
    pub custom_words: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsDefaults {
    pub voice: Option<String>,
    pub volume: f32,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for TtsDefaults {
    fn default() -> Self {
        Self {
            voice: None,
            volume: 1.0,
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// Full configuration of one alerts overlay instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsOverlayConfig {
    /// Pre-roll delay before a dequeued alert becomes visible
    pub alert_delay_ms: u64,
    pub parry: ParryConfig,
    pub profanity: ProfanityConfig,
    pub font1: Font,
    pub font2: Font,
    pub tts: TtsDefaults,
    pub defaults: AnimationDefaults,
    pub alerts: Vec<AlertDefinition>,
}

impl AlertsOverlayConfig {
    pub fn global_font(&self, slot: GlobalFontSlot) -> &Font {
        match slot {
            GlobalFontSlot::Font1 => &self.font1,
            GlobalFontSlot::Font2 => &self.font2,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer Overlays
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    #[default]
    Stopwatch,
    Countdown,
    Marathon,
}

impl TimerKind {
    /// Whether displayed time grows while running
    pub fn counts_up(self) -> bool {
        matches!(self, TimerKind::Stopwatch)
    }
}

/// Configuration of a stopwatch/countdown/marathon overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerOverlayConfig {
    pub id: String,

    #[serde(default)]
    pub kind: TimerKind,

    /// Persist ticks to the durable backend
    #[serde(default)]
    pub is_persistent: bool,

    #[serde(default = "crate::serde_defaults::default_true")]
    pub is_started_on_source_load: bool,

    /// Starting value in milliseconds (countdown length, or restored time)
    #[serde(default)]
    pub initial_time_ms: i64,

    #[serde(default)]
    pub show_milliseconds: bool,
}
