//! Messages between the sequencer and the presentation layer

use std::fmt;

use crate::alerts::Unresolved;

use super::{AlertToken, ComponentProjection};

/// Instruction for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackSignal {
    /// An alert was dequeued and will be shown after the pre-roll delay
    AlertScheduled {
        token: AlertToken,
        event_id: String,
        alert_id: String,
        alert_name: String,
        starts_in_ms: u64,
    },
    /// Mount these components; report each with `ComponentReady`
    AlertArmed {
        token: AlertToken,
        components: Vec<ComponentProjection>,
    },
    /// Start entrance animations and audio
    ComponentsShown { token: AlertToken },
    /// Speak a TTS component
    Speak {
        token: AlertToken,
        component_id: String,
        text: String,
        voice: Option<String>,
        volume: f32,
        rate: f32,
        pitch: f32,
    },
    /// Start exit animations
    AlertDraining {
        token: AlertToken,
        animation_out: String,
        duration_ms: u64,
    },
    /// The slot is free; unmount everything tagged with `token`
    AlertCleared { token: AlertToken, reason: ClearReason },
    CancelTts { token: AlertToken },
    StopAudio { token: AlertToken },
    /// An event was discarded without playing
    EventDropped { event_id: String, reason: DropReason },
}

impl PlaybackSignal {
    /// Alert this signal belongs to, if any
    pub fn token(&self) -> Option<AlertToken> {
        match self {
            PlaybackSignal::AlertScheduled { token, .. }
            | PlaybackSignal::AlertArmed { token, .. }
            | PlaybackSignal::ComponentsShown { token }
            | PlaybackSignal::Speak { token, .. }
            | PlaybackSignal::AlertDraining { token, .. }
            | PlaybackSignal::AlertCleared { token, .. }
            | PlaybackSignal::CancelTts { token }
            | PlaybackSignal::StopAudio { token } => Some(*token),
            PlaybackSignal::EventDropped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// Exit animation and narration finished
    Completed,
    /// Operator skip
    Skipped,
    /// Parry window expired with another alert waiting
    Parried,
}

/// Why an event never reached the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    Duplicate,
    /// Profanity policy cancelled the alert
    Profanity,
    Unresolved(Unresolved),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Duplicate => f.write_str("duplicate event id"),
            DropReason::Profanity => f.write_str("cancelled by profanity filter"),
            DropReason::Unresolved(reason) => write!(f, "{}", reason),
        }
    }
}

/// Report from the presentation layer. Stale tokens are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationFeedback {
    /// A component is mounted and its media can start
    ComponentReady { token: AlertToken, component_id: String },
    /// An audio component finished loading and started
    SoundFinished { token: AlertToken },
    /// A `Speak` request finished or failed
    TtsFinished { token: AlertToken },
}

impl PresentationFeedback {
    pub fn token(&self) -> AlertToken {
        match self {
            PresentationFeedback::ComponentReady { token, .. }
            | PresentationFeedback::SoundFinished { token }
            | PresentationFeedback::TtsFinished { token } => *token,
        }
    }
}
