//! Runtime state of the alert occupying the playback slot

use std::fmt;
use std::time::{Duration, Instant};

use hashbrown::HashSet;

use alertcast_types::AlertEvent;

use crate::alerts::SelectedVariant;

use super::{ComponentProjection, PlaybackState};

/// Identity of one running alert.
///
/// Every deferred action and every feedback message carries the token of the
/// alert it was issued for; anything whose token no longer matches the slot
/// is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertToken(pub u64);

impl fmt::Display for AlertToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Gate holding narration back until expected audio has started.
///
/// `expected == None` is the reset state: nothing is armed and speech stays
/// closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtsBarrier {
    expected: Option<u32>,
    finished: u32,
}

impl TtsBarrier {
    /// Arm for `expected` sounds. Zero opens the barrier immediately.
    pub fn arm(&mut self, expected: u32) {
        self.expected = Some(expected);
        self.finished = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Count one finished sound. Extra reports past `expected` are ignored.
    pub fn sound_finished(&mut self) {
        if let Some(expected) = self.expected
            && self.finished < expected
        {
            self.finished += 1;
        }
    }

    pub fn is_open(&self) -> bool {
        self.expected == Some(self.finished)
    }

    pub fn expected(&self) -> Option<u32> {
        self.expected
    }

    pub fn finished(&self) -> u32 {
        self.finished
    }
}

/// Narration waiting for the barrier and its speak delay
#[derive(Debug, Clone)]
pub(crate) struct PendingSpeech {
    pub component_id: String,
    pub text: String,
    pub voice: Option<String>,
    pub volume: f32,
    pub not_before: Instant,
}

/// The alert occupying the playback slot
#[derive(Debug, Clone)]
pub struct RunningAlert {
    pub token: AlertToken,
    pub event: AlertEvent,
    pub selected: SelectedVariant,
    pub components: Vec<ComponentProjection>,
    pub phase: PlaybackState,

    // ─── Timing ─────────────────────────────────────────────────────────────
    /// End of the pre-roll delay; the alert's selection time
    pub starts_at: Instant,
    /// `starts_at` plus the effective alert duration
    pub active_until: Instant,
    /// Exit animation length
    pub drain_for: Duration,
    pub animation_out: String,

    // ─── Media ──────────────────────────────────────────────────────────────
    pub barrier: TtsBarrier,
    pub(crate) pending_speech: Vec<PendingSpeech>,
    /// `Speak` requests not yet acknowledged
    pub speaking: u32,
    pub(crate) awaiting_ready: HashSet<String>,
}

impl RunningAlert {
    pub fn is_waiting_for_tts(&self) -> bool {
        self.speaking > 0
    }

    /// Visible audio components the barrier waits for
    pub fn expected_sound_count(&self) -> u32 {
        self.components.iter().filter(|c| c.is_gating_audio()).count() as u32
    }
}
