//! Alert playback
//!
//! One alert plays at a time per overlay instance. Events queue in arrival
//! order and move through the slot as:
//!
//! ```text
//! Idle → Scheduled → Armed → Playing → Draining → Idle
//! ```
//!
//! 1. **Scheduled**: dequeued and resolved; the pre-roll delay runs
//! 2. **Armed**: component projections are handed to presentation, which
//!    reports each one mounted (bounded by a readiness timeout)
//! 3. **Playing**: components are shown; narration waits on the TTS barrier
//! 4. **Draining**: the alert duration elapsed; exit animations run and any
//!    speaking narration gets a bounded grace period
//!
//! A skip or an expired parry window clears the slot from any state.

mod projection;
mod running;
mod sequencer;
mod signal;

#[cfg(test)]
mod sequencer_tests;

pub use projection::{ComponentProjection, PreparedAlert, project_components};
pub use running::{AlertToken, RunningAlert, TtsBarrier};
pub use sequencer::{
    DEFAULT_READINESS_TIMEOUT, DEFAULT_TTS_GRACE, PlaybackSequencer, PlaybackState,
    SequencerConfig,
};
pub use signal::{ClearReason, DropReason, PlaybackSignal, PresentationFeedback};
