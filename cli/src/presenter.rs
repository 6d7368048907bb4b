//! Stand-in presentation layer that acknowledges every signal
//!
//! Mounting, sound start and narration each take a fixed, plausible amount
//! of time so alerts flow through the sequencer the way they would on a
//! real overlay.

use std::time::Duration;

use hashbrown::HashMap;

use alertcast_core::playback::{AlertToken, PlaybackSignal, PresentationFeedback};

#[derive(Debug, Clone)]
pub struct AutoPresenter {
    pub mount_delay: Duration,
    pub sound_start_delay: Duration,
    pub speech_per_char: Duration,
    /// Gating audio per armed alert, needed once components are shown
    sounds: HashMap<AlertToken, usize>,
}

impl Default for AutoPresenter {
    fn default() -> Self {
        Self {
            mount_delay: Duration::from_millis(50),
            sound_start_delay: Duration::from_millis(200),
            speech_per_char: Duration::from_millis(60),
            sounds: HashMap::new(),
        }
    }
}

impl AutoPresenter {
    /// Feedback to deliver for `signal`, each after its delay
    pub fn respond(&mut self, signal: &PlaybackSignal) -> Vec<(Duration, PresentationFeedback)> {
        match signal {
            PlaybackSignal::AlertArmed { token, components } => {
                self.sounds.insert(
                    *token,
                    components.iter().filter(|c| c.is_gating_audio()).count(),
                );
                components
                    .iter()
                    .filter(|c| c.visible)
                    .map(|c| {
                        (
                            self.mount_delay,
                            PresentationFeedback::ComponentReady {
                                token: *token,
                                component_id: c.component_id.clone(),
                            },
                        )
                    })
                    .collect()
            }
            PlaybackSignal::ComponentsShown { token } => {
                let sounds = self.sounds.get(token).copied().unwrap_or(0);
                (0..sounds)
                    .map(|_| {
                        (
                            self.sound_start_delay,
                            PresentationFeedback::SoundFinished { token: *token },
                        )
                    })
                    .collect()
            }
            PlaybackSignal::Speak { token, text, .. } => {
                let chars = text.chars().count() as u32;
                vec![(
                    self.speech_per_char * chars,
                    PresentationFeedback::TtsFinished { token: *token },
                )]
            }
            PlaybackSignal::AlertCleared { token, .. } => {
                self.sounds.remove(token);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}
