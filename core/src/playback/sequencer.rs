//! Playback sequencer
//!
//! Owns the single playback slot of an overlay instance and drives the
//! running alert through its lifecycle. Time never advances on its own: the
//! caller passes `now` to every operation, which keeps the state machine
//! synchronous and deterministic under test.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use alertcast_types::{AlertEvent, AlertsOverlayConfig, TtsDefaults};

use crate::alerts::Unresolved;

use super::running::PendingSpeech;
use super::{
    AlertToken, ClearReason, DropReason, PlaybackSignal, PreparedAlert, PresentationFeedback,
    RunningAlert, TtsBarrier,
};

/// How long an armed alert waits for its components to mount
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_millis(1_000);

/// How long a draining alert waits for unfinished narration
pub const DEFAULT_TTS_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Pre-roll delay running
    Scheduled,
    /// Components handed to presentation, waiting for them to mount
    Armed,
    Playing,
    /// Exit animation and trailing narration
    Draining,
}

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub alert_delay: Duration,
    pub parry_enabled: bool,
    pub parry_delay: Duration,
    pub readiness_timeout: Duration,
    pub tts_grace: Duration,
    pub tts: TtsDefaults,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            alert_delay: Duration::ZERO,
            parry_enabled: false,
            parry_delay: Duration::ZERO,
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            tts_grace: DEFAULT_TTS_GRACE,
            tts: TtsDefaults::default(),
        }
    }
}

impl SequencerConfig {
    pub fn from_overlay(config: &AlertsOverlayConfig) -> Self {
        Self {
            alert_delay: Duration::from_millis(config.alert_delay_ms),
            parry_enabled: config.parry.enabled,
            parry_delay: Duration::from_millis(config.parry.delay),
            tts: config.tts.clone(),
            ..Self::default()
        }
    }
}

/// Single-slot FIFO alert player
#[derive(Debug)]
pub struct PlaybackSequencer {
    config: SequencerConfig,
    queue: VecDeque<AlertEvent>,
    current: Option<RunningAlert>,
    next_token: u64,
    /// Running alert that a waiting parryable event will force out
    parry: Option<(AlertToken, Instant)>,
}

impl PlaybackSequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            current: None,
            next_token: 1,
            parry: None,
        }
    }

    /// Applies to alerts scheduled from now on
    pub fn set_config(&mut self, config: SequencerConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.current
            .as_ref()
            .map(|alert| alert.phase)
            .unwrap_or(PlaybackState::Idle)
    }

    pub fn current(&self) -> Option<&RunningAlert> {
        self.current.as_ref()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Input
    // ═══════════════════════════════════════════════════════════════════════

    /// Queue an accepted event. It plays once every earlier event has.
    ///
    /// A parryable event arriving while any alert holds the slot starts the
    /// parry window: the running alert is forced out when it expires.
    pub fn submit(&mut self, event: AlertEvent, now: Instant) {
        if self.config.parry_enabled
            && event.kind.is_parryable()
            && self.parry.is_none()
            && let Some(current) = &self.current
            && matches!(
                current.phase,
                PlaybackState::Scheduled | PlaybackState::Armed | PlaybackState::Playing
            )
        {
            self.parry = Some((current.token, now + self.config.parry_delay));
            tracing::info!(
                token = %current.token,
                event_id = %event.id,
                delay_ms = self.config.parry_delay.as_millis() as u64,
                "Parry window opened"
            );
        }

        tracing::debug!(event_id = %event.id, kind = %event.kind, queued = self.queue.len() + 1, "Event queued");
        self.queue.push_back(event);
    }

    /// Advance timers and, when the slot is free, dequeue the next event.
    ///
    /// `prepare` resolves a dequeued event; an `Err` drops the event and the
    /// queue moves on.
    pub fn tick<F>(&mut self, now: Instant, mut prepare: F) -> Vec<PlaybackSignal>
    where
        F: FnMut(&AlertEvent) -> Result<PreparedAlert, Unresolved>,
    {
        let mut out = Vec::new();
        self.check_parry(now, &mut out);

        loop {
            if self.current.is_none() {
                let Some(event) = self.queue.pop_front() else {
                    break;
                };
                match prepare(&event) {
                    Ok(prepared) => self.schedule(event, prepared, now, &mut out),
                    Err(reason) => {
                        tracing::warn!(event_id = %event.id, kind = %event.kind, %reason, "Dropping unresolvable event");
                        out.push(PlaybackSignal::EventDropped {
                            event_id: event.id,
                            reason: DropReason::Unresolved(reason),
                        });
                        continue;
                    }
                }
            }

            if !self.advance(now, &mut out) {
                break;
            }
        }

        out
    }

    /// Operator skip: clear the slot immediately
    pub fn skip(&mut self, _now: Instant) -> Vec<PlaybackSignal> {
        let mut out = Vec::new();
        if self.current.is_some() {
            self.force_clear(ClearReason::Skipped, &mut out);
        } else {
            tracing::debug!("Skip with no running alert");
        }
        out
    }

    /// Apply a presentation report. Reports for any alert other than the
    /// running one are ignored.
    pub fn feedback(&mut self, feedback: PresentationFeedback, now: Instant) -> Vec<PlaybackSignal> {
        let mut out = Vec::new();

        let Some(alert) = self
            .current
            .as_mut()
            .filter(|alert| alert.token == feedback.token())
        else {
            tracing::debug!(token = %feedback.token(), "Ignoring feedback for stale alert");
            return out;
        };

        match feedback {
            PresentationFeedback::ComponentReady { component_id, .. } => {
                alert.awaiting_ready.remove(&component_id);
            }
            PresentationFeedback::SoundFinished { .. } => {
                alert.barrier.sound_finished();
            }
            PresentationFeedback::TtsFinished { .. } => {
                alert.speaking = alert.speaking.saturating_sub(1);
            }
        }

        self.advance(now, &mut out);
        out
    }

    // ═══════════════════════════════════════════════════════════════════════
    // State Machine
    // ═══════════════════════════════════════════════════════════════════════

    fn schedule(
        &mut self,
        event: AlertEvent,
        prepared: PreparedAlert,
        now: Instant,
        out: &mut Vec<PlaybackSignal>,
    ) {
        let token = AlertToken(self.next_token);
        self.next_token += 1;

        let override_ms = event
            .custom_options
            .as_ref()
            .and_then(|o| o.alert_duration)
            .unwrap_or(0);
        let duration = Duration::from_millis(override_ms.max(prepared.selected.alert_duration()));
        let starts_at = now + self.config.alert_delay;

        let awaiting_ready = prepared
            .components
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.component_id.clone())
            .collect();

        tracing::info!(
            %token,
            event_id = %event.id,
            alert_id = %prepared.selected.id(),
            duration_ms = duration.as_millis() as u64,
            "Alert scheduled"
        );
        out.push(PlaybackSignal::AlertScheduled {
            token,
            event_id: event.id.clone(),
            alert_id: prepared.selected.id().to_string(),
            alert_name: prepared.selected.name().to_string(),
            starts_in_ms: self.config.alert_delay.as_millis() as u64,
        });

        self.current = Some(RunningAlert {
            token,
            event,
            selected: prepared.selected,
            components: prepared.components,
            phase: PlaybackState::Scheduled,
            starts_at,
            active_until: starts_at + duration,
            drain_for: Duration::from_millis(prepared.animation_out_duration_ms),
            animation_out: prepared.animation_out,
            barrier: TtsBarrier::default(),
            pending_speech: Vec::new(),
            speaking: 0,
            awaiting_ready,
        });
    }

    /// Run every transition that is due. Returns true if the slot was freed.
    fn advance(&mut self, now: Instant, out: &mut Vec<PlaybackSignal>) -> bool {
        let Some(alert) = self.current.as_mut() else {
            return false;
        };

        loop {
            match alert.phase {
                PlaybackState::Scheduled => {
                    if now < alert.starts_at {
                        return false;
                    }
                    alert.phase = PlaybackState::Armed;
                    out.push(PlaybackSignal::AlertArmed {
                        token: alert.token,
                        components: alert.components.clone(),
                    });
                }
                PlaybackState::Armed => {
                    let timed_out = now >= alert.starts_at + self.config.readiness_timeout;
                    if !alert.awaiting_ready.is_empty() && !timed_out {
                        return false;
                    }
                    if !alert.awaiting_ready.is_empty() {
                        tracing::warn!(
                            token = %alert.token,
                            missing = alert.awaiting_ready.len(),
                            "Components not ready, showing anyway"
                        );
                        alert.awaiting_ready.clear();
                    }
                    show(alert, now, out);
                }
                PlaybackState::Playing => {
                    pump_speech(alert, &self.config.tts, now, out);
                    if now < alert.active_until {
                        return false;
                    }
                    if !alert.pending_speech.is_empty() {
                        tracing::debug!(
                            token = %alert.token,
                            dropped = alert.pending_speech.len(),
                            "Narration never started before drain"
                        );
                        alert.pending_speech.clear();
                    }
                    alert.phase = PlaybackState::Draining;
                    out.push(PlaybackSignal::AlertDraining {
                        token: alert.token,
                        animation_out: alert.animation_out.clone(),
                        duration_ms: alert.drain_for.as_millis() as u64,
                    });
                }
                PlaybackState::Draining => {
                    let drained_at = alert.active_until + alert.drain_for;
                    if now < drained_at {
                        return false;
                    }
                    if alert.is_waiting_for_tts() {
                        if now < drained_at + self.config.tts_grace {
                            return false;
                        }
                        tracing::warn!(token = %alert.token, "Narration overran, cancelling");
                        out.push(PlaybackSignal::CancelTts { token: alert.token });
                    }

                    let token = alert.token;
                    self.current = None;
                    tracing::info!(%token, "Alert completed");
                    out.push(PlaybackSignal::AlertCleared {
                        token,
                        reason: ClearReason::Completed,
                    });
                    return true;
                }
                PlaybackState::Idle => return false,
            }
        }
    }

    fn check_parry(&mut self, now: Instant, out: &mut Vec<PlaybackSignal>) {
        let Some((token, deadline)) = self.parry else {
            return;
        };

        match &self.current {
            Some(alert) if alert.token == token => {
                if now >= deadline {
                    self.parry = None;
                    self.force_clear(ClearReason::Parried, out);
                }
            }
            _ => self.parry = None,
        }
    }

    fn force_clear(&mut self, reason: ClearReason, out: &mut Vec<PlaybackSignal>) {
        let Some(alert) = self.current.take() else {
            return;
        };
        self.parry = None;

        tracing::info!(token = %alert.token, ?reason, phase = ?alert.phase, "Alert cleared early");
        out.push(PlaybackSignal::StopAudio { token: alert.token });
        out.push(PlaybackSignal::CancelTts { token: alert.token });
        out.push(PlaybackSignal::AlertCleared {
            token: alert.token,
            reason,
        });
    }
}

impl Default for PlaybackSequencer {
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}

/// Armed → Playing: reveal components and arm the TTS barrier
fn show(alert: &mut RunningAlert, now: Instant, out: &mut Vec<PlaybackSignal>) {
    alert.phase = PlaybackState::Playing;
    out.push(PlaybackSignal::ComponentsShown { token: alert.token });

    alert.barrier.arm(alert.expected_sound_count());
    alert.pending_speech = alert
        .components
        .iter()
        .filter(|c| c.is_speech())
        .map(|c| PendingSpeech {
            component_id: c.component_id.clone(),
            text: c.resolved_text.clone().unwrap_or_default(),
            voice: c.voice.clone(),
            volume: c.resolved_volume.unwrap_or(1.0),
            not_before: now + Duration::from_millis(c.animation_delay_ms + c.start_delay_ms),
        })
        .collect();

    tracing::debug!(
        token = %alert.token,
        expected_sounds = alert.barrier.expected().unwrap_or(0),
        speech = alert.pending_speech.len(),
        "Alert playing"
    );
}

/// Emit `Speak` for narration whose barrier is open and delay has passed
fn pump_speech(
    alert: &mut RunningAlert,
    tts: &TtsDefaults,
    now: Instant,
    out: &mut Vec<PlaybackSignal>,
) {
    if !alert.barrier.is_open() || alert.pending_speech.is_empty() {
        return;
    }

    let (due, waiting): (Vec<_>, Vec<_>) = alert
        .pending_speech
        .drain(..)
        .partition(|speech| speech.not_before <= now);
    alert.pending_speech = waiting;

    for speech in due {
        alert.speaking += 1;
        out.push(PlaybackSignal::Speak {
            token: alert.token,
            component_id: speech.component_id,
            text: speech.text,
            voice: speech.voice,
            volume: speech.volume,
            rate: tts.rate,
            pitch: tts.pitch,
        });
    }
}
