//! Tests for PlaybackSequencer lifecycle
//!
//! Time is driven explicitly from a fixed origin so every transition lands on
//! an exact millisecond.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alertcast_types::{
    AlertDefinition, AlertEvent, AnimationOverrides, CustomOptions, EventKind, Filter, Geometry,
};

use crate::alerts::{SelectedVariant, Unresolved};

use super::{
    AlertToken, ClearReason, ComponentProjection, DropReason, PlaybackSequencer, PlaybackSignal,
    PlaybackState, PreparedAlert, PresentationFeedback, SequencerConfig,
};

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

const DRAIN_MS: u64 = 2_000;

fn make_definition(id: &str, duration_ms: u64) -> AlertDefinition {
    AlertDefinition {
        id: id.to_string(),
        name: id.to_string(),
        hooks: vec![EventKind::Tip],
        reward_id: None,
        enabled: true,
        weight: 1,
        filter: Filter::default(),
        alert_duration: duration_ms,
        animation: AnimationOverrides::default(),
        components: Vec::new(),
        variants: Vec::new(),
    }
}

fn make_component(id: &str, kind: &'static str) -> ComponentProjection {
    ComponentProjection {
        component_id: id.to_string(),
        kind,
        visible: true,
        geometry: Geometry::default(),
        animation_type: "fadeIn".to_string(),
        animation_duration_ms: 500,
        animation_delay_ms: 0,
        animation_out: "fadeOut".to_string(),
        animation_out_duration_ms: DRAIN_MS,
        text_animation: None,
        resolved_text: (kind == "tts").then(|| "thanks for the tip".to_string()),
        resolved_font: None,
        resolved_volume: Some(1.0),
        asset: None,
        start_delay_ms: 0,
        voice: None,
    }
}

fn make_prepared(duration_ms: u64, components: Vec<ComponentProjection>) -> PreparedAlert {
    let definition = make_definition("alert", duration_ms);
    PreparedAlert {
        selected: SelectedVariant::main(Arc::new(definition)),
        components,
        animation_out: "fadeOut".to_string(),
        animation_out_duration_ms: DRAIN_MS,
    }
}

fn make_event(id: &str, kind: EventKind) -> AlertEvent {
    AlertEvent::new(id, kind, "Viewer")
}

fn at(origin: Instant, ms: u64) -> Instant {
    origin + Duration::from_millis(ms)
}

/// Prepare every event with the same shape
fn fixed(
    duration_ms: u64,
    components: Vec<ComponentProjection>,
) -> impl FnMut(&AlertEvent) -> Result<PreparedAlert, Unresolved> {
    move |_: &AlertEvent| Ok(make_prepared(duration_ms, components.clone()))
}

fn no_events(_: &AlertEvent) -> Result<PreparedAlert, Unresolved> {
    panic!("queue should be empty")
}

fn speaks(signals: &[PlaybackSignal]) -> usize {
    signals
        .iter()
        .filter(|s| matches!(s, PlaybackSignal::Speak { .. }))
        .count()
}

fn cleared(signals: &[PlaybackSignal]) -> Option<(AlertToken, ClearReason)> {
    signals.iter().find_map(|s| match s {
        PlaybackSignal::AlertCleared { token, reason } => Some((*token, *reason)),
        _ => None,
    })
}

fn ready(token: AlertToken, id: &str) -> PresentationFeedback {
    PresentationFeedback::ComponentReady {
        token,
        component_id: id.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TTS Barrier
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_tts_speaks_immediately_without_audio() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);

    let signals = seq.tick(t0, fixed(5_000, vec![make_component("tts", "tts")]));
    assert_eq!(seq.state(), PlaybackState::Armed);
    assert_eq!(speaks(&signals), 0);

    let token = seq.current().unwrap().token;
    let signals = seq.feedback(ready(token, "tts"), t0);
    assert_eq!(seq.state(), PlaybackState::Playing);
    assert_eq!(seq.current().unwrap().barrier.expected(), Some(0));
    assert_eq!(speaks(&signals), 1);
}

#[test]
fn test_tts_waits_for_every_sound() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);

    let components = vec![
        make_component("horn", "audio"),
        make_component("chime", "audio"),
        make_component("tts", "tts"),
    ];
    seq.tick(t0, fixed(5_000, components));
    let token = seq.current().unwrap().token;

    let mut signals = Vec::new();
    for id in ["horn", "chime", "tts"] {
        signals.extend(seq.feedback(ready(token, id), t0));
    }
    assert!(signals.contains(&PlaybackSignal::ComponentsShown { token }));
    assert_eq!(speaks(&signals), 0);

    let first = seq.feedback(PresentationFeedback::SoundFinished { token }, at(t0, 100));
    assert_eq!(speaks(&first), 0);
    assert_eq!(seq.current().unwrap().barrier.finished(), 1);

    let second = seq.feedback(PresentationFeedback::SoundFinished { token }, at(t0, 200));
    assert_eq!(speaks(&second), 1);
    assert!(seq.current().unwrap().is_waiting_for_tts());
}

#[test]
fn test_speak_delay_is_honoured() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);

    let mut tts = make_component("tts", "tts");
    tts.start_delay_ms = 300;
    seq.tick(t0, fixed(5_000, vec![tts]));
    let token = seq.current().unwrap().token;

    assert_eq!(speaks(&seq.feedback(ready(token, "tts"), t0)), 0);
    assert_eq!(speaks(&seq.tick(at(t0, 299), no_events)), 0);
    assert_eq!(speaks(&seq.tick(at(t0, 300), no_events)), 1);
}

#[test]
fn test_muted_audio_does_not_gate_speech() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);

    let mut muted = make_component("horn", "audio");
    muted.visible = false;
    seq.tick(t0, fixed(5_000, vec![muted, make_component("tts", "tts")]));
    let token = seq.current().unwrap().token;

    let signals = seq.feedback(ready(token, "tts"), t0);
    assert_eq!(speaks(&signals), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Lifecycle Timing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_alert_delay_holds_scheduled() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::new(SequencerConfig {
        alert_delay: Duration::from_millis(1_500),
        ..SequencerConfig::default()
    });
    seq.submit(make_event("e1", EventKind::Follow), t0);

    let signals = seq.tick(t0, fixed(1_000, Vec::new()));
    assert!(matches!(
        signals[0],
        PlaybackSignal::AlertScheduled { starts_in_ms: 1_500, .. }
    ));
    assert_eq!(seq.state(), PlaybackState::Scheduled);

    seq.tick(at(t0, 1_499), no_events);
    assert_eq!(seq.state(), PlaybackState::Scheduled);

    seq.tick(at(t0, 1_500), no_events);
    assert_eq!(seq.state(), PlaybackState::Playing);
}

#[test]
fn test_readiness_timeout_shows_anyway() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);

    seq.tick(t0, fixed(5_000, vec![make_component("text", "text")]));
    seq.tick(at(t0, 999), no_events);
    assert_eq!(seq.state(), PlaybackState::Armed);

    let signals = seq.tick(at(t0, 1_000), no_events);
    assert_eq!(seq.state(), PlaybackState::Playing);
    assert!(matches!(signals[0], PlaybackSignal::ComponentsShown { .. }));
}

#[test]
fn test_drain_then_clear() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);
    seq.tick(t0, fixed(1_000, Vec::new()));
    assert_eq!(seq.state(), PlaybackState::Playing);

    let signals = seq.tick(at(t0, 1_000), no_events);
    assert_eq!(seq.state(), PlaybackState::Draining);
    assert!(matches!(
        &signals[0],
        PlaybackSignal::AlertDraining { duration_ms: DRAIN_MS, .. }
    ));

    seq.tick(at(t0, 2_999), no_events);
    assert_eq!(seq.state(), PlaybackState::Draining);

    let signals = seq.tick(at(t0, 3_000), no_events);
    assert_eq!(cleared(&signals), Some((AlertToken(1), ClearReason::Completed)));
    assert!(seq.is_idle());
}

#[test]
fn test_custom_duration_extends_alert() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    let mut event = make_event("e1", EventKind::Custom);
    event.custom_options = Some(CustomOptions {
        alert_duration: Some(5_000),
    });
    seq.submit(event, t0);
    seq.tick(t0, fixed(1_000, Vec::new()));

    seq.tick(at(t0, 4_999), no_events);
    assert_eq!(seq.state(), PlaybackState::Playing);
    seq.tick(at(t0, 5_000), no_events);
    assert_eq!(seq.state(), PlaybackState::Draining);
}

#[test]
fn test_drain_waits_for_speaking_tts() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);
    seq.tick(t0, fixed(1_000, vec![make_component("tts", "tts")]));
    let token = seq.current().unwrap().token;
    seq.feedback(ready(token, "tts"), t0);

    seq.tick(at(t0, 3_000), no_events);
    assert_eq!(seq.state(), PlaybackState::Draining);

    let signals = seq.feedback(PresentationFeedback::TtsFinished { token }, at(t0, 3_500));
    assert_eq!(cleared(&signals), Some((token, ClearReason::Completed)));
}

#[test]
fn test_overrunning_tts_is_cancelled_after_grace() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);
    seq.tick(t0, fixed(1_000, vec![make_component("tts", "tts")]));
    let token = seq.current().unwrap().token;
    seq.feedback(ready(token, "tts"), t0);

    seq.tick(at(t0, 12_999), no_events);
    assert_eq!(seq.state(), PlaybackState::Draining);

    let signals = seq.tick(at(t0, 13_000), no_events);
    assert!(signals.contains(&PlaybackSignal::CancelTts { token }));
    assert_eq!(cleared(&signals), Some((token, ClearReason::Completed)));
}

#[test]
fn test_unopened_barrier_does_not_hold_slot() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);
    seq.tick(
        t0,
        fixed(1_000, vec![make_component("horn", "audio"), make_component("tts", "tts")]),
    );
    let token = seq.current().unwrap().token;
    seq.feedback(ready(token, "horn"), t0);
    seq.feedback(ready(token, "tts"), t0);

    // The sound never reports back, so narration never starts
    let signals = seq.tick(at(t0, 3_000), no_events);
    assert_eq!(speaks(&signals), 0);
    assert_eq!(cleared(&signals), Some((token, ClearReason::Completed)));
}

// ═══════════════════════════════════════════════════════════════════════════
// Queueing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_second_event_waits_for_idle() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    let mut prepare = fixed(1_000, Vec::new());

    seq.submit(make_event("e1", EventKind::Follow), t0);
    seq.tick(t0, &mut prepare);
    seq.submit(make_event("e2", EventKind::Follow), at(t0, 100));

    seq.tick(at(t0, 100), &mut prepare);
    assert_eq!(seq.current().unwrap().event.id, "e1");
    assert_eq!(seq.queue_len(), 1);

    seq.tick(at(t0, 2_999), &mut prepare);
    assert_eq!(seq.current().unwrap().event.id, "e1");

    let signals = seq.tick(at(t0, 3_000), &mut prepare);
    assert_eq!(cleared(&signals), Some((AlertToken(1), ClearReason::Completed)));
    assert_eq!(seq.current().unwrap().event.id, "e2");
    assert_eq!(seq.current().unwrap().token, AlertToken(2));
    assert_eq!(seq.queue_len(), 0);
}

#[test]
fn test_unresolvable_event_never_blocks_queue() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("deleted", EventKind::Custom), t0);
    seq.submit(make_event("good", EventKind::Tip), t0);

    let signals = seq.tick(t0, |event: &AlertEvent| {
        if event.id == "deleted" {
            Err(Unresolved::UnknownAlert("gone".to_string()))
        } else {
            Ok(make_prepared(1_000, Vec::new()))
        }
    });

    assert_eq!(
        signals[0],
        PlaybackSignal::EventDropped {
            event_id: "deleted".to_string(),
            reason: DropReason::Unresolved(Unresolved::UnknownAlert("gone".to_string())),
        }
    );
    assert_eq!(seq.current().unwrap().event.id, "good");
}

// ═══════════════════════════════════════════════════════════════════════════
// Cancellation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_skip_clears_and_ignores_stale_feedback() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    seq.submit(make_event("e1", EventKind::Tip), t0);
    seq.tick(t0, fixed(10_000, vec![make_component("tts", "tts")]));
    let token = seq.current().unwrap().token;
    seq.feedback(ready(token, "tts"), t0);

    let signals = seq.skip(at(t0, 500));
    assert_eq!(
        signals,
        vec![
            PlaybackSignal::StopAudio { token },
            PlaybackSignal::CancelTts { token },
            PlaybackSignal::AlertCleared {
                token,
                reason: ClearReason::Skipped
            },
        ]
    );
    assert!(seq.is_idle());

    assert!(seq
        .feedback(PresentationFeedback::TtsFinished { token }, at(t0, 600))
        .is_empty());
    assert!(seq.skip(at(t0, 700)).is_empty());
}

#[test]
fn test_stale_feedback_does_not_touch_next_alert() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::default();
    let mut prepare = fixed(10_000, vec![make_component("horn", "audio"), make_component("tts", "tts")]);

    seq.submit(make_event("e1", EventKind::Tip), t0);
    seq.submit(make_event("e2", EventKind::Tip), t0);
    seq.tick(t0, &mut prepare);
    let first = seq.current().unwrap().token;
    seq.skip(t0);

    seq.tick(at(t0, 100), &mut prepare);
    let second = seq.current().unwrap().token;
    assert_ne!(first, second);
    seq.feedback(ready(second, "horn"), at(t0, 100));
    seq.feedback(ready(second, "tts"), at(t0, 100));

    let signals = seq.feedback(PresentationFeedback::SoundFinished { token: first }, at(t0, 200));
    assert!(signals.is_empty());
    assert_eq!(seq.current().unwrap().barrier.finished(), 0);
}

#[test]
fn test_parry_forces_out_running_alert() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::new(SequencerConfig {
        parry_enabled: true,
        parry_delay: Duration::from_millis(500),
        ..SequencerConfig::default()
    });
    let mut prepare = fixed(10_000, Vec::new());

    seq.submit(make_event("tip-1", EventKind::Tip), t0);
    seq.tick(t0, &mut prepare);
    seq.submit(make_event("tip-2", EventKind::Cheer), at(t0, 100));

    seq.tick(at(t0, 599), &mut prepare);
    assert_eq!(seq.current().unwrap().event.id, "tip-1");

    let signals = seq.tick(at(t0, 600), &mut prepare);
    assert_eq!(cleared(&signals), Some((AlertToken(1), ClearReason::Parried)));
    assert_eq!(seq.current().unwrap().event.id, "tip-2");
}

#[test]
fn test_parry_cuts_any_running_alert_short() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::new(SequencerConfig {
        parry_enabled: true,
        parry_delay: Duration::from_millis(500),
        ..SequencerConfig::default()
    });
    let mut prepare = fixed(10_000, Vec::new());

    seq.submit(make_event("follow", EventKind::Follow), t0);
    seq.tick(t0, &mut prepare);
    seq.submit(make_event("tip", EventKind::Tip), at(t0, 100));

    let signals = seq.tick(at(t0, 600), &mut prepare);
    assert_eq!(cleared(&signals), Some((AlertToken(1), ClearReason::Parried)));
    assert_eq!(seq.current().unwrap().event.id, "tip");
    assert_eq!(seq.queue_len(), 0);
}

#[test]
fn test_unparryable_event_waits_its_turn() {
    let t0 = Instant::now();
    let mut seq = PlaybackSequencer::new(SequencerConfig {
        parry_enabled: true,
        parry_delay: Duration::from_millis(500),
        ..SequencerConfig::default()
    });
    let mut prepare = fixed(10_000, Vec::new());

    seq.submit(make_event("tip", EventKind::Tip), t0);
    seq.tick(t0, &mut prepare);
    seq.submit(make_event("follow", EventKind::Follow), at(t0, 100));

    let signals = seq.tick(at(t0, 5_000), &mut prepare);
    assert_eq!(cleared(&signals), None);
    assert_eq!(seq.current().unwrap().event.id, "tip");
    assert_eq!(seq.queue_len(), 1);
}
