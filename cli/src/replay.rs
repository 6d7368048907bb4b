//! Virtual-time replay of a recorded event log
//!
//! Each line of the log is a JSON object with an `at_ms` offset and a
//! `type` of `event`, `skip`, `connected` or `disconnected`. Blank lines
//! and lines starting with `#` are ignored.

use std::time::{Duration, Instant};

use serde::Deserialize;

use alertcast_core::events::{AlertEvent, TransportMessage};
use alertcast_core::overlay::{OverlayInstance, TICK_INTERVAL};
use alertcast_core::playback::{ClearReason, PlaybackSignal, PresentationFeedback};

use crate::presenter::AutoPresenter;

/// Replays stop after this much virtual time even if alerts are still queued
const MAX_VIRTUAL_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayLine {
    pub at_ms: u64,
    #[serde(flatten)]
    pub message: ReplayMessage,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayMessage {
    Event { event: AlertEvent },
    Skip,
    Connected,
    Disconnected,
}

impl From<ReplayMessage> for TransportMessage {
    fn from(message: ReplayMessage) -> Self {
        match message {
            ReplayMessage::Event { event } => TransportMessage::Event(event),
            ReplayMessage::Skip => TransportMessage::Skip,
            ReplayMessage::Connected => TransportMessage::Connected,
            ReplayMessage::Disconnected => TransportMessage::Disconnected,
        }
    }
}

/// Parse a replay log, ordered by `at_ms` (stable for equal offsets)
pub fn parse_replay(content: &str) -> Result<Vec<ReplayLine>, String> {
    let mut lines = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed: ReplayLine = serde_json::from_str(line)
            .map_err(|e| format!("line {}: {}", index + 1, e))?;
        lines.push(parsed);
    }
    lines.sort_by_key(|line| line.at_ms);
    Ok(lines)
}

/// Outcome counts of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub completed: usize,
    pub skipped: usize,
    pub parried: usize,
    pub dropped: usize,
    pub spoken: usize,
    pub virtual_ms: u64,
}

/// Drive `instance` through `lines` on a virtual clock.
///
/// Every signal goes to `on_signal` along with its virtual timestamp, and
/// presenter feedback is delivered once its delay has elapsed.
pub fn run_replay(
    instance: &mut OverlayInstance,
    lines: Vec<ReplayLine>,
    presenter: &mut AutoPresenter,
    mut on_signal: impl FnMut(u64, &PlaybackSignal),
) -> ReplayReport {
    let origin = Instant::now();
    let step = TICK_INTERVAL.as_millis() as u64;
    let mut report = ReplayReport::default();
    let mut pending: Vec<(u64, PresentationFeedback)> = Vec::new();
    let mut lines = lines.into_iter().peekable();
    let mut t = 0u64;

    loop {
        let now = origin + Duration::from_millis(t);
        let mut signals = Vec::new();

        while let Some(line) = lines.next_if(|line| line.at_ms <= t) {
            signals.extend(instance.handle(line.message.into(), now));
        }

        pending.sort_by_key(|(due, _)| *due);
        let split = pending.partition_point(|(due, _)| *due <= t);
        for (_, feedback) in pending.drain(..split).collect::<Vec<_>>() {
            signals.extend(instance.feedback(feedback, now));
        }

        signals.extend(instance.tick(now));

        for signal in &signals {
            on_signal(t, signal);
            tally(&mut report, signal);
            for (delay, feedback) in presenter.respond(signal) {
                pending.push((t + delay.as_millis() as u64, feedback));
            }
        }

        if lines.peek().is_none() && pending.is_empty() && instance.is_settled() {
            break;
        }
        if t >= MAX_VIRTUAL_MS {
            tracing::warn!(virtual_ms = t, "Replay did not settle, giving up");
            break;
        }
        t += step;
    }

    report.virtual_ms = t;
    report
}

fn tally(report: &mut ReplayReport, signal: &PlaybackSignal) {
    match signal {
        PlaybackSignal::AlertCleared { reason, .. } => match reason {
            ClearReason::Completed => report.completed += 1,
            ClearReason::Skipped => report.skipped += 1,
            ClearReason::Parried => report.parried += 1,
        },
        PlaybackSignal::EventDropped { .. } => report.dropped += 1,
        PlaybackSignal::Speak { .. } => report.spoken += 1,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertcast_core::alerts::AnyAsset;
    use alertcast_core::context::parse_overlay_config;
    use alertcast_core::profanity::StaticWordLists;
    use std::path::Path;

    const CONFIG: &str = r#"
alert_delay_ms = 0

[[alerts]]
id = "tips"
hooks = ["tip"]
alert_duration = 2000

[[alerts.components]]
id = "sound"
type = "audio"

[[alerts.components]]
id = "voice"
type = "tts"
template = "{name} tipped {amount}"
"#;

    fn make_instance() -> OverlayInstance {
        let config = parse_overlay_config(CONFIG, Path::new("test.toml")).unwrap();
        OverlayInstance::from_config(
            "replay",
            config,
            &StaticWordLists::default(),
            Box::new(AnyAsset),
            Some(7),
        )
    }

    fn tip_line(at_ms: u64, id: &str) -> String {
        format!(
            r#"{{"at_ms":{at_ms},"type":"event","event":{{"id":"{id}","kind":"tip","username":"ann","amount":5}}}}"#
        )
    }

    #[test]
    fn test_parse_skips_comments_and_sorts() {
        let content = format!(
            "# recorded stream\n{}\n\n{{\"at_ms\":100,\"type\":\"skip\"}}\n",
            tip_line(500, "a")
        );
        let lines = parse_replay(&content).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].message, ReplayMessage::Skip);
        assert_eq!(lines[1].at_ms, 500);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_replay("\n{\"at_ms\":1,\"type\":\"bogus\"}").unwrap_err();
        assert!(err.starts_with("line 2:"), "{err}");
    }

    #[test]
    fn test_replay_plays_each_event_once() {
        let content = [tip_line(0, "a"), tip_line(100, "b"), tip_line(200, "a")].join("\n");
        let lines = parse_replay(&content).unwrap();
        let mut instance = make_instance();
        let mut presenter = AutoPresenter::default();

        let report = run_replay(&mut instance, lines, &mut presenter, |_, _| {});

        assert_eq!(report.completed, 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.spoken, 2);
        assert!(instance.is_settled());
    }

    #[test]
    fn test_replay_skip_clears_current_alert() {
        let content = format!("{}\n{{\"at_ms\":300,\"type\":\"skip\"}}", tip_line(0, "a"));
        let lines = parse_replay(&content).unwrap();
        let mut instance = make_instance();
        let mut presenter = AutoPresenter::default();

        let report = run_replay(&mut instance, lines, &mut presenter, |_, _| {});

        assert_eq!(report.skipped, 1);
        assert_eq!(report.completed, 0);
    }
}
