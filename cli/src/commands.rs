use std::path::Path;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use alertcast_core::alerts::AnyAsset;
use alertcast_core::context::{AppSettings, load_overlay_config, validate_overlay_config};
use alertcast_core::overlay::{OverlayInstance, OverlayRuntime, watch_config};
use alertcast_core::playback::PlaybackSignal;
use alertcast_core::profanity::DirectoryWordLists;
use alertcast_core::timers::{
    FileStore, FileTickSink, TickSink, TimerCommand, TimerDisplay, TimerReplica, TimerService,
    create_timer_channel,
};
use alertcast_types::{TimerKind, TimerOverlayConfig};

use crate::presenter::AutoPresenter;
use crate::replay::{ReplayMessage, parse_replay, run_replay};

// ═══════════════════════════════════════════════════════════════════════════
// check
// ═══════════════════════════════════════════════════════════════════════════

pub fn check(config_path: &Path) -> Result<(), String> {
    let config = load_overlay_config(config_path).map_err(|e| e.to_string())?;
    let warnings = validate_overlay_config(&config).map_err(|e| e.to_string())?;

    println!("{}", config_path.display());
    println!("{:<20} {:<28} {:>8} {:>10}", "alert", "hooks", "variants", "components");
    for alert in &config.alerts {
        let hooks: Vec<&str> = alert.hooks.iter().map(|kind| kind.as_str()).collect();
        println!(
            "{:<20} {:<28} {:>8} {:>10}",
            alert.id,
            hooks.join(","),
            alert.variants.len(),
            alert.components.len()
        );
    }

    if warnings.is_empty() {
        println!("ok: {} alerts", config.alerts.len());
    } else {
        for warning in &warnings {
            println!("warning: {}", warning);
        }
        println!("ok with {} warnings", warnings.len());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// replay
// ═══════════════════════════════════════════════════════════════════════════

pub fn replay(
    config_path: &Path,
    events_path: &Path,
    seed: Option<u64>,
    settings: &AppSettings,
) -> Result<(), String> {
    let config = load_overlay_config(config_path).map_err(|e| e.to_string())?;
    let content = std::fs::read_to_string(events_path)
        .map_err(|e| format!("Failed to read {}: {}", events_path.display(), e))?;
    let lines = parse_replay(&content)?;

    let word_lists = DirectoryWordLists::new(&settings.word_list_dir);
    let mut instance =
        OverlayInstance::from_config("replay", config, &word_lists, Box::new(AnyAsset), seed)
            .with_dedup_capacity(settings.dedup_capacity);
    let mut presenter = AutoPresenter::default();

    tracing::info!(events = lines.len(), ?seed, "Starting replay");
    let report = run_replay(&mut instance, lines, &mut presenter, |at_ms, signal| {
        log_signal(Some(at_ms), signal);
    });

    println!(
        "{} completed, {} skipped, {} parried, {} dropped, {} spoken in {:.1}s",
        report.completed,
        report.skipped,
        report.parried,
        report.dropped,
        report.spoken,
        report.virtual_ms as f64 / 1000.0
    );
    Ok(())
}

fn log_signal(at_ms: Option<u64>, signal: &PlaybackSignal) {
    match signal {
        PlaybackSignal::EventDropped { event_id, reason } => {
            tracing::info!(?at_ms, %event_id, %reason, "Event dropped");
        }
        PlaybackSignal::AlertArmed { token, components } => {
            let visible = components.iter().filter(|c| c.visible).count();
            tracing::info!(?at_ms, %token, components = components.len(), visible, "Alert armed");
        }
        PlaybackSignal::Speak { token, text, .. } => {
            tracing::info!(?at_ms, %token, %text, "Speak");
        }
        other => tracing::info!(?at_ms, signal = ?other, "Signal"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// play
// ═══════════════════════════════════════════════════════════════════════════

/// Run an overlay on wall-clock time, reading transport messages from stdin.
///
/// Each stdin line is a JSON message in the replay format without `at_ms`.
/// The session ends at end of input.
pub async fn play(config_path: &Path, settings: &AppSettings) -> Result<(), String> {
    let config = load_overlay_config(config_path).map_err(|e| e.to_string())?;
    let word_lists = DirectoryWordLists::new(&settings.word_list_dir);
    let instance =
        OverlayInstance::from_config("play", config, &word_lists, Box::new(AnyAsset), None)
            .with_dedup_capacity(settings.dedup_capacity);

    let (runtime, handles) = OverlayRuntime::new(instance, Box::new(word_lists));
    let runtime_task = tokio::spawn(runtime.run());

    if settings.watch_config {
        let path = config_path.to_path_buf();
        let reload = handles.reload.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_config(path, reload).await {
                tracing::warn!(error = %e, "Config watcher stopped");
            }
        });
    }

    let transport = handles.transport.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ReplayMessage>(line) {
                Ok(message) => {
                    if transport.send(message.into()).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Ignoring malformed message"),
            }
        }
    });
    drop(handles.transport);

    let feedback = handles.feedback;
    let mut signals = handles.signals;
    let mut presenter = AutoPresenter::default();
    while let Some(signal) = signals.recv().await {
        log_signal(None, &signal);
        for (delay, response) in presenter.respond(&signal) {
            let feedback = feedback.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = feedback.send(response).await;
            });
        }
    }

    let instance = runtime_task.await.map_err(|e| e.to_string())?;
    println!(
        "session ended with {} alerts queued",
        instance.sequencer().queue_len()
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// timer
// ═══════════════════════════════════════════════════════════════════════════

pub struct TimerArgs {
    pub id: String,
    pub kind: TimerKind,
    pub persistent: bool,
    pub initial_ms: i64,
    pub paused: bool,
    pub show_ms: bool,
}

/// Run one timer replica until stdin closes.
///
/// Commands on stdin: `start`, `pause`, `reset`, `add <ms>`, `quit`.
pub async fn timer(
    args: TimerArgs,
    store_dir: &Path,
    settings: &AppSettings,
) -> Result<(), String> {
    let store = FileStore::open(store_dir).map_err(|e| e.to_string())?;
    let sink = args.persistent.then(|| {
        Box::new(FileTickSink::new(&settings.tick_persistence_dir)) as Box<dyn TickSink>
    });
    let config = TimerOverlayConfig {
        id: args.id,
        kind: args.kind,
        is_persistent: args.persistent,
        is_started_on_source_load: !args.paused,
        initial_time_ms: args.initial_ms,
        show_milliseconds: args.show_ms,
    };

    let replica = TimerReplica::load(config, store, sink, Utc::now().timestamp_millis())
        .map_err(|e| e.to_string())?;
    println!("session {}", replica.session_id());

    let (command_tx, command_rx) = create_timer_channel();
    let (display_tx, mut display_rx) = mpsc::channel::<TimerDisplay>(64);
    tokio::spawn(TimerService::new(replica, command_rx, display_tx).run());

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = match parse_timer_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => break,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            };
            if command_tx.send(command).await.is_err() {
                break;
            }
        }
    });

    while let Some(display) = display_rx.recv().await {
        println!(
            "{} [{}{}]",
            display.text,
            if display.is_leader { "leader" } else { "follower" },
            if display.enabled { "" } else { ", paused" }
        );
    }
    Ok(())
}

/// `Ok(None)` means quit
fn parse_timer_command(line: &str) -> Result<Option<TimerCommand>, String> {
    let mut parts = line.split_whitespace();
    let command = match parts.next() {
        Some("start") => TimerCommand::Start,
        Some("pause") => TimerCommand::Pause,
        Some("reset") => TimerCommand::Reset,
        Some("add") => {
            let ms = parts
                .next()
                .ok_or("usage: add <ms>")?
                .parse::<i64>()
                .map_err(|e| format!("invalid duration: {e}"))?;
            TimerCommand::AddTime(ms)
        }
        Some("quit") | Some("exit") => return Ok(None),
        Some(other) => return Err(format!("unknown command: {other}")),
        None => return Err("commands: start, pause, reset, add <ms>, quit".to_string()),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timer_commands() {
        assert_eq!(parse_timer_command("start"), Ok(Some(TimerCommand::Start)));
        assert_eq!(
            parse_timer_command("add -5000"),
            Ok(Some(TimerCommand::AddTime(-5_000)))
        );
        assert_eq!(parse_timer_command("quit"), Ok(None));
        assert!(parse_timer_command("add soon").is_err());
        assert!(parse_timer_command("rewind").is_err());
    }
}
