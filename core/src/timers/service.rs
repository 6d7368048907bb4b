//! Background task driving a timer replica on wall-clock time

use chrono::Utc;
use tokio::sync::mpsc;

use super::{SharedStore, TimerReplica};

/// Operator controls for a running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Pause,
    Reset,
    AddTime(i64),
}

/// What the timer overlay should currently show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerDisplay {
    pub timer_id: String,
    pub text: String,
    pub current_time_ms: i64,
    pub enabled: bool,
    pub is_leader: bool,
}

pub type TimerCommandSender = mpsc::Sender<TimerCommand>;

/// Create the command channel for a [`TimerService`]
pub fn create_timer_channel() -> (TimerCommandSender, mpsc::Receiver<TimerCommand>) {
    mpsc::channel(16)
}

/// Ticks a replica at its role's cadence and reports every display change
pub struct TimerService<S> {
    replica: TimerReplica<S>,
    command_rx: mpsc::Receiver<TimerCommand>,
    display_tx: mpsc::Sender<TimerDisplay>,
}

impl<S: SharedStore> TimerService<S> {
    pub fn new(
        replica: TimerReplica<S>,
        command_rx: mpsc::Receiver<TimerCommand>,
        display_tx: mpsc::Sender<TimerDisplay>,
    ) -> Self {
        Self {
            replica,
            command_rx,
            display_tx,
        }
    }

    /// Run until the display receiver or the command sender is dropped
    pub async fn run(mut self) {
        let mut last_shown: Option<TimerDisplay> = None;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.replica.poll_interval()) => {
                    let now_ms = Utc::now().timestamp_millis();
                    if let Err(e) = self.replica.tick(now_ms) {
                        tracing::warn!(timer_id = %self.replica.config().id, error = %e, "Timer tick failed");
                    }
                }
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.apply(command);
                }
            }

            // Millisecond drift alone is not worth a redraw
            let display = self.snapshot();
            let changed = last_shown.as_ref().is_none_or(|shown| {
                shown.text != display.text
                    || shown.enabled != display.enabled
                    || shown.is_leader != display.is_leader
            });
            if changed {
                if self.display_tx.send(display.clone()).await.is_err() {
                    break;
                }
                last_shown = Some(display);
            }
        }

        tracing::debug!(timer_id = %self.replica.config().id, "Timer service stopped");
    }

    fn apply(&mut self, command: TimerCommand) {
        let now_ms = Utc::now().timestamp_millis();
        let result = match command {
            TimerCommand::Start => self.replica.start(now_ms),
            TimerCommand::Pause => self.replica.pause(now_ms),
            TimerCommand::Reset => self.replica.reset(now_ms),
            TimerCommand::AddTime(delta) => self.replica.add_time(delta, now_ms),
        };

        match result {
            Ok(true) => tracing::info!(timer_id = %self.replica.config().id, ?command, "Timer control applied"),
            Ok(false) => {}
            Err(e) => tracing::warn!(timer_id = %self.replica.config().id, ?command, error = %e, "Timer control failed"),
        }
    }

    fn snapshot(&self) -> TimerDisplay {
        TimerDisplay {
            timer_id: self.replica.config().id.clone(),
            text: self.replica.display(),
            current_time_ms: self.replica.current_time(),
            enabled: self.replica.enabled(),
            is_leader: self.replica.is_leader(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alertcast_types::{TimerKind, TimerOverlayConfig};

    use super::*;
    use crate::timers::MemoryStore;

    fn make_service() -> (
        TimerService<MemoryStore>,
        TimerCommandSender,
        mpsc::Receiver<TimerDisplay>,
    ) {
        let config = TimerOverlayConfig {
            id: "stream".to_string(),
            kind: TimerKind::Stopwatch,
            is_persistent: false,
            is_started_on_source_load: false,
            initial_time_ms: 0,
            show_milliseconds: false,
        };
        let replica = TimerReplica::load(
            config,
            MemoryStore::new(),
            None,
            Utc::now().timestamp_millis(),
        )
        .unwrap();
        let (command_tx, command_rx) = create_timer_channel();
        let (display_tx, display_rx) = mpsc::channel(16);
        (TimerService::new(replica, command_rx, display_tx), command_tx, display_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_publish_changed_displays_only() {
        let (service, commands, mut displays) = make_service();
        let task = tokio::spawn(service.run());

        let first = displays.recv().await.unwrap();
        assert_eq!(first.timer_id, "stream");
        assert_eq!(first.text, "00:00:00");
        assert!(first.is_leader);
        assert!(!first.enabled);

        commands.send(TimerCommand::AddTime(60_000)).await.unwrap();
        let added = displays.recv().await.unwrap();
        assert_eq!(added.text, "00:01:00");
        assert!(!added.enabled);

        commands.send(TimerCommand::Start).await.unwrap();
        assert!(displays.recv().await.unwrap().enabled);

        commands.send(TimerCommand::Pause).await.unwrap();
        let paused = displays.recv().await.unwrap();
        assert!(!paused.enabled);
        assert_eq!(paused.text, "00:01:00");

        // A paused clock ticks many times without anything to redraw
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(displays.try_recv().is_err());

        drop(commands);
        task.await.unwrap();
    }
}
