//! Async driver for one overlay instance
//!
//! All state mutation happens on this task; the transport, the presentation
//! layer and the config reloader only talk to it through channels.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use alertcast_types::AlertsOverlayConfig;

use crate::context::{ConfigEvent, ConfigWatcher, WatcherError, load_overlay_config};
use crate::events::TransportMessage;
use crate::playback::{PlaybackSignal, PresentationFeedback};
use crate::profanity::WordListSource;

use super::OverlayInstance;

/// Queue poll and timer cadence
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub struct OverlayRuntime {
    instance: OverlayInstance,
    word_lists: Box<dyn WordListSource + Send>,
    transport_rx: mpsc::Receiver<TransportMessage>,
    feedback_rx: mpsc::Receiver<PresentationFeedback>,
    reload_rx: mpsc::Receiver<AlertsOverlayConfig>,
    signal_tx: mpsc::Sender<PlaybackSignal>,
}

/// Sending halves handed to the collaborators of an [`OverlayRuntime`]
pub struct OverlayHandles {
    pub transport: mpsc::Sender<TransportMessage>,
    pub feedback: mpsc::Sender<PresentationFeedback>,
    pub reload: mpsc::Sender<AlertsOverlayConfig>,
    pub signals: mpsc::Receiver<PlaybackSignal>,
}

impl OverlayRuntime {
    pub fn new(
        instance: OverlayInstance,
        word_lists: Box<dyn WordListSource + Send>,
    ) -> (Self, OverlayHandles) {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let (feedback_tx, feedback_rx) = mpsc::channel(256);
        let (reload_tx, reload_rx) = mpsc::channel(4);
        let (signal_tx, signal_rx) = mpsc::channel(256);

        let runtime = Self {
            instance,
            word_lists,
            transport_rx,
            feedback_rx,
            reload_rx,
            signal_tx,
        };
        let handles = OverlayHandles {
            transport: transport_tx,
            feedback: feedback_tx,
            reload: reload_tx,
            signals: signal_rx,
        };
        (runtime, handles)
    }

    /// Run until the transport closes or nobody listens for signals
    pub async fn run(mut self) -> OverlayInstance {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let signals = tokio::select! {
                message = self.transport_rx.recv() => {
                    let Some(message) = message else {
                        tracing::info!(overlay = %self.instance.id(), "Transport closed");
                        break;
                    };
                    self.instance.handle(message, now())
                }
                Some(feedback) = self.feedback_rx.recv() => {
                    self.instance.feedback(feedback, now())
                }
                Some(config) = self.reload_rx.recv() => {
                    self.instance.reload(config, &*self.word_lists);
                    Vec::new()
                }
                _ = ticker.tick() => self.instance.tick(now()),
            };

            if !emit(&self.signal_tx, signals).await {
                tracing::info!(overlay = %self.instance.id(), "Presentation gone");
                break;
            }
        }

        self.instance
    }
}

/// Forward signals in order. False once the receiver is gone.
async fn emit(tx: &mpsc::Sender<PlaybackSignal>, signals: Vec<PlaybackSignal>) -> bool {
    for signal in signals {
        if tx.send(signal).await.is_err() {
            return false;
        }
    }
    true
}

/// Tokio's clock, so paused-time tests drive the sequencer too
fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

/// Watch `path` and push every successfully reloaded config to `reload`.
///
/// A config that fails to load is logged and the overlay keeps its current
/// one.
pub async fn watch_config(
    path: PathBuf,
    reload: mpsc::Sender<AlertsOverlayConfig>,
) -> Result<(), WatcherError> {
    let mut watcher = ConfigWatcher::new(&path)?;
    tracing::info!(path = %path.display(), "Watching overlay config");

    while let Some(event) = watcher.next_event().await {
        match event {
            ConfigEvent::Changed(path) => match load_overlay_config(&path) {
                Ok(config) => {
                    if reload.send(config).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Keeping previous overlay config")
                }
            },
            ConfigEvent::Removed(path) => {
                tracing::warn!(path = %path.display(), "Overlay config removed, keeping previous")
            }
            ConfigEvent::Error(message) => tracing::warn!(%message, "Config watcher error"),
        }
    }
    Ok(())
}
