//! Per-overlay pipeline state
//!
//! Everything one overlay needs lives here, so several overlays in one
//! process never share dedup memory, queues or random state.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use alertcast_types::{AlertEvent, AlertsOverlayConfig};

use crate::alerts::{AlertResolver, AssetCatalog, Unresolved};
use crate::events::{Admission, EventDeduplicator, TransportMessage};
use crate::playback::{
    DropReason, PlaybackSequencer, PlaybackSignal, PlaybackState, PreparedAlert,
    PresentationFeedback, SequencerConfig,
};
use crate::profanity::{ProfanityFilter, WordListSource};

/// One alerts overlay: dedup → profanity → queue → sequencer
pub struct OverlayInstance {
    id: String,
    config: AlertsOverlayConfig,
    resolver: AlertResolver,
    profanity: ProfanityFilter,
    dedup: EventDeduplicator,
    sequencer: PlaybackSequencer,
    assets: Box<dyn AssetCatalog + Send>,
    rng: StdRng,
    connected: bool,
}

impl OverlayInstance {
    pub fn new(
        id: impl Into<String>,
        config: AlertsOverlayConfig,
        profanity: ProfanityFilter,
        assets: Box<dyn AssetCatalog + Send>,
        rng: StdRng,
    ) -> Self {
        Self {
            id: id.into(),
            resolver: AlertResolver::new(config.alerts.clone()),
            sequencer: PlaybackSequencer::new(SequencerConfig::from_overlay(&config)),
            config,
            profanity,
            dedup: EventDeduplicator::default(),
            assets,
            rng,
            connected: false,
        }
    }

    /// Build with word lists loaded for the config's profanity languages
    pub fn from_config(
        id: impl Into<String>,
        config: AlertsOverlayConfig,
        word_lists: &dyn WordListSource,
        assets: Box<dyn AssetCatalog + Send>,
        seed: Option<u64>,
    ) -> Self {
        let profanity = ProfanityFilter::from_config(&config.profanity, word_lists);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(id, config, profanity, assets, rng)
    }

    pub fn with_dedup_capacity(mut self, capacity: usize) -> Self {
        self.dedup = EventDeduplicator::new(capacity);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &AlertsOverlayConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.sequencer.state()
    }

    pub fn sequencer(&self) -> &PlaybackSequencer {
        &self.sequencer
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Idle with nothing queued
    pub fn is_settled(&self) -> bool {
        self.sequencer.is_idle() && self.sequencer.queue_len() == 0
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Input
    // ═══════════════════════════════════════════════════════════════════════

    pub fn handle(&mut self, message: TransportMessage, now: Instant) -> Vec<PlaybackSignal> {
        match message {
            TransportMessage::Event(event) => self.receive(event, now),
            TransportMessage::Skip => self.skip(now),
            TransportMessage::Connected => {
                self.set_connected(true);
                Vec::new()
            }
            TransportMessage::Disconnected => {
                self.set_connected(false);
                Vec::new()
            }
        }
    }

    /// Accept an event from the transport
    pub fn receive(&mut self, mut event: AlertEvent, now: Instant) -> Vec<PlaybackSignal> {
        if self.dedup.process(&event.id) == Admission::Duplicate {
            tracing::debug!(overlay = %self.id, event_id = %event.id, "Dropping duplicate event");
            return vec![dropped(event.id, DropReason::Duplicate)];
        }

        if let Some(message) = event.message.take() {
            match self.profanity.sanitize(&message, &mut self.rng) {
                Some(clean) => event.message = Some(clean),
                None => {
                    tracing::info!(overlay = %self.id, event_id = %event.id, "Alert cancelled by profanity filter");
                    return vec![dropped(event.id, DropReason::Profanity)];
                }
            }
        }

        if !self.resolver.has_candidates(&event) {
            let reason = self
                .resolver
                .try_resolve(&event, &mut self.rng)
                .err()
                .unwrap_or(Unresolved::FilteredOut);
            tracing::debug!(overlay = %self.id, event_id = %event.id, kind = %event.kind, %reason, "No alert for event");
            return vec![dropped(event.id, DropReason::Unresolved(reason))];
        }

        self.sequencer.submit(event, now);
        self.tick(now)
    }

    pub fn skip(&mut self, now: Instant) -> Vec<PlaybackSignal> {
        tracing::info!(overlay = %self.id, "Skip requested");
        self.sequencer.skip(now)
    }

    pub fn feedback(&mut self, feedback: PresentationFeedback, now: Instant) -> Vec<PlaybackSignal> {
        self.sequencer.feedback(feedback, now)
    }

    /// Advance timers and the queue
    pub fn tick(&mut self, now: Instant) -> Vec<PlaybackSignal> {
        let Self {
            sequencer,
            resolver,
            rng,
            config,
            assets,
            ..
        } = self;

        sequencer.tick(now, |event| {
            let selected = resolver.try_resolve(event, &mut *rng)?;
            Ok(PreparedAlert::prepare(selected, event, config, &**assets))
        })
    }

    /// Swap in a new config. The running alert finishes with its old settings.
    pub fn reload(&mut self, config: AlertsOverlayConfig, word_lists: &dyn WordListSource) {
        self.profanity = ProfanityFilter::from_config(&config.profanity, word_lists);
        self.resolver.replace_definitions(config.alerts.clone());
        self.sequencer.set_config(SequencerConfig::from_overlay(&config));
        tracing::info!(overlay = %self.id, alerts = config.alerts.len(), "Overlay config reloaded");
        self.config = config;
    }

    pub fn set_connected(&mut self, connected: bool) {
        if connected == self.connected {
            return;
        }
        self.connected = connected;
        if connected {
            tracing::info!(overlay = %self.id, "Transport connected");
        } else {
            // Queued alerts keep playing; new events resume on reconnect
            tracing::warn!(overlay = %self.id, queued = self.sequencer.queue_len(), "Transport disconnected");
        }
    }
}

fn dropped(event_id: String, reason: DropReason) -> PlaybackSignal {
    PlaybackSignal::EventDropped { event_id, reason }
}
