//! Incoming event handling
//!
//! Events are delivered by an unreliable transport that may replay them after
//! a reconnect. The deduplicator keeps presentation idempotent.

mod dedup;

pub use alertcast_types::{AlertEvent, CustomOptions, EventKind};
pub use dedup::{Admission, DEFAULT_DEDUP_CAPACITY, EventDeduplicator};

/// Message delivered by the transport to an overlay instance
#[derive(Debug, Clone, PartialEq)]
pub enum TransportMessage {
    /// A new alert event
    Event(AlertEvent),
    /// Operator asked to skip the current alert
    Skip,
    /// Connection (re)established
    Connected,
    /// Connection lost; queued alerts keep playing
    Disconnected,
}
