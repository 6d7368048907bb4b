//! Replicated timers (stopwatch, countdown, marathon)
//!
//! This module provides:
//! - **Store**: the shared key-value store replicas coordinate through
//! - **Replica**: leader election and clock replication for one instance
//! - **Persistence**: best-effort durable ticks for persistent timers
//! - **Service**: the async task that drives a replica on wall-clock time
//!
//! # Keys
//!
//! - `controller-<id>`: session id of the current leader
//! - `controller-<id>-state`: `{currentTime, currentTimeAt, enabled, sessionId}`

mod error;
mod persistence;
mod replica;
mod service;
mod store;


pub use alertcast_types::{TimerKind, TimerOverlayConfig};
pub use error::TimerError;
pub use persistence::{FileTickSink, TickSink};
pub use replica::{
    DURABLE_WRITE_DEBOUNCE_MS, FOLLOWER_POLL, LEADER_TICK, Role, SHARED_WRITE_DEBOUNCE_MS,
    STALE_LEADER_MS, SharedTimerState, TimerReplica, read_state,
};
pub use service::{TimerCommand, TimerCommandSender, TimerDisplay, TimerService, create_timer_channel};
pub use store::{FileStore, MemoryStore, SharedStore, controller_key, state_key};
