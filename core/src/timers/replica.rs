//! Leader-elected timer replica
//!
//! Several instances may render the same timer. Each one is a replica with a
//! random session id; the replica whose id sits under `controller-<id>` is the
//! leader and the only one advancing and publishing the clock. Followers
//! extrapolate from the last published state and take over once it goes
//! stale.
//!
//! Election is last-writer-wins. Replicas are cooperative, so there is no
//! quorum or fencing.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use alertcast_types::formatting::format_clock;
use alertcast_types::{TimerKind, TimerOverlayConfig};

use super::store::{controller_key, state_key};
use super::{SharedStore, TickSink, TimerError};

/// Leader tick cadence
pub const LEADER_TICK: Duration = Duration::from_millis(10);

/// Follower poll cadence
pub const FOLLOWER_POLL: Duration = Duration::from_millis(100);

/// A leader whose published timestamp is unchanged for longer is presumed gone
pub const STALE_LEADER_MS: i64 = 1_000;

/// Minimum gap between shared-store writes
pub const SHARED_WRITE_DEBOUNCE_MS: i64 = 10;

/// Minimum gap between durable writes
pub const DURABLE_WRITE_DEBOUNCE_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Follower,
}

/// Clock as last published by the leader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedTimerState {
    pub current_time: i64,
    /// Wall-clock millis when `current_time` was sampled
    pub current_time_at: i64,
    pub enabled: bool,
    pub session_id: String,
}

impl SharedTimerState {
    /// Clock value at `now_ms`, extrapolated in the timer's direction
    pub fn time_at(&self, kind: TimerKind, now_ms: i64) -> i64 {
        if !self.enabled {
            return self.current_time;
        }
        let elapsed = (now_ms - self.current_time_at).max(0);
        if kind.counts_up() {
            self.current_time + elapsed
        } else {
            (self.current_time - elapsed).max(0)
        }
    }
}

/// One instance's view of a shared timer
pub struct TimerReplica<S> {
    config: TimerOverlayConfig,
    session_id: String,
    store: S,
    sink: Option<Box<dyn TickSink>>,
    role: Role,

    // ─── Clock ──────────────────────────────────────────────────────────────
    current_time: i64,
    enabled: bool,
    last_tick_at: i64,

    // ─── Write debouncing (leader) ──────────────────────────────────────────
    last_shared_write: Option<i64>,
    last_durable_write: Option<i64>,
    last_persisted: Option<i64>,

    // ─── Staleness tracking (follower) ──────────────────────────────────────
    seen_state_at: Option<i64>,
    seen_changed_at: i64,
}

impl<S: SharedStore> TimerReplica<S> {
    /// Join the timer and claim leadership.
    ///
    /// The newest replica always starts as leader. It continues from the
    /// published clock if there is one, else from the durable backend for
    /// persistent timers, else from the configured initial time.
    pub fn load(
        config: TimerOverlayConfig,
        store: S,
        sink: Option<Box<dyn TickSink>>,
        now_ms: i64,
    ) -> Result<Self, TimerError> {
        let session_id = Uuid::new_v4().to_string();

        let (current_time, enabled) = match read_state(&store, &config.id)? {
            Some(state) => (state.time_at(config.kind, now_ms), state.enabled),
            None => {
                let resumed = match (&sink, config.is_persistent) {
                    (Some(sink), true) => sink.load(&config.id).unwrap_or_else(|e| {
                        tracing::warn!(timer_id = %config.id, error = %e, "Could not resume persisted time");
                        None
                    }),
                    _ => None,
                };
                (
                    resumed.unwrap_or(config.initial_time_ms),
                    config.is_started_on_source_load,
                )
            }
        };

        store.set(&controller_key(&config.id), &session_id)?;

        let mut replica = Self {
            config,
            session_id,
            store,
            sink,
            role: Role::Leader,
            current_time,
            enabled,
            last_tick_at: now_ms,
            last_shared_write: None,
            last_durable_write: None,
            last_persisted: None,
            seen_state_at: None,
            seen_changed_at: now_ms,
        };
        replica.publish(now_ms)?;

        tracing::info!(
            timer_id = %replica.config.id,
            session = %replica.session_id,
            kind = ?replica.config.kind,
            current_time = replica.current_time,
            "Timer replica loaded as leader"
        );
        Ok(replica)
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }

    pub fn current_time(&self) -> i64 {
        self.current_time
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &TimerOverlayConfig {
        &self.config
    }

    pub fn display(&self) -> String {
        format_clock(self.current_time, self.config.show_milliseconds)
    }

    /// How long to wait before the next `tick`
    pub fn poll_interval(&self) -> Duration {
        match self.role {
            Role::Leader => LEADER_TICK,
            Role::Follower => FOLLOWER_POLL,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Replication
    // ═══════════════════════════════════════════════════════════════════════

    /// Advance (leader) or mirror (follower) the clock
    pub fn tick(&mut self, now_ms: i64) -> Result<Role, TimerError> {
        let controller = self.store.get(&controller_key(&self.config.id))?;
        let leads = controller.as_deref() == Some(self.session_id.as_str());

        match (self.role, leads) {
            (Role::Leader, false) => {
                tracing::info!(timer_id = %self.config.id, session = %self.session_id, "Leadership lost, following");
                self.role = Role::Follower;
                self.seen_state_at = None;
                self.seen_changed_at = now_ms;
            }
            (Role::Follower, true) => {
                self.role = Role::Leader;
                self.last_tick_at = now_ms;
            }
            _ => {}
        }

        match self.role {
            Role::Leader => self.lead(now_ms)?,
            Role::Follower => self.follow(now_ms)?,
        }
        Ok(self.role)
    }

    fn lead(&mut self, now_ms: i64) -> Result<(), TimerError> {
        self.settle(now_ms);

        let due = self
            .last_shared_write
            .is_none_or(|at| now_ms - at >= SHARED_WRITE_DEBOUNCE_MS);
        if due {
            self.publish(now_ms)?;
        }

        self.persist_durable(now_ms);
        Ok(())
    }

    fn follow(&mut self, now_ms: i64) -> Result<(), TimerError> {
        if let Some(state) = read_state(&self.store, &self.config.id)? {
            if self.seen_state_at != Some(state.current_time_at) {
                self.seen_state_at = Some(state.current_time_at);
                self.seen_changed_at = now_ms;
            }
            self.current_time = state.time_at(self.config.kind, now_ms);
            self.enabled = state.enabled;
        }

        if now_ms - self.seen_changed_at > STALE_LEADER_MS {
            self.promote(now_ms)?;
        }
        Ok(())
    }

    fn promote(&mut self, now_ms: i64) -> Result<(), TimerError> {
        tracing::warn!(
            timer_id = %self.config.id,
            session = %self.session_id,
            stale_ms = now_ms - self.seen_changed_at,
            "Leader stalled, taking over"
        );
        self.store
            .set(&controller_key(&self.config.id), &self.session_id)?;
        self.role = Role::Leader;
        self.last_tick_at = now_ms;
        self.publish(now_ms)
    }

    /// Move the local clock to `now_ms`
    fn settle(&mut self, now_ms: i64) {
        let elapsed = (now_ms - self.last_tick_at).max(0);
        self.last_tick_at = now_ms;
        if !self.enabled {
            return;
        }

        if self.config.kind.counts_up() {
            self.current_time += elapsed;
        } else {
            self.current_time = (self.current_time - elapsed).max(0);
            if self.current_time == 0 {
                self.enabled = false;
                tracing::info!(timer_id = %self.config.id, "Countdown reached zero");
            }
        }
    }

    fn publish(&mut self, now_ms: i64) -> Result<(), TimerError> {
        let state = SharedTimerState {
            current_time: self.current_time,
            current_time_at: now_ms,
            enabled: self.enabled,
            session_id: self.session_id.clone(),
        };
        let body = serde_json::to_string(&state).map_err(TimerError::EncodeState)?;
        self.store.set(&state_key(&self.config.id), &body)?;
        self.last_shared_write = Some(now_ms);
        Ok(())
    }

    /// Best-effort write to the durable backend
    fn persist_durable(&mut self, now_ms: i64) {
        if !self.config.is_persistent || self.last_persisted == Some(self.current_time) {
            return;
        }
        let Some(sink) = &self.sink else {
            return;
        };
        if self
            .last_durable_write
            .is_some_and(|at| now_ms - at < DURABLE_WRITE_DEBOUNCE_MS)
        {
            return;
        }

        self.last_durable_write = Some(now_ms);
        match sink.persist(&self.config.id, self.current_time) {
            Ok(()) => self.last_persisted = Some(self.current_time),
            Err(e) => {
                tracing::warn!(timer_id = %self.config.id, error = %e, "Durable tick write failed");
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Controls (leader only; followers mirror)
    // ═══════════════════════════════════════════════════════════════════════

    pub fn start(&mut self, now_ms: i64) -> Result<bool, TimerError> {
        self.control(now_ms, |replica| replica.enabled = true)
    }

    pub fn pause(&mut self, now_ms: i64) -> Result<bool, TimerError> {
        self.control(now_ms, |replica| replica.enabled = false)
    }

    /// Back to the configured initial time, keeping the running state
    pub fn reset(&mut self, now_ms: i64) -> Result<bool, TimerError> {
        self.control(now_ms, |replica| {
            replica.current_time = replica.config.initial_time_ms;
        })
    }

    /// Add (or with a negative value, remove) time. Marathons extend this way.
    pub fn add_time(&mut self, delta_ms: i64, now_ms: i64) -> Result<bool, TimerError> {
        self.control(now_ms, |replica| {
            replica.current_time = (replica.current_time + delta_ms).max(0);
        })
    }

    fn control(&mut self, now_ms: i64, apply: impl FnOnce(&mut Self)) -> Result<bool, TimerError> {
        if self.role != Role::Leader {
            tracing::debug!(timer_id = %self.config.id, "Ignoring control on follower");
            return Ok(false);
        }

        self.settle(now_ms);
        apply(self);
        self.publish(now_ms)?;
        self.last_durable_write = None;
        self.persist_durable(now_ms);
        Ok(true)
    }
}

impl<S> std::fmt::Debug for TimerReplica<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerReplica")
            .field("timer_id", &self.config.id)
            .field("session_id", &self.session_id)
            .field("role", &self.role)
            .field("current_time", &self.current_time)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Read the published clock, if any
pub fn read_state<S: SharedStore + ?Sized>(
    store: &S,
    timer_id: &str,
) -> Result<Option<SharedTimerState>, TimerError> {
    let key = state_key(timer_id);
    let Some(body) = store.get(&key)? else {
        return Ok(None);
    };
    serde_json::from_str(&body)
        .map(Some)
        .map_err(|source| TimerError::DecodeState { key, source })
}
