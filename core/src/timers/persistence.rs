//! Durable tick persistence for persistent timers
//!
//! Best effort: a failed write is logged by the caller and the local
//! display keeps advancing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::TimerError;

pub trait TickSink: Send {
    fn persist(&self, timer_id: &str, current_time_ms: i64) -> Result<(), TimerError>;

    /// Last persisted value, used to resume a persistent timer
    fn load(&self, timer_id: &str) -> Result<Option<i64>, TimerError>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedTick {
    current_time: i64,
}

/// Stores each timer as `<dir>/<timer_id>.json`
#[derive(Debug, Clone)]
pub struct FileTickSink {
    dir: PathBuf,
}

impl FileTickSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, timer_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", timer_id))
    }
}

impl TickSink for FileTickSink {
    fn persist(&self, timer_id: &str, current_time_ms: i64) -> Result<(), TimerError> {
        let path = self.path_for(timer_id);
        let body = serde_json::to_string(&PersistedTick {
            current_time: current_time_ms,
        })
        .map_err(TimerError::EncodeState)?;

        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, body))
            .map_err(|source| TimerError::Persist {
                timer_id: timer_id.to_string(),
                path,
                source,
            })
    }

    fn load(&self, timer_id: &str) -> Result<Option<i64>, TimerError> {
        let path = self.path_for(timer_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(TimerError::Persist {
                    timer_id: timer_id.to_string(),
                    path,
                    source,
                });
            }
        };

        let tick: PersistedTick =
            serde_json::from_str(&content).map_err(|source| TimerError::DecodeState {
                key: timer_id.to_string(),
                source,
            })?;
        Ok(Some(tick.current_time))
    }
}
