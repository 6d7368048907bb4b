//! Shared key-value store that timer replicas coordinate through
//!
//! Replicas never talk to each other directly. Leadership and the current
//! clock are both plain string values under well-known keys, read and
//! written at poll intervals.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hashbrown::HashMap;

use super::TimerError;

/// Key holding the session id of the leader for `timer_id`
pub fn controller_key(timer_id: &str) -> String {
    format!("controller-{}", timer_id)
}

/// Key holding the leader's last published clock for `timer_id`
pub fn state_key(timer_id: &str) -> String {
    format!("controller-{}-state", timer_id)
}

pub trait SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, TimerError>;
    fn set(&self, key: &str, value: &str) -> Result<(), TimerError>;
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SharedStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, TimerError> {
        let entries = self.entries.lock().map_err(|_| TimerError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TimerError> {
        let mut entries = self.entries.lock().map_err(|_| TimerError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key inside a directory, shared between processes.
///
/// Writes go to a temporary file first and are renamed into place so a
/// reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, TimerError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| TimerError::WriteKey {
            key: String::new(),
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SharedStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, TimerError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TimerError::ReadKey {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TimerError> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.{}.tmp", key, std::process::id()));

        std::fs::write(&tmp, value)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|source| TimerError::WriteKey {
                key: key.to_string(),
                path,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("controller-t", "abc").unwrap();
        assert_eq!(other.get("controller-t").unwrap().as_deref(), Some("abc"));
        assert_eq!(other.get("missing").unwrap(), None);
    }

    #[test]
    fn file_store_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("shared")).unwrap();

        assert_eq!(store.get(&controller_key("t")).unwrap(), None);
        store.set(&controller_key("t"), "first").unwrap();
        store.set(&controller_key("t"), "second").unwrap();

        let reader = FileStore::open(store.dir()).unwrap();
        assert_eq!(reader.get("controller-t").unwrap().as_deref(), Some("second"));
    }
}
