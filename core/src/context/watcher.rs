use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver};
use tokio::time::sleep;

use super::WatcherError;

/// Editors write in bursts; wait for the file to settle before reloading
const SETTLE_DELAY: Duration = Duration::from_millis(150);

pub enum ConfigEvent {
    Changed(PathBuf),
    Removed(PathBuf),
    Error(String),
}

/// Watches one config file.
///
/// The parent directory is watched rather than the file itself so that
/// editors replacing the file on save are still seen.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    file: PathBuf,
}

impl ConfigWatcher {
    pub fn new(file: &Path) -> Result<Self, WatcherError> {
        let dir = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let (tx, rx) = mpsc::channel(100);

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.blocking_send(res);
            },
            Config::default(),
        )
        .map_err(WatcherError::InitWatcher)?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatcherError::WatchPath {
                path: dir.to_path_buf(),
                source,
            })?;

        Ok(Self {
            _watcher: watcher,
            rx,
            file: file.to_path_buf(),
        })
    }

    pub async fn next_event(&mut self) -> Option<ConfigEvent> {
        while let Some(event_result) = self.rx.recv().await {
            match event_result {
                Ok(event) => {
                    if let Some(config_event) = self.process_event(event).await {
                        return Some(config_event);
                    }
                }
                Err(e) => {
                    return Some(ConfigEvent::Error(format!("Config watcher error: {}", e)));
                }
            }
        }
        None
    }

    async fn process_event(&mut self, event: Event) -> Option<ConfigEvent> {
        if !event.paths.iter().any(|p| self.is_watched(p)) {
            return None;
        }

        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {
                sleep(SETTLE_DELAY).await;
                // Drop the rest of the burst
                while self.rx.try_recv().is_ok() {}
                tracing::debug!(path = %self.file.display(), "Overlay config changed");
                Some(ConfigEvent::Changed(self.file.clone()))
            }
            EventKind::Remove(_) => Some(ConfigEvent::Removed(self.file.clone())),
            _ => None,
        }
    }

    fn is_watched(&self, path: &Path) -> bool {
        path.file_name().is_some() && path.file_name() == self.file.file_name()
    }
}
