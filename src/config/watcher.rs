//! Configuration file watcher for hot reload of dispatch timings.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use crate::config::loader::load_config;
use crate::config::schema::DispatchConfig;

/// Watches the config file and forwards dispatch timings when they change.
pub struct ConfigWatcher {
    path: PathBuf,
    current: DispatchConfig,
    update_tx: mpsc::UnboundedSender<DispatchConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`, starting from the timings already in effect.
    ///
    /// Returns the watcher and a receiver for timing updates.
    pub fn new(path: &Path, current: DispatchConfig) -> (Self, mpsc::UnboundedReceiver<DispatchConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            current,
            update_tx,
        }, update_rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, mut current, update_tx } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if let Some(timings) = reload_dispatch(&path, &mut current) {
                        let _ = update_tx.send(timings);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

/// Reload `path` and return the dispatch timings if they differ from `current`.
///
/// Invalid files are logged and leave `current` untouched.
pub fn reload_dispatch(path: &Path, current: &mut DispatchConfig) -> Option<DispatchConfig> {
    match load_config(path) {
        Ok(config) if config.dispatch != *current => {
            tracing::info!(path = ?path, "Config change detected, applying new dispatch timings");
            *current = config.dispatch;
            Some(config.dispatch)
        }
        Ok(_) => {
            tracing::debug!(path = ?path, "Config rewritten, dispatch timings unchanged");
            None
        }
        Err(e) => {
            tracing::error!("Failed to reload config: {}. Keeping current configuration.", e);
            None
        }
    }
}
