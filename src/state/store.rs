//! Config store: in-memory settings with trailing durable writes.

use parley_core::config::{self, Settings};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Owns the live [`Settings`]. Every mutation is visible immediately and
/// queued for a background write; the in-memory value stays authoritative
/// even when the write fails.
#[derive(Debug)]
pub struct SettingsStore {
    settings: Settings,
    writes: mpsc::UnboundedSender<Settings>,
}

impl SettingsStore {
    pub fn new(settings: Settings, writes: mpsc::UnboundedSender<Settings>) -> Self {
        Self { settings, writes }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Apply a mutation in place, then schedule a write.
    pub fn set<R>(&mut self, mutate: impl FnOnce(&mut Settings) -> R) -> R {
        let out = mutate(&mut self.settings);
        self.persist();
        out
    }

    /// Queue the current value for writing.
    pub fn persist(&self) {
        if self.writes.send(self.settings.clone()).is_err() {
            warn!("settings writer stopped; change kept in memory only");
        }
    }
}

/// Spawn the task that mirrors queued settings to `path`.
///
/// Writes are serialised and coalesced: when several snapshots are queued,
/// only the newest is written. The task ends once every sender is dropped.
///
/// A failed write is logged only and never reaches the error policy.
pub fn spawn_writer(path: PathBuf) -> (mpsc::UnboundedSender<Settings>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Settings>();

    let handle = tokio::spawn(async move {
        while let Some(mut latest) = rx.recv().await {
            while let Ok(newer) = rx.try_recv() {
                latest = newer;
            }
            match config::save(&path, &latest).await {
                Ok(()) => info!("Settings written to {}", path.display()),
                Err(e) => error!("{e}; keeping settings in memory"),
            }
        }
    });

    (tx, handle)
}
