use crate::search::engine::SearchEngine;
use crate::watch::watcher::RescanSignal;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// What a single poll of the signal channel led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A signal arrived and the sync ran; true when the index was rebuilt
    Synced(bool),
    /// A signal arrived but the sync failed
    Failed,
    /// No signal was pending
    Quiet,
    /// The producer hung up; the watch is over
    Disconnected,
}

/// Polling consumer that drains rescan signals and re-syncs the engine
pub struct WatchService {
    engine: SearchEngine,
    root: PathBuf,
    poll_interval: Duration,
}

impl WatchService {
    pub fn new(engine: SearchEngine, root: &Path, poll_interval: Duration) -> Self {
        Self {
            engine,
            root: root.to_path_buf(),
            poll_interval,
        }
    }

    /// The engine being kept in sync
    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Check for a pending signal without blocking and sync if one arrived.
    ///
    /// A failed sync leaves the previous index in place and is reported, not
    /// propagated; the next signal retries from the same state.
    pub fn poll_once(&mut self, signals: &Receiver<RescanSignal>) -> PollOutcome {
        match signals.try_recv() {
            Ok(RescanSignal) => match self.engine.sync(&self.root) {
                Ok(true) => {
                    info!(
                        documents = self.engine.document_count(),
                        "index rebuilt after filesystem change"
                    );
                    PollOutcome::Synced(true)
                }
                Ok(false) => {
                    debug!("rescan found no effective change");
                    PollOutcome::Synced(false)
                }
                Err(e) => {
                    // Keep watching; the next signal retries the sync
                    error!(error = %e, "sync failed after filesystem change");
                    PollOutcome::Failed
                }
            },
            Err(TryRecvError::Empty) => PollOutcome::Quiet,
            Err(TryRecvError::Disconnected) => PollOutcome::Disconnected,
        }
    }

    /// Poll until the signal channel disconnects
    pub fn run(&mut self, signals: &Receiver<RescanSignal>) {
        loop {
            if self.poll_once(signals) == PollOutcome::Disconnected {
                info!("watcher disconnected, stopping watch service");
                return;
            }
            thread::sleep(self.poll_interval);
        }
    }
}
