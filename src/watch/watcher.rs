use crate::core::error::{Error, Result};
use crate::indexing::discovery::has_allowed_extension;
use notify_debouncer_full::{
    new_debouncer,
    notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher},
    DebounceEventResult, DebouncedEvent, Debouncer, FileIdMap,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError};
use std::time::Duration;
use tracing::{debug, warn};

/// Marker telling the consumer the corpus may have changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescanSignal;

/// Lifecycle of a `FileSystemWatcher`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Watching,
    Stopped,
}

/// Debounced filesystem watcher that coalesces relevant events into at most
/// one pending rescan signal.
///
/// The signal carries no paths: the consumer re-hashes the corpus anyway, so
/// all the producer needs to say is "something changed".
pub struct FileSystemWatcher {
    root: PathBuf,
    extensions: Vec<String>,
    debounce: Duration,
    state: WatcherState,
    debouncer: Option<Debouncer<RecommendedWatcher, FileIdMap>>,
}

impl FileSystemWatcher {
    /// Create a watcher in the idle state; nothing is registered with the
    /// OS until `start` is called
    pub fn new(root: &Path, extensions: Vec<String>, debounce: Duration) -> Self {
        Self {
            root: root.to_path_buf(),
            extensions,
            debounce,
            state: WatcherState::Idle,
            debouncer: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Register the OS watch and hand back the signal channel.
    ///
    /// Valid only from the idle state; a stopped watcher cannot be reused.
    /// The channel holds at most one pending signal, so a burst of events
    /// between polls collapses into a single rescan.
    pub fn start(&mut self) -> Result<Receiver<RescanSignal>> {
        match self.state {
            WatcherState::Idle => {}
            WatcherState::Watching => {
                return Err(Error::Watch("watcher is already running".to_string()));
            }
            WatcherState::Stopped => {
                return Err(Error::Watch(
                    "watcher was stopped and cannot be restarted".to_string(),
                ));
            }
        }

        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        let extensions = self.extensions.clone();

        let mut debouncer = new_debouncer(
            self.debounce,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    if events.iter().any(|event| is_relevant(event, &extensions)) {
                        notify_rescan(&tx);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        warn!(error = %error, "filesystem watch error");
                    }
                }
            },
        )
        .map_err(|e| Error::Watch(format!("Failed to create file watcher: {}", e)))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| {
                Error::Watch(format!("Failed to watch {}: {}", self.root.display(), e))
            })?;

        debug!(root = %self.root.display(), "filesystem watch registered");
        self.debouncer = Some(debouncer);
        self.state = WatcherState::Watching;
        Ok(rx)
    }

    /// Release the OS watch and close the signal channel. Safe to call
    /// repeatedly; only the first call does anything.
    pub fn stop(&mut self) {
        if let Some(debouncer) = self.debouncer.take() {
            drop(debouncer);
            debug!(root = %self.root.display(), "filesystem watch released");
        }
        self.state = WatcherState::Stopped;
    }
}

/// A debounced event matters when it is a create, modify, or remove (renames
/// surface as modify events) touching at least one index-eligible file
fn is_relevant(event: &DebouncedEvent, extensions: &[String]) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return false,
    }

    event
        .paths
        .iter()
        .any(|path| has_allowed_extension(path, extensions))
}

/// Push a signal unless one is already pending; the consumer only needs to
/// learn that at least one change happened since its last poll
fn notify_rescan(tx: &SyncSender<RescanSignal>) {
    match tx.try_send(RescanSignal) {
        Ok(()) => debug!("rescan signal queued"),
        Err(TrySendError::Full(_)) => debug!("rescan signal already pending"),
        // Consumer went away; the debouncer is about to be dropped too
        Err(TrySendError::Disconnected(_)) => {}
    }
}
