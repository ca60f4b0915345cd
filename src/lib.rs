// Core functionality
pub mod core {
    pub mod config;
    pub mod error;
}

// Text processing
pub mod text {
    pub mod normalize;
}

// Indexing pipeline
pub mod indexing {
    pub mod discovery;
    pub mod hasher;
    pub mod sync;
}

// Search
pub mod search {
    pub mod engine;
    pub mod index;
    pub mod snippet;
}

// Index persistence
pub mod storage {
    pub mod cache;
}

// Filesystem watching
pub mod watch {
    pub mod service;
    pub mod watcher;
}

// User interface
pub mod ui {
    pub mod cli;
}

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use crate::indexing::discovery::discover_files;
pub use crate::indexing::hasher::hash_file;
pub use crate::indexing::sync::{detect_changes, ChangeSet};
pub use crate::search::engine::{SearchEngine, SearchResult};
pub use crate::search::index::{CorpusIndex, Document};
pub use crate::search::snippet;
pub use crate::storage::cache::{CacheArtifact, CacheStore, CACHE_VERSION};
pub use crate::text::normalize::{BasicNormalizer, TextNormalizer};
pub use crate::ui::cli::Cli;
pub use crate::watch::service::{PollOutcome, WatchService};
pub use crate::watch::watcher::{FileSystemWatcher, RescanSignal, WatcherState};
