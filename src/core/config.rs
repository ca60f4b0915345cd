use super::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for docdex
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for docdex data
    pub base_dir: PathBuf,
    /// Directory holding the persisted index artifact
    pub cache_dir: PathBuf,
    /// File extensions eligible for indexing (lowercase, without the dot)
    pub extensions: Vec<String>,
    /// Maximum number of search results returned
    pub top_n: usize,
    /// Results scoring at or below this are dropped
    pub score_threshold: f32,
    /// Snippet size in characters
    pub snippet_window: usize,
    /// Quiet period before filesystem events are delivered
    pub debounce: Duration,
    /// Interval between polls of the change signal in watch mode
    pub poll_interval: Duration,
}

impl Config {
    /// Get the default configuration directory
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
            .map(|home| home.join(".docdex"))
    }

    /// Create a new configuration
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.unwrap_or_else(|| {
            Self::default_base_dir().unwrap_or_else(|_| PathBuf::from(".docdex"))
        });

        Ok(Self {
            cache_dir: base_dir.join("cache"),
            base_dir,
            extensions: vec!["txt".to_string(), "md".to_string()],
            top_n: 20,
            score_threshold: 0.01,
            snippet_window: 250,
            debounce: Duration::from_secs(2),
            poll_interval: Duration::from_secs(5),
        })
    }

    /// Path of the persisted index artifact
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join("index.json")
    }

    /// Initialize the configuration directories
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }

    /// Check if the configuration is already initialized
    pub fn is_initialized(&self) -> bool {
        self.base_dir.exists() && self.cache_dir.exists()
    }
}
