use crate::core::error::{Error, Result};
use crate::search::index::CorpusIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bump when the on-disk layout changes; older artifacts are discarded
pub const CACHE_VERSION: u32 = 1;

/// Everything needed to restore an engine without rescanning file contents
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheArtifact {
    pub version: u32,
    pub index: CorpusIndex,
    /// Scan-time content digests, keyed by path. A superset of the indexed
    /// paths: files whose digest was recorded but whose content could not
    /// be read stay out of the index until their bytes change.
    pub digests: BTreeMap<String, String>,
}

/// Persists the index artifact as a single JSON document
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Location of the artifact on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the artifact atomically: serialize into a sibling temp file,
    /// then rename over the final path. A crash mid-write leaves the old
    /// artifact intact.
    pub fn save(&self, artifact: &CacheArtifact) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(artifact)
            .map_err(|e| Error::Cache(format!("Failed to serialize index artifact: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "index artifact persisted");
        Ok(())
    }

    /// Load the artifact, treating any failure as a cache miss
    pub fn load(&self) -> Option<CacheArtifact> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no cache artifact on disk");
            return None;
        }

        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read cache artifact");
                return None;
            }
        };

        let artifact: CacheArtifact = match serde_json::from_str(&json) {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable cache artifact");
                return None;
            }
        };

        if artifact.version != CACHE_VERSION {
            warn!(
                found = artifact.version,
                expected = CACHE_VERSION,
                "discarding cache artifact with mismatched version"
            );
            return None;
        }

        if !artifact.index.is_consistent() {
            warn!(path = %self.path.display(), "discarding inconsistent cache artifact");
            return None;
        }

        let digests_cover_index = artifact
            .index
            .paths()
            .iter()
            .all(|path| artifact.digests.contains_key(path));
        if !digests_cover_index {
            warn!(path = %self.path.display(), "discarding cache artifact with incomplete digest table");
            return None;
        }

        debug!(documents = artifact.index.len(), "cache artifact loaded");
        Some(artifact)
    }
}
