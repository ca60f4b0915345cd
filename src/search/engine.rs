use crate::core::config::Config;
use crate::core::error::Result;
use crate::indexing::sync::detect_changes;
use crate::search::index::{CorpusIndex, Document};
use crate::search::snippet;
use crate::storage::cache::{CacheArtifact, CacheStore, CACHE_VERSION};
use crate::text::normalize::TextNormalizer;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when a hit's file cannot be re-read while building its snippet
const SNIPPET_UNAVAILABLE: &str = "[could not read file content]";

/// A ranked search hit
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub path: String,
    pub title: String,
    pub score: f32,
    pub snippet: String,
}

/// Search engine over a directory of documents.
///
/// Owns the current index, the digest table used for change detection, and
/// the cache store. The index lives behind an `Arc` and is replaced
/// wholesale on rebuild, so a reader holding the old handle keeps a coherent
/// snapshot while a sync runs.
pub struct SearchEngine {
    config: Config,
    normalizer: Arc<dyn TextNormalizer>,
    cache: CacheStore,
    index: Arc<CorpusIndex>,
    digests: BTreeMap<String, String>,
}

impl SearchEngine {
    /// Create an engine with an empty index
    pub fn new(config: Config, normalizer: Arc<dyn TextNormalizer>) -> Self {
        let cache = CacheStore::new(config.cache_path());
        Self {
            config,
            normalizer,
            cache,
            index: Arc::new(CorpusIndex::empty()),
            digests: BTreeMap::new(),
        }
    }

    /// Create an engine, restoring the previous index when a valid cache
    /// artifact exists. Any load failure silently starts empty.
    pub fn with_cache(config: Config, normalizer: Arc<dyn TextNormalizer>) -> Self {
        let mut engine = Self::new(config, normalizer);
        if let Some(artifact) = engine.cache.load() {
            info!(documents = artifact.index.len(), "restored index from cache");
            engine.index = Arc::new(artifact.index);
            engine.digests = artifact.digests;
        }
        engine
    }

    /// Handle to the current index snapshot
    pub fn index(&self) -> Arc<CorpusIndex> {
        Arc::clone(&self.index)
    }

    /// Number of indexed documents
    pub fn document_count(&self) -> usize {
        self.index.len()
    }

    /// Reconcile the index with the filesystem.
    ///
    /// Hashes every candidate file under `root`, diffs against the digest
    /// table, and rebuilds the whole index when anything changed. Returns
    /// whether a rebuild happened. A missing or non-directory root is a
    /// hard error and leaves the current index untouched.
    pub fn sync(&mut self, root: &Path) -> Result<bool> {
        let (changes, current) = detect_changes(root, &self.config.extensions, &self.digests)?;

        if changes.is_empty() {
            debug!(documents = self.index.len(), "index already up to date");
            return Ok(false);
        }

        info!(
            added = changes.added.len(),
            modified = changes.modified.len(),
            removed = changes.removed.len(),
            "changes detected, rebuilding index"
        );

        // Document frequencies are corpus-wide, so any change rebuilds over
        // the complete current file set. BTreeMap iteration puts the rows
        // in lexicographic path order.
        let mut documents = Vec::with_capacity(current.len());
        for path in current.keys() {
            match std::fs::read_to_string(path) {
                Ok(text) => documents.push(Document {
                    path: path.clone(),
                    title: file_title(path),
                    text,
                }),
                Err(e) => {
                    // The digest stays recorded, so the file rejoins the
                    // index once its bytes change
                    warn!(path = %path, error = %e, "skipping unreadable file during rebuild");
                }
            }
        }

        let index = CorpusIndex::build(&documents, self.normalizer.as_ref());
        info!(
            documents = index.len(),
            terms = index.term_count(),
            "index rebuilt"
        );

        let artifact = CacheArtifact {
            version: CACHE_VERSION,
            index,
            digests: current,
        };
        if let Err(e) = self.cache.save(&artifact) {
            // The in-memory index is still fresh; the next successful save
            // heals the cache
            warn!(path = %self.cache.path().display(), error = %e, "failed to persist index cache");
        }

        self.index = Arc::new(artifact.index);
        self.digests = artifact.digests;

        Ok(true)
    }

    /// Run a ranked query against the current index.
    ///
    /// An empty or never-built index yields no results. Hits whose file
    /// vanished between indexing and querying get a placeholder snippet.
    pub fn search(&self, query: &str, top_n: usize) -> Vec<SearchResult> {
        let index = Arc::clone(&self.index);
        if index.is_empty() {
            return Vec::new();
        }

        let query_terms: Vec<String> = self
            .normalizer
            .normalize(query)
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();

        let ranked = index.search(
            query,
            self.normalizer.as_ref(),
            self.config.score_threshold,
            top_n,
        );

        let mut results = Vec::with_capacity(ranked.len());
        for (row, score) in ranked {
            let path = match index.path(row) {
                Some(p) => p.to_string(),
                None => continue,
            };
            let title = index.title(row).unwrap_or(&path).to_string();

            let snippet = match std::fs::read_to_string(&path) {
                Ok(text) => snippet::extract(&text, &query_terms, self.config.snippet_window),
                Err(e) => {
                    debug!(path = %path, error = %e, "could not re-read file for snippet");
                    SNIPPET_UNAVAILABLE.to_string()
                }
            };

            results.push(SearchResult {
                path,
                title,
                score,
                snippet,
            });
        }
        results
    }
}

/// Display title for a document path: its file name
fn file_title(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize::BasicNormalizer;
    use std::fs;
    use tempfile::TempDir;

    fn test_engine(base: &Path) -> SearchEngine {
        let config = Config::new(Some(base.to_path_buf())).unwrap();
        config.init().unwrap();
        SearchEngine::new(config, Arc::new(BasicNormalizer::new()))
    }

    #[test]
    fn test_file_title_uses_file_name() {
        assert_eq!(file_title("/docs/nested/report.txt"), "report.txt");
        assert_eq!(file_title("plain.md"), "plain.md");
    }

    #[test]
    fn test_search_on_empty_engine_returns_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let engine = test_engine(&temp_dir.path().join("base"));

        assert_eq!(engine.document_count(), 0);
        assert!(engine.search("anything", 10).is_empty());
    }

    #[test]
    fn test_snippet_placeholder_for_vanished_file() {
        let temp_dir = TempDir::new().unwrap();
        let docs = temp_dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        let file = docs.join("gone.txt");
        fs::write(&file, "ephemeral content here").unwrap();
        fs::write(docs.join("stays.txt"), "unrelated filler words").unwrap();

        let mut engine = test_engine(&temp_dir.path().join("base"));
        engine.sync(&docs).unwrap();

        // Delete behind the engine's back; the stale index still ranks the
        // document but its snippet cannot be rebuilt
        fs::remove_file(&file).unwrap();
        let results = engine.search("ephemeral", 10);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].snippet, SNIPPET_UNAVAILABLE);
    }
}
