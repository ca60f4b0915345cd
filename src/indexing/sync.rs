use crate::core::error::Result;
use crate::indexing::discovery::discover_files;
use crate::indexing::hasher::hash_file;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Files whose indexed state no longer matches the filesystem
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
}

impl ChangeSet {
    /// True when nothing changed since the previous cycle
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Total number of changed paths
    pub fn total(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

/// Hash every candidate file under `root` and diff against the previous
/// digest table.
///
/// Returns the change set together with the fresh digest table. Content is
/// re-hashed on every call; there is no modification-time shortcut, so a
/// touched-but-unchanged file never counts as modified. Files that cannot
/// be hashed are skipped for this cycle.
pub fn detect_changes(
    root: &Path,
    extensions: &[String],
    previous: &BTreeMap<String, String>,
) -> Result<(ChangeSet, BTreeMap<String, String>)> {
    let files = discover_files(root, extensions)?;

    let mut candidates: Vec<(String, PathBuf)> = Vec::with_capacity(files.len());
    for path in files {
        match path.to_str() {
            Some(key) => {
                let key = key.to_string();
                candidates.push((key, path));
            }
            None => {
                warn!(path = %path.display(), "skipping file with non UTF-8 path");
            }
        }
    }

    let current: BTreeMap<String, String> = candidates
        .par_iter()
        .filter_map(|(key, path)| match hash_file(path) {
            Ok(digest) => Some((key.clone(), digest)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                None
            }
        })
        .collect();

    let mut changes = ChangeSet::default();
    for (path, digest) in &current {
        match previous.get(path) {
            None => {
                debug!(path = %path, "new file detected");
                changes.added.push(path.clone());
            }
            Some(old) if old != digest => {
                debug!(path = %path, "content change detected");
                changes.modified.push(path.clone());
            }
            Some(_) => {}
        }
    }
    for path in previous.keys() {
        if !current.contains_key(path) {
            debug!(path = %path, "file removed");
            changes.removed.push(path.clone());
        }
    }

    Ok((changes, current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec!["txt".to_string()]
    }

    #[test]
    fn test_detect_changes_initial_scan() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "alpha").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "beta").unwrap();

        let previous = BTreeMap::new();
        let (changes, current) = detect_changes(temp_dir.path(), &exts(), &previous).unwrap();

        assert_eq!(changes.added.len(), 2);
        assert!(changes.modified.is_empty());
        assert!(changes.removed.is_empty());
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn test_detect_changes_no_changes() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "alpha").unwrap();

        let (_, first) = detect_changes(temp_dir.path(), &exts(), &BTreeMap::new()).unwrap();
        let (changes, second) = detect_changes(temp_dir.path(), &exts(), &first).unwrap();

        assert!(changes.is_empty());
        assert_eq!(changes.total(), 0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_detect_changes_modified_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "before").unwrap();

        let (_, first) = detect_changes(temp_dir.path(), &exts(), &BTreeMap::new()).unwrap();

        fs::write(&file, "after").unwrap();
        let (changes, _) = detect_changes(temp_dir.path(), &exts(), &first).unwrap();

        assert!(changes.added.is_empty());
        assert_eq!(changes.modified.len(), 1);
        assert!(changes.removed.is_empty());
        assert!(changes.modified[0].ends_with("a.txt"));
    }

    #[test]
    fn test_detect_changes_removed_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "alpha").unwrap();
        fs::write(temp_dir.path().join("b.txt"), "beta").unwrap();

        let (_, first) = detect_changes(temp_dir.path(), &exts(), &BTreeMap::new()).unwrap();

        fs::remove_file(&file).unwrap();
        let (changes, current) = detect_changes(temp_dir.path(), &exts(), &first).unwrap();

        assert!(changes.added.is_empty());
        assert!(changes.modified.is_empty());
        assert_eq!(changes.removed.len(), 1);
        assert!(changes.removed[0].ends_with("a.txt"));
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn test_detect_changes_mixed() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("keep.txt"), "keep").unwrap();
        fs::write(temp_dir.path().join("change.txt"), "v1").unwrap();
        fs::write(temp_dir.path().join("drop.txt"), "drop").unwrap();

        let (_, first) = detect_changes(temp_dir.path(), &exts(), &BTreeMap::new()).unwrap();

        fs::write(temp_dir.path().join("change.txt"), "v2").unwrap();
        fs::remove_file(temp_dir.path().join("drop.txt")).unwrap();
        fs::write(temp_dir.path().join("new.txt"), "new").unwrap();

        let (changes, current) = detect_changes(temp_dir.path(), &exts(), &first).unwrap();

        assert_eq!(changes.added.len(), 1);
        assert_eq!(changes.modified.len(), 1);
        assert_eq!(changes.removed.len(), 1);
        assert_eq!(changes.total(), 3);
        assert_eq!(current.len(), 3);
    }

    #[test]
    fn test_detect_changes_ignores_other_extensions() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "text").unwrap();
        fs::write(temp_dir.path().join("b.bin"), "binary").unwrap();

        let (changes, current) = detect_changes(temp_dir.path(), &exts(), &BTreeMap::new()).unwrap();

        assert_eq!(changes.added.len(), 1);
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn test_detect_changes_missing_root() {
        let result = detect_changes(Path::new("/nonexistent/docs"), &exts(), &BTreeMap::new());
        assert!(result.is_err());
    }
}
