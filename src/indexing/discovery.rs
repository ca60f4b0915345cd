use crate::core::error::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Discover all indexable files in a directory, respecting .gitignore rules
pub fn discover_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Error::Config(format!(
            "Directory does not exist: {}",
            root.display()
        )));
    }

    if !root.is_dir() {
        return Err(Error::Config(format!(
            "Path is not a directory: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(false) // dotfiles are eligible too
        .git_ignore(true)
        .git_exclude(true)
        .build();

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();

                if path.is_dir() {
                    continue;
                }

                if has_allowed_extension(path, extensions) {
                    files.push(path.to_path_buf());
                }
            }
            Err(err) => {
                // Some entries may be unreadable mid-walk; skip them and keep going
                warn!(error = %err, "failed to access entry during scan");
            }
        }
    }

    Ok(files)
}

/// Check whether a file's extension is in the allow-list (case-insensitive)
pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|allowed| *allowed == ext)
        })
        .unwrap_or(false)
}
