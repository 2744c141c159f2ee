//! File discovery: turns command-line paths into the ordered list of files to
//! upload.
//!
//! A path naming a file is kept when its extension is accepted. A directory
//! contributes the accepted files directly inside it, or everything below it
//! when `recursive` is set. Entries named `.` or `..` are skipped.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Names never treated as files or directories to upload.
const INVALID_FILENAMES: [&str; 2] = [".", ".."];

/// Errors raised while building the backlog. Any of them aborts the run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// File discovery settings (the `[discovery]` config section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Descend into subdirectories.
    #[serde(default)]
    pub recursive: bool,

    /// Accepted extensions, including the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    [".pdf", ".png", ".jpg", ".doc", ".docx", ".rtf", ".dotx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            extensions: default_extensions(),
        }
    }
}

impl DiscoveryConfig {
    /// Whether the file's extension is in the accepted list. Case-sensitive.
    pub fn is_valid_extension(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = format!(".{}", ext.to_string_lossy());
                self.extensions.iter().any(|e| *e == ext)
            }
            None => false,
        }
    }
}

/// Whether the last component of `path` is a usable name.
pub fn is_valid_filename(path: &Path) -> bool {
    match path.file_name() {
        Some(name) => !INVALID_FILENAMES.contains(&name.to_string_lossy().as_ref()),
        // `.`, `..` and paths ending in `..` have no file name
        None => false,
    }
}

/// Expands the given paths into the files to upload, in discovery order.
pub fn discover_files(
    paths: &[PathBuf],
    config: &DiscoveryConfig,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();

    for path in paths {
        if !is_valid_filename(path) {
            debug!("Skipping invalid name {:?}", path);
            continue;
        }
        if !path.exists() {
            return Err(DiscoveryError::NotFound(path.clone()));
        }
        if path.is_dir() {
            files.extend(files_in_dir(path, config)?);
            continue;
        }
        if config.is_valid_extension(path) {
            files.push(path.clone());
        } else {
            debug!("Skipping {:?}: extension not accepted", path);
        }
    }

    Ok(files)
}

fn files_in_dir(dir: &Path, config: &DiscoveryConfig) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if !config.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    let entries = walker
        .into_iter()
        .filter_entry(|e| !e.file_type().is_dir() || is_valid_filename(e.path()));

    for entry in entries {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if config.is_valid_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
