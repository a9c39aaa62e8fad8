//! Path resolution between the raw-input and cleaned-output trees.

use std::path::{Path, PathBuf};

use telemetry_core::Result;
use tracing::warn;

/// Maps relative archive identifiers to absolute input/output locations.
///
/// An identifier may be subfolder-qualified (`"sub/a.jsonl"`); it resolves
/// to the same relative location under both roots.
#[derive(Debug, Clone)]
pub struct ArchiveIo {
    dir_in: PathBuf,
    dir_out: PathBuf,
}

impl ArchiveIo {
    pub fn new(dir_in: impl Into<PathBuf>, dir_out: impl Into<PathBuf>) -> Self {
        Self {
            dir_in: dir_in.into(),
            dir_out: dir_out.into(),
        }
    }

    /// Root of the raw input archives.
    pub fn dir_in(&self) -> &Path {
        &self.dir_in
    }

    /// Root of the cleaned output archives.
    pub fn dir_out(&self) -> &Path {
        &self.dir_out
    }

    /// Absolute input location for a relative archive identifier.
    pub fn full_path_in(&self, rel: &str) -> PathBuf {
        self.dir_in.join(rel)
    }

    /// Absolute output location for a relative archive identifier.
    pub fn full_path_out(&self, rel: &str) -> PathBuf {
        self.dir_out.join(rel)
    }

    /// Create the parent directory of `path` if it does not exist yet.
    pub fn ensure_parent_exists(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Find all `.jsonl` archives recursively under the input root and
    /// return their relative identifiers, sorted by path.
    pub fn find_relative_archives(&self) -> Vec<String> {
        if !self.dir_in.exists() {
            warn!("Input path does not exist: {}", self.dir_in.display());
            return Vec::new();
        }

        let mut archives: Vec<String> = walkdir::WalkDir::new(&self.dir_in)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .map(|ext| ext == "jsonl")
                        .unwrap_or(false)
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.dir_in)
                    .ok()
                    .map(|rel| rel.to_string_lossy().into_owned())
            })
            .collect();

        archives.sort();
        archives
    }
}
