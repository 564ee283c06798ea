//! Scratch files for backend payloads and downloaded sources.
//!
//! Every file is named `rigger-{suffix}-{uuid}[.ext]`, so all files that
//! belong to one scenario can be removed together before a new run.

use crate::BackendResult;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const FILE_PREFIX: &str = "rigger";

/// A directory holding scratch files.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh, unused path for `suffix`. `ext` is appended when non-empty.
    pub fn path_for(&self, suffix: &str, ext: &str) -> PathBuf {
        let mut name = format!("{}-{}-{}", FILE_PREFIX, suffix, Uuid::new_v4().simple());
        if !ext.is_empty() {
            name.push('.');
            name.push_str(ext);
        }
        self.root.join(name)
    }

    /// Write `content` to a new scratch file and return its path.
    pub fn write(&self, suffix: &str, ext: &str, content: &[u8]) -> BackendResult<PathBuf> {
        let path = self.path_for(suffix, ext);
        fs::write(&path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "Wrote scratch file");
        Ok(path)
    }

    /// Remove every regular file left behind for `suffix`. Returns how many were removed.
    pub fn cleanup(&self, suffix: &str) -> BackendResult<usize> {
        let prefix = format!("{}-{}-", FILE_PREFIX, suffix);
        info!(dir = %self.root.display(), prefix = %prefix, "Cleaning scratch files");

        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if !entry.file_name().to_string_lossy().starts_with(&prefix) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    debug!(path = %entry.path().display(), "Deleted scratch file");
                    removed += 1;
                }
                Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to delete scratch file"),
            }
        }
        Ok(removed)
    }
}
