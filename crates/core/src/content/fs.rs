//! Filesystem content resolver.

use std::path::{Path, PathBuf};

use crate::error::WriteStatus;
use crate::key::{normalize_key, strip_scheme};

use super::ContentResolver;

/// Prefix accepted in front of filesystem keys.
pub const FILE_PREFIX: &str = "file:";

/// Reads and writes files under a root folder.
///
/// Absolute keys are read as-is; relative keys resolve against the root folder
/// (default `.`). Writes are confined to the root folder.
#[derive(Debug, Clone)]
pub struct FsContentResolver {
    root: PathBuf,
}

impl Default for FsContentResolver {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FsContentResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    fn path_of(key: &str) -> String {
        let normalized = normalize_key(key);
        match strip_scheme(&normalized, FILE_PREFIX) {
            Some(rest) => rest.to_string(),
            None => normalized,
        }
    }

    fn relative_target(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn read(path: &Path) -> Option<Vec<u8>> {
        if !path.is_file() {
            return None;
        }
        match std::fs::read(path) {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), "Read content from file");
                Some(bytes)
            }
            Err(e) => {
                tracing::info!(path = %path.display(), error = %e, "Failed to read file content");
                None
            }
        }
    }
}

impl ContentResolver for FsContentResolver {
    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        let path = Self::path_of(key);
        let candidate = Path::new(&path);
        if candidate.is_absolute()
            && let Some(bytes) = Self::read(candidate)
        {
            return Some(bytes);
        }
        Self::read(&self.relative_target(&path))
    }

    fn set_content(&self, key: &str, value: &[u8]) -> WriteStatus {
        let path = Self::path_of(key);
        if Path::new(&path).is_absolute() && !path.starts_with('/') {
            // Drive-qualified paths cannot be placed under the root folder.
            return WriteStatus::NotPossible;
        }
        let target = self.relative_target(&path);
        if let Some(parent) = target.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::info!(path = %parent.display(), error = %e, "Failed to create parent folder");
            return WriteStatus::NotPossible;
        }
        match std::fs::write(&target, value) {
            Ok(()) => {
                tracing::debug!(path = %target.display(), "Wrote content to file");
                WriteStatus::Success
            }
            Err(e) => {
                tracing::info!(path = %target.display(), error = %e, "Failed to write file content");
                WriteStatus::NotPossible
            }
        }
    }
}
