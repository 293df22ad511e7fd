//! Bundled-resource content resolver.
//!
//! Resources come from two places: entries embedded into the binary (for
//! example with `include_bytes!`) and a list of resource folders searched in
//! order. Embedded entries win.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::key::{normalize_relative, strip_scheme};

use super::ContentResolver;

/// Prefix accepted in front of resource keys.
pub const CLASSPATH_PREFIX: &str = "classpath:";

#[derive(Debug, Clone, Default)]
pub struct ClasspathContentResolver {
    embedded: HashMap<String, Arc<[u8]>>,
    search_path: Vec<PathBuf>,
}

impl ClasspathContentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an embedded resource under `name`.
    pub fn with_resource(mut self, name: &str, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.embedded.insert(normalize_relative(name), bytes.into());
        self
    }

    /// Appends a folder to the resource search path.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_path.push(dir.into());
        self
    }

    pub fn add_resource(&mut self, name: &str, bytes: impl Into<Arc<[u8]>>) {
        self.embedded.insert(normalize_relative(name), bytes.into());
    }

    pub fn add_search_dir(&mut self, dir: impl Into<PathBuf>) {
        self.search_path.push(dir.into());
    }

    fn resource_name(key: &str) -> String {
        let stripped = strip_scheme(key, CLASSPATH_PREFIX).unwrap_or(key);
        normalize_relative(stripped)
    }
}

impl ContentResolver for ClasspathContentResolver {
    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        let name = Self::resource_name(key);
        if name.is_empty() {
            return None;
        }
        if let Some(bytes) = self.embedded.get(&name) {
            return Some(bytes.to_vec());
        }
        self.search_path.iter().find_map(|dir| {
            let path = dir.join(&name);
            if !path.is_file() {
                return None;
            }
            std::fs::read(&path)
                .inspect_err(|e| {
                    tracing::info!(path = %path.display(), error = %e, "Failed to read resource");
                })
                .ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_resource_with_prefix_and_slash() {
        let resolver = ClasspathContentResolver::new().with_resource("org/app/default.txt", &b"x"[..]);
        assert_eq!(resolver.get_content("org/app/default.txt"), Some(b"x".to_vec()));
        assert_eq!(resolver.get_content("classpath:org/app/default.txt"), Some(b"x".to_vec()));
        assert_eq!(resolver.get_content("classpath:/org/app/default.txt"), Some(b"x".to_vec()));
        assert_eq!(resolver.get_content("org/app/other.txt"), None);
    }

    #[test]
    fn test_search_dirs_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(second.path().join("res"), b"second").unwrap();
        std::fs::write(second.path().join("both"), b"second").unwrap();
        std::fs::write(first.path().join("both"), b"first").unwrap();

        let resolver = ClasspathContentResolver::new()
            .with_search_dir(first.path())
            .with_search_dir(second.path());
        assert_eq!(resolver.get_content("res"), Some(b"second".to_vec()));
        assert_eq!(resolver.get_content("both"), Some(b"first".to_vec()));
    }

    #[test]
    fn test_embedded_wins_over_search_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("res"), b"disk").unwrap();
        let resolver = ClasspathContentResolver::new()
            .with_search_dir(dir.path())
            .with_resource("res", &b"embedded"[..]);
        assert_eq!(resolver.get_content("res"), Some(b"embedded".to_vec()));
    }
}
