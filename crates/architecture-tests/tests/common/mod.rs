//! Source walking helpers shared by the architecture tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, found by walking up to a `Cargo.toml` with `[workspace]`.
pub fn workspace_root() -> PathBuf {
    let start = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let mut dir = start.as_path();
    loop {
        if let Ok(content) = fs::read_to_string(dir.join("Cargo.toml"))
            && content.contains("[workspace]")
        {
            return dir.to_path_buf();
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return start,
        }
    }
}

/// Every `.rs` file below `dir`, skipping build output.
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != "target")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Source text with every `#[cfg(test)]` module cut off.
///
/// Test modules sit at the end of a file in this workspace, so everything
/// from the first `#[cfg(test)]` on is dropped.
pub fn production_source(content: &str) -> &str {
    match content.find("#[cfg(test)]") {
        Some(index) => &content[..index],
        None => content,
    }
}
