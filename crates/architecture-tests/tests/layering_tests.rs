//! Architecture tests for crate layering.
//!
//! Invariants:
//! - `settings-core` depends on no other workspace crate.
//! - `settings-config` depends on `settings-core` only.
//! - Library crates never install a global tracing subscriber; only the
//!   binary decides where logs go.
//! - Library code outside test modules does not call `unwrap()` or `expect(`.

mod common;

use std::fs;

fn manifest(crate_dir: &str) -> String {
    let path = common::workspace_root()
        .join("crates")
        .join(crate_dir)
        .join("Cargo.toml");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

#[test]
fn test_core_has_no_workspace_dependencies() {
    let core = manifest("core");
    assert!(!core.contains("settings-config"));
    assert!(!core.contains("settings-cli"));
}

#[test]
fn test_config_does_not_depend_on_cli() {
    let config = manifest("config");
    assert!(config.contains("settings-core"));
    assert!(!config.contains("settings-cli"));
}

#[test]
fn test_libraries_do_not_install_subscribers() {
    let root = common::workspace_root().join("crates");
    let mut violations = Vec::new();
    for crate_dir in ["core", "config"] {
        for path in common::rust_files(&root.join(crate_dir).join("src")) {
            let content = fs::read_to_string(&path).unwrap_or_default();
            if content.contains("tracing_subscriber") {
                violations.push(path.display().to_string());
            }
        }
    }
    assert!(
        violations.is_empty(),
        "library sources reference tracing_subscriber:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_library_code_propagates_errors() {
    let root = common::workspace_root().join("crates");
    let mut violations = Vec::new();
    for crate_dir in ["core", "config"] {
        for path in common::rust_files(&root.join(crate_dir).join("src")) {
            if path.components().any(|c| c.as_os_str() == "testing") {
                continue;
            }
            let content = fs::read_to_string(&path).unwrap_or_default();
            for (i, line) in common::production_source(&content).lines().enumerate() {
                let trimmed = line.trim_start();
                if trimmed.starts_with("//") {
                    continue;
                }
                if line.contains(".unwrap()") || line.contains(".expect(") {
                    violations.push(format!("{}:{}: {}", path.display(), i + 1, trimmed));
                }
            }
        }
    }
    assert!(
        violations.is_empty(),
        "unwrap/expect in library code:\n{}",
        violations.join("\n")
    );
}
