//! Shared test utilities for settings-cli integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Keep the host's configuration document and variables out of tests.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper are hermetic by default.
//! - Without `--config`, commands run on the fallback configuration.

use std::path::Path;

use assert_cmd::Command;

/// Returns a hermetic `settings-cli` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `SETTINGS_CONFIG_PATH` is cleared and the platform config directory
///   points at an empty location.
pub fn settings_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("settings-cli");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    // Hermeticity: no host configuration document
    cmd.env_remove("SETTINGS_CONFIG_PATH");
    cmd.env(
        "XDG_CONFIG_HOME",
        Path::new(env!("CARGO_TARGET_TMPDIR")).join("no-config-home"),
    );
    cmd.env_remove("RUST_LOG");

    cmd
}

/// Returns a hermetic command that reads the document at `config`.
#[allow(dead_code)]
pub fn settings_cmd_with_config(config: &Path) -> Command {
    let mut cmd = settings_cmd();
    cmd.arg("--config").arg(config);
    cmd
}

/// Writes `document` as `settings.json` into `dir` and returns its path.
#[allow(dead_code)]
pub fn write_config(dir: &Path, document: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.join("settings.json");
    std::fs::write(&path, serde_json::to_vec_pretty(document).unwrap()).unwrap();
    path
}
