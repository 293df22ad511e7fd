//! Integration tests for the get, set, connectors and check commands.
//!
//! Responsibilities:
//! - Drive the binary against the fallback configuration and against
//!   documents written into temp directories.
//! - Verify stdout shape for text and JSON output.

mod common;

use common::{settings_cmd, settings_cmd_with_config, write_config};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// A document with read-only system properties in front of a writable
/// file-system connector rooted at `root`.
fn fs_document(root: &std::path::Path) -> serde_json::Value {
    json!({
        "objectResolvers": [{ "name": "json", "type": "json" }],
        "connectors": [
            { "name": "props", "type": "system-property", "readOnly": true },
            {
                "name": "files",
                "type": "fs",
                "params": { "rootFolder": root.to_string_lossy() },
                "objectResolver": "json"
            }
        ],
        "settings": [
            { "name": "com.acme.isolated", "additivity": false }
        ]
    })
}

// =============================================================================
// get
// =============================================================================

#[test]
fn test_get_reads_definition_through_fallback() {
    settings_cmd()
        .args(["-D", "app/mode=dev", "get", "app/mode"])
        .assert()
        .success()
        .stdout("dev\n");
}

#[test]
fn test_get_json_output() {
    let output = settings_cmd()
        .args(["-D", "app/mode=dev", "-o", "json", "get", "app/mode"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["key"], "app/mode");
    assert_eq!(parsed["value"], "dev");
}

#[test]
fn test_get_environment_variable_by_fallback_key() {
    settings_cmd()
        .env("COM_ACME_DB_URL", "jdbc:test")
        .args(["get", "com/acme/db-url"])
        .assert()
        .success()
        .stdout("jdbc:test\n");
}

#[test]
fn test_get_content_follows_reference_to_file() {
    let dir = TempDir::new().unwrap();
    let logo = dir.path().join("logo.bin");
    std::fs::write(&logo, [0_u8, 1, 2, 255]).unwrap();

    settings_cmd()
        .arg("-D")
        .arg(format!("logo=file:{}", logo.display()))
        .args(["get", "logo", "--content"])
        .assert()
        .success()
        .stdout(predicate::eq(&[0_u8, 1, 2, 255][..]));
}

#[test]
fn test_get_object_prints_json() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("conf.json"), r#"{"port": 8080}"#).unwrap();
    std::fs::write(
        dir.path().join("conf.json.properties"),
        "objectResolverKey=json\n",
    )
    .unwrap();
    let config = write_config(dir.path(), &fs_document(dir.path()));

    let output = settings_cmd_with_config(&config)
        .args(["get", "conf.json", "--object"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["port"], 8080);
}

#[test]
fn test_get_uses_config_from_environment_variable() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("greeting"), "hello").unwrap();
    let config = write_config(dir.path(), &fs_document(dir.path()));

    settings_cmd()
        .env("SETTINGS_CONFIG_PATH", &config)
        .args(["get", "greeting"])
        .assert()
        .success()
        .stdout("hello\n");
}

// =============================================================================
// set
// =============================================================================

#[test]
fn test_set_writes_to_first_writable_connector() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &fs_document(dir.path()));

    settings_cmd_with_config(&config)
        .args(["set", "app/mode", "prod"])
        .assert()
        .success();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("app/mode")).unwrap(),
        "prod"
    );

    settings_cmd_with_config(&config)
        .args(["get", "app/mode"])
        .assert()
        .success()
        .stdout("prod\n");
}

#[test]
fn test_set_content_from_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("store");
    std::fs::create_dir(&root).unwrap();
    let source = dir.path().join("payload.bin");
    std::fs::write(&source, b"PAYLOAD").unwrap();
    let config = write_config(dir.path(), &fs_document(&root));

    settings_cmd_with_config(&config)
        .args(["set", "blobs/one", "--content-file"])
        .arg(&source)
        .assert()
        .success();
    assert_eq!(std::fs::read(root.join("blobs/one")).unwrap(), b"PAYLOAD");
}

#[test]
fn test_set_on_non_additive_scope_without_connectors_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &fs_document(dir.path()));

    settings_cmd_with_config(&config)
        .args(["--settings", "com.acme.isolated", "set", "k", "v"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("'k'"));
}

// =============================================================================
// connectors
// =============================================================================

#[test]
fn test_connectors_lists_fallback_chain() {
    let assert = settings_cmd().args(["connectors"]).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 6, "{stdout}");
    assert!(lines[1].contains("system-property"));
    assert!(lines[2].contains("environment"));
    assert!(lines[5].contains("classpath"));
    assert!(lines[1..].iter().all(|line| line.ends_with("read-only")));
}

#[test]
fn test_connectors_json_for_configured_document() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &fs_document(dir.path()));

    let output = settings_cmd_with_config(&config)
        .args(["-o", "json", "connectors"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["settings"], "root");
    let connectors = parsed["connectors"].as_array().unwrap();
    assert_eq!(connectors.len(), 2);
    assert_eq!(connectors[0]["name"], "props");
    assert_eq!(connectors[0]["read_only"], true);
    assert_eq!(connectors[1]["kind"], "fs");
    assert_eq!(connectors[1]["read_only"], false);
}

#[test]
fn test_connectors_inherited_by_provisional_child() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &fs_document(dir.path()));

    settings_cmd_with_config(&config)
        .args(["--settings", "com.acme.other", "connectors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("props"))
        .stdout(predicate::str::contains("files"));

    settings_cmd_with_config(&config)
        .args(["--settings", "com.acme.isolated", "connectors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No connectors for settings 'com.acme.isolated'"));
}

// =============================================================================
// check
// =============================================================================

#[test]
fn test_check_without_document_reports_fallback() {
    settings_cmd()
        .args(["check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration: none found"))
        .stdout(predicate::str::contains("Fallback configuration applied."))
        .stdout(predicate::str::contains("All entries applied."));
}

#[test]
fn test_check_reports_omitted_entries() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        &json!({
            "connectors": [
                { "name": "props", "type": "system-property" },
                { "name": "broken", "type": "no-such-type" }
            ],
            "root": { "connectors": ["props", "missing"] }
        }),
    );

    settings_cmd_with_config(&config)
        .args(["check"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Omitted entries:"))
        .stdout(predicate::str::contains("'broken'"))
        .stdout(predicate::str::contains("'missing'"))
        .stderr(predicate::str::contains("2 configuration entries"));
}

#[test]
fn test_check_json_output_for_complete_document() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &fs_document(dir.path()));

    let output = settings_cmd_with_config(&config)
        .args(["-o", "json", "check"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["fallback_applied"], false);
    assert_eq!(parsed["connectors"], json!(["props", "files"]));
    assert_eq!(parsed["omitted"], json!([]));
}
