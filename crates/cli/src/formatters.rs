//! Output formatters for CLI commands.
//!
//! Provides two output formats: plain text and JSON.

use anyhow::Result;
use serde::Serialize;
use settings_core::{Properties, SettingsObject};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parse from string.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => anyhow::bail!("Invalid output format: {}. Valid options: text, json", s),
        }
    }
}

/// One connector of an effective chain.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorRow {
    pub position: usize,
    pub name: String,
    pub kind: String,
    pub read_only: bool,
}

/// Result of the `check` command.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutput {
    pub config_path: Option<String>,
    pub fallback_applied: bool,
    pub connectors: Vec<String>,
    pub scopes: Vec<String>,
    pub omitted: Vec<OmittedRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OmittedRow {
    pub category: String,
    pub name: String,
    pub error: String,
}

/// Formatter trait for different output types.
pub trait Formatter {
    fn format_value(&self, key: &str, value: &str) -> Result<String>;

    fn format_connectors(&self, settings: &str, rows: &[ConnectorRow]) -> Result<String>;

    fn format_check(&self, check: &CheckOutput) -> Result<String>;
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_value(&self, _key: &str, value: &str) -> Result<String> {
        Ok(value.to_string())
    }

    fn format_connectors(&self, settings: &str, rows: &[ConnectorRow]) -> Result<String> {
        if rows.is_empty() {
            return Ok(format!("No connectors for settings '{settings}'."));
        }
        let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
        let kind_width = rows.iter().map(|r| r.kind.len()).max().unwrap_or(0).max(4);

        let mut out = format!(
            "{:<3} {:<name_width$} {:<kind_width$} ACCESS\n",
            "#", "NAME", "KIND"
        );
        for row in rows {
            let access = if row.read_only { "read-only" } else { "read-write" };
            out.push_str(&format!(
                "{:<3} {:<name_width$} {:<kind_width$} {}\n",
                row.position, row.name, row.kind, access
            ));
        }
        Ok(out.trim_end().to_string())
    }

    fn format_check(&self, check: &CheckOutput) -> Result<String> {
        let mut out = match &check.config_path {
            Some(path) => format!("Configuration: {path}\n"),
            None => "Configuration: none found\n".to_string(),
        };
        if check.fallback_applied {
            out.push_str("Fallback configuration applied.\n");
        }
        out.push_str(&format!("Connectors: {}\n", check.connectors.join(", ")));
        out.push_str(&format!("Settings: {}\n", check.scopes.join(", ")));
        if check.omitted.is_empty() {
            out.push_str("All entries applied.");
        } else {
            out.push_str("Omitted entries:");
            for omitted in &check.omitted {
                out.push_str(&format!(
                    "\n  {} '{}': {}",
                    omitted.category, omitted.name, omitted.error
                ));
            }
        }
        Ok(out)
    }
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_value(&self, key: &str, value: &str) -> Result<String> {
        Ok(serde_json::to_string_pretty(
            &serde_json::json!({ "key": key, "value": value }),
        )?)
    }

    fn format_connectors(&self, settings: &str, rows: &[ConnectorRow]) -> Result<String> {
        Ok(serde_json::to_string_pretty(
            &serde_json::json!({ "settings": settings, "connectors": rows }),
        )?)
    }

    fn format_check(&self, check: &CheckOutput) -> Result<String> {
        Ok(serde_json::to_string_pretty(check)?)
    }
}

/// Get a formatter for the specified output format.
pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Renders an object as JSON if its type is one the CLI knows.
pub fn object_to_json(object: &SettingsObject) -> Option<serde_json::Value> {
    if let Some(value) = object.downcast_ref::<serde_json::Value>() {
        return Some(value.clone());
    }
    if let Some(properties) = object.downcast_ref::<Properties>() {
        let map = properties
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        return Some(serde_json::Value::Object(map));
    }
    if let Some(text) = object.downcast_ref::<String>() {
        return Some(serde_json::Value::String(text.clone()));
    }
    if let Some(bytes) = object.downcast_ref::<Vec<u8>>() {
        return Some(serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()));
    }
    None
}
