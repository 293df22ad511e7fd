//! Set command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use settings_core::Settings;
use tracing::info;

use crate::context::SettingsContext;

pub fn run(
    ctx: &SettingsContext,
    key: &str,
    value: Option<&str>,
    content_file: Option<&Path>,
) -> Result<()> {
    let settings = ctx.settings();

    match (value, content_file) {
        (_, Some(path)) => {
            let content = std::fs::read(path)
                .with_context(|| format!("Failed to read content from {}", path.display()))?;
            settings
                .set_content(key, &content)
                .with_context(|| format!("Failed to write content for '{key}'"))?;
            info!(key = %key, bytes = content.len(), "Content written");
        }
        (Some(value), None) => {
            settings
                .set_string(key, value)
                .with_context(|| format!("Failed to write '{key}'"))?;
            info!(key = %key, "Value written");
        }
        (None, None) => anyhow::bail!("either a value or --content-file is required"),
    }
    Ok(())
}
