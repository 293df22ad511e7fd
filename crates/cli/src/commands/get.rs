//! Get command implementation.

use std::io::Write;

use anyhow::{Context, Result};
use settings_core::Settings;
use tracing::debug;

use crate::context::SettingsContext;
use crate::error::CommandError;
use crate::formatters::{OutputFormat, get_formatter, object_to_json};

/// What `get` should look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    String,
    Content,
    Object,
}

pub fn run(ctx: &SettingsContext, key: &str, accessor: Accessor, output_format: &str) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let settings = ctx.settings();
    debug!(settings = %ctx.settings_name(), key = %key, ?accessor, "Looking up key");

    let not_found = || CommandError::NotFound {
        key: key.to_string(),
    };

    match accessor {
        Accessor::String => {
            let value = settings.get_string(key).ok_or_else(not_found)?;
            println!("{}", get_formatter(format).format_value(key, &value)?);
        }
        Accessor::Content => {
            let content = settings.get_content(key).ok_or_else(not_found)?;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&content)
                .and_then(|()| stdout.flush())
                .context("Failed to write content to stdout")?;
        }
        Accessor::Object => {
            let object = settings.get_object(key).ok_or_else(not_found)?;
            let json = object_to_json(&object).with_context(|| {
                format!("The object for key '{key}' has a type that cannot be printed")
            })?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
