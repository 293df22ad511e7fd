//! Connectors command implementation.

use anyhow::Result;
use settings_core::Settings;

use crate::context::SettingsContext;
use crate::formatters::{ConnectorRow, OutputFormat, get_formatter};

pub fn run(ctx: &SettingsContext, output_format: &str) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let rows: Vec<ConnectorRow> = ctx
        .settings()
        .connectors()
        .iter()
        .enumerate()
        .map(|(position, connector)| ConnectorRow {
            position,
            name: connector.name().to_string(),
            kind: connector.kind().to_string(),
            read_only: connector.is_read_only(),
        })
        .collect();

    let output = get_formatter(format).format_connectors(ctx.settings_name(), &rows)?;
    println!("{output}");
    Ok(())
}
