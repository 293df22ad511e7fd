//! Check command implementation.

use anyhow::Result;
use settings_config::ConfigReport;

use crate::context::SettingsContext;
use crate::error::CommandError;
use crate::formatters::{CheckOutput, OmittedRow, OutputFormat, get_formatter};

fn omitted_rows(report: &ConfigReport) -> Vec<OmittedRow> {
    report
        .omitted
        .iter()
        .map(|entry| OmittedRow {
            category: entry.category.to_string(),
            name: entry.name.clone(),
            error: entry.error.to_string(),
        })
        .collect()
}

pub fn run(ctx: &SettingsContext, output_format: &str) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;

    let mut check = CheckOutput {
        config_path: ctx.config_path.as_ref().map(|p| p.display().to_string()),
        fallback_applied: ctx.fallback.is_some(),
        connectors: Vec::new(),
        scopes: Vec::new(),
        omitted: Vec::new(),
    };
    for report in [&ctx.report, &ctx.fallback].into_iter().flatten() {
        check.connectors.extend(report.connectors.iter().cloned());
        check.scopes.extend(report.scopes.iter().cloned());
        check.omitted.extend(omitted_rows(report));
    }

    println!("{}", get_formatter(format).format_check(&check)?);

    if check.omitted.is_empty() {
        Ok(())
    } else {
        Err(CommandError::IncompleteConfiguration {
            count: check.omitted.len(),
        }
        .into())
    }
}
