//! Command dispatch logic.
//!
//! Responsibilities:
//! - Load the settings context shared by every command.
//! - Route parsed CLI arguments to the command handlers.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//!
//! Invariants:
//! - Configuration is loaded exactly once per invocation, before any command runs.

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;
use crate::commands::get::Accessor;
use crate::context::SettingsContext;

pub(crate) fn run_command(cli: Cli) -> Result<()> {
    let ctx = SettingsContext::load(cli.config_path, &cli.defines, cli.settings)?;

    match cli.command {
        Commands::Get {
            key,
            content,
            object,
        } => {
            let accessor = if content {
                Accessor::Content
            } else if object {
                Accessor::Object
            } else {
                Accessor::String
            };
            commands::get::run(&ctx, &key, accessor, &cli.output)?;
        }
        Commands::Set {
            key,
            value,
            content_file,
        } => {
            commands::set::run(&ctx, &key, value.as_deref(), content_file.as_deref())?;
        }
        Commands::Connectors => {
            commands::connectors::run(&ctx, &cli.output)?;
        }
        Commands::Check => {
            commands::check::run(&ctx, &cli.output)?;
        }
    }
    Ok(())
}
