//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Validate `-D key=value` definitions at parse time.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not load configuration (see `context` module).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "settings-cli")]
#[command(about = "Look up and write settings through a configured connector chain", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  settings-cli -D app/mode=dev get app/mode\n  settings-cli --config settings.json get com/acme/db --object\n  settings-cli --settings com.acme.app connectors\n  settings-cli --config settings.json set app/mode prod\n  settings-cli --config settings.json check\n"
)]
pub struct Cli {
    /// Path to the configuration document (overrides the default location).
    ///
    /// Can also be set via SETTINGS_CONFIG_PATH environment variable.
    #[arg(long = "config", global = true, env = "SETTINGS_CONFIG_PATH", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Define a system property for the system-property connector (repeatable)
    #[arg(short = 'D', long = "define", global = true, value_name = "KEY=VALUE", value_parser = parse_definition)]
    pub defines: Vec<(String, String)>,

    /// Dotted name of the settings node to use instead of the root
    #[arg(short, long, global = true, value_name = "NAME")]
    pub settings: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the value of a key
    Get {
        /// Slash-delimited key, e.g. com/acme/app/db
        key: String,

        /// Print the raw content instead of the string value
        #[arg(long, conflicts_with = "object")]
        content: bool,

        /// Print the resolved object as JSON
        #[arg(long)]
        object: bool,
    },

    /// Write a value through the first writable connector
    Set {
        key: String,

        /// String value to store
        #[arg(required_unless_present = "content_file", conflicts_with = "content_file")]
        value: Option<String>,

        /// Store the bytes of this file as content
        #[arg(long, value_name = "FILE")]
        content_file: Option<PathBuf>,
    },

    /// List the effective connectors in lookup order
    Connectors,

    /// Load the configuration and report entries that could not be applied
    Check,
}

/// Parses `key=value`. The key must not be empty; the value may be.
fn parse_definition(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
