//! Error types for declarative configuration.
//!
//! Responsibilities:
//! - Define error variants for reading, parsing and applying a configuration
//!   document.
//! - Map `dotenvy` failures without leaking `.env` contents.
//!
//! Does NOT handle:
//! - Lookup-time errors (see `settings_core::SettingsError`).
//!
//! Invariants:
//! - Every variant names the entry, path or variable that caused it.
//! - Dotenv errors NEVER include raw .env line contents.

use std::io::ErrorKind;
use std::path::PathBuf;

use settings_core::SettingsError;
use thiserror::Error;

/// Errors that can occur while loading or applying a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}")]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}")]
    ConfigFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unable to determine config directory: {0}")]
    ConfigDirUnavailable(String),

    #[error("unknown {category} type '{type_id}'")]
    UnknownType {
        category: &'static str,
        type_id: String,
    },

    #[error("{category} '{name}' references unknown {category} '{reference}'")]
    MissingReference {
        category: &'static str,
        name: String,
        reference: String,
    },

    #[error("invalid parameter '{param}' for '{name}': {message}")]
    InvalidParameter {
        name: String,
        param: String,
        message: String,
    },

    #[error("missing required parameter '{param}' for '{name}'")]
    MissingParameter { name: String, param: String },

    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Expression '${{{0}}}' has no value")]
    UnresolvedExpression(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: only the byte index is kept, never the offending line.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}
