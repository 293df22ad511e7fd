//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map library and command errors found in an `anyhow` chain to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.

use settings_config::ConfigError;
use settings_core::SettingsError;
use thiserror::Error;

/// Structured exit codes for settings-cli.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Configuration error - unreadable document or omitted entries.
    ///
    /// Scripts should fix the configuration and not retry.
    ConfigError = 2,

    /// No connector in the chain holds the key.
    NotFound = 4,

    /// No connector in the chain accepted the write.
    NoWritableConnector = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

/// Failures detected by the commands themselves.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("no value found for key '{key}'")]
    NotFound { key: String },

    #[error("{count} configuration entries could not be applied")]
    IncompleteConfiguration { count: usize },
}

impl From<&CommandError> for ExitCode {
    fn from(err: &CommandError) -> Self {
        match err {
            CommandError::NotFound { .. } => ExitCode::NotFound,
            CommandError::IncompleteConfiguration { .. } => ExitCode::ConfigError,
        }
    }
}

impl From<&SettingsError> for ExitCode {
    fn from(err: &SettingsError) -> Self {
        match err {
            SettingsError::NoWritableConnector { .. } => ExitCode::NoWritableConnector,
            _ => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if nothing in the chain is recognised.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(err) = cause.downcast_ref::<CommandError>() {
                return ExitCode::from(err);
            }
            if let Some(err) = cause.downcast_ref::<SettingsError>() {
                return ExitCode::from(err);
            }
            if let Some(err) = cause.downcast_ref::<ConfigError>() {
                return match err {
                    ConfigError::Settings(inner) => ExitCode::from(inner),
                    _ => ExitCode::ConfigError,
                };
            }
        }
        ExitCode::GeneralError
    }
}
