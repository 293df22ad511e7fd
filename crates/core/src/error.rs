//! Error and status types shared by every layer of the resolution chain.
//!
//! Responsibilities:
//! - Define the two-valued [`WriteStatus`] returned by connectors and resolvers.
//! - Define [`SettingsError`], the only error type surfaced by the lookup API.
//!
//! Does NOT handle:
//! - Backend failures during lookups (connectors degrade those to `None`).
//! - Declarative configuration errors (see `settings-config`).
//!
//! Invariants:
//! - Reads never return `SettingsError`; the only lookup-time hard failure is
//!   [`SettingsError::NoWritableConnector`] on an explicit write.
//! - Every variant carries the key, name or pattern that caused it.

use thiserror::Error;

/// Outcome of a write against a single connector or resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The backend accepted the value.
    Success,
    /// The backend refused or cannot store the value.
    NotPossible,
}

impl WriteStatus {
    /// Returns true if the write was accepted.
    pub const fn is_success(self) -> bool {
        matches!(self, WriteStatus::Success)
    }
}

/// Errors raised by the settings chain.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// No connector in the effective chain accepted an explicit write.
    #[error("the value for key '{key}' cannot be written: no writable connector found")]
    NoWritableConnector { key: String },

    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("a connector named '{0}' is already registered")]
    DuplicateConnector(String),

    #[error("no valid position found for connector '{0}'")]
    NoValidPosition(String),

    /// A leaf resolver was asked to accept delegates.
    #[error("{0} does not support adding delegates")]
    NotComposable(&'static str),

    #[error("connector '{name}' failed to initialize: {message}")]
    Init { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
