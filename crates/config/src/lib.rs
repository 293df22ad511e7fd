//! Declarative configuration for settings chains.
//!
//! This crate reads a JSON configuration document, builds the connectors and
//! resolvers it describes through a [`Registry`] of factories, and attaches
//! them to the nodes of a [`settings_core::SettingsRepository`]. It also
//! provides the process-wide [`SettingsManager`] with its embedded fallback
//! configuration.

pub mod configurator;
pub mod discovery;
pub mod document;
mod error;
pub mod manager;
pub mod params;
pub mod registry;

pub use configurator::{ConfigReport, Configurator, OmittedEntry};
pub use discovery::{CONFIG_PATH_ENV, default_config_path, load_dotenv, resolve_config_path};
pub use document::{
    ConfigDocument, ConnectorEntry, FilterEntry, MappingEntry, ResolverEntry, ScopeEntry,
};
pub use error::ConfigError;
pub use manager::{FALLBACK_CONFIGURATION, SettingsManager};
pub use registry::{FactoryContext, Registry};
