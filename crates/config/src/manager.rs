//! Process-wide default settings repository.
//!
//! Responsibilities:
//! - Own a [`SettingsRepository`] together with the [`Configurator`] used
//!   to configure it.
//! - Apply the embedded fallback configuration when a repository is used
//!   without any connector.
//! - Provide a lazily initialised global instance and lookup shortcuts.
//!
//! Does NOT handle:
//! - Anything the core lookup API needs; applications may build their own
//!   repositories and never touch this module.
//!
//! Invariants:
//! - The fallback is applied at most once per empty state: the connector
//!   count is re-checked under a lock before configuring.
//! - Configuration failures are logged and never panic.

use std::path::Path;
use std::sync::OnceLock;

use parking_lot::Mutex;
use settings_core::{HierarchicalSettings, Settings, SettingsObject, SettingsRepository};
use tracing::{debug, error, info};

use crate::configurator::{ConfigReport, Configurator};
use crate::discovery::resolve_config_path;
use crate::document::ConfigDocument;
use crate::error::ConfigError;

/// Configuration applied to a repository that has no connectors.
///
/// Read-only system properties, environment, naming, preferences and bundled
/// resources, in that order, sharing JSON and properties object resolvers.
pub const FALLBACK_CONFIGURATION: &str = include_str!("../defaults/fallback-settings.json");

/// A settings repository plus the machinery that configures it.
#[derive(Debug)]
pub struct SettingsManager {
    repository: SettingsRepository,
    configurator: Configurator,
    fallback_lock: Mutex<()>,
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new(Configurator::default())
    }
}

impl SettingsManager {
    pub fn new(configurator: Configurator) -> Self {
        Self {
            repository: SettingsRepository::new(),
            configurator,
            fallback_lock: Mutex::new(()),
        }
    }

    /// The process-wide manager.
    ///
    /// On first use it reads the discovered configuration document, if any.
    pub fn global() -> &'static SettingsManager {
        static GLOBAL: OnceLock<SettingsManager> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let manager = SettingsManager::default();
            if let Some(path) = resolve_config_path(None)
                && let Err(err) = manager.configure_from_path(&path)
            {
                error!(path = %path.display(), error = %err, "Failed to load settings configuration");
            }
            manager
        })
    }

    pub fn repository(&self) -> &SettingsRepository {
        &self.repository
    }

    pub fn configurator(&self) -> &Configurator {
        &self.configurator
    }

    pub fn configure(&self, doc: &ConfigDocument) -> ConfigReport {
        self.configurator.configure(doc, &self.repository)
    }

    /// Drops all connectors, mappings and additivity settings. The next
    /// lookup through [`settings`](Self::settings) applies the fallback again.
    pub fn reset(&self) {
        let _guard = self.fallback_lock.lock();
        self.repository.reset_configuration();
        info!("Settings configuration reset");
    }

    /// Reads the document at `path` and applies it.
    pub fn configure_from_path(&self, path: &Path) -> Result<ConfigReport, ConfigError> {
        let doc = ConfigDocument::from_path(path)?;
        debug!(path = %path.display(), "Applying settings configuration");
        Ok(self.configure(&doc))
    }

    /// Applies the fallback configuration if no node holds a connector.
    ///
    /// Returns the report when the fallback was applied.
    pub fn ensure_configured(&self) -> Option<ConfigReport> {
        if self.repository.connector_count() > 0 {
            return None;
        }
        let _guard = self.fallback_lock.lock();
        if self.repository.connector_count() > 0 {
            return None;
        }

        info!("No connectors configured, applying the default fallback configuration");
        match ConfigDocument::from_json(FALLBACK_CONFIGURATION) {
            Ok(doc) => Some(self.configure(&doc)),
            Err(err) => {
                error!(error = %err, "Fallback configuration is invalid");
                None
            }
        }
    }

    /// The root settings, configured with the fallback if needed.
    pub fn settings(&self) -> HierarchicalSettings {
        self.ensure_configured();
        self.repository.root_settings()
    }

    /// The settings node called `name`, configured with the fallback if needed.
    pub fn named_settings(&self, name: &str) -> HierarchicalSettings {
        self.ensure_configured();
        self.repository.settings(name)
    }
}

/// Looks `key` up in the root settings of the global manager.
pub fn get_string(key: &str) -> Option<String> {
    SettingsManager::global().settings().get_string(key)
}

/// Looks `key` up in the root settings of the global manager.
pub fn get_content(key: &str) -> Option<Vec<u8>> {
    SettingsManager::global().settings().get_content(key)
}

/// Looks `key` up in the root settings of the global manager.
pub fn get_object(key: &str) -> Option<SettingsObject> {
    SettingsManager::global().settings().get_object(key)
}
