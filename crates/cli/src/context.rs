//! Builds the configured settings for one CLI invocation.
//!
//! Responsibilities:
//! - Publish `-D` definitions to the process-wide system properties.
//! - Find and apply the configuration document, or the fallback.
//! - Select the settings node named by `--settings`.
//!
//! Does NOT handle:
//! - Running commands (see `dispatch`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use settings_config::{ConfigReport, Configurator, Registry, SettingsManager, resolve_config_path};
use settings_core::HierarchicalSettings;
use settings_core::connector::SystemProperties;

/// A configured manager plus what was used to configure it.
pub struct SettingsContext {
    pub manager: SettingsManager,
    /// The document that was read, if any.
    pub config_path: Option<PathBuf>,
    /// Outcome of applying the document.
    pub report: Option<ConfigReport>,
    /// Outcome of applying the fallback, when the document left the
    /// repository without connectors.
    pub fallback: Option<ConfigReport>,
    settings_name: Option<String>,
}

impl SettingsContext {
    pub fn load(
        config_path: Option<PathBuf>,
        defines: &[(String, String)],
        settings_name: Option<String>,
    ) -> Result<Self> {
        let properties = SystemProperties::global();
        for (key, value) in defines {
            properties.set(key.clone(), value.clone());
        }

        let registry = Registry::with_defaults().with_system_properties(properties);
        let manager = SettingsManager::new(Configurator::new(registry));

        let config_path = resolve_config_path(config_path.as_deref());
        let report = match &config_path {
            Some(path) => Some(
                manager
                    .configure_from_path(path)
                    .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            ),
            None => None,
        };
        let fallback = manager.ensure_configured();

        Ok(Self {
            manager,
            config_path,
            report,
            fallback,
            settings_name,
        })
    }

    /// The node selected by `--settings`, or the root.
    pub fn settings(&self) -> HierarchicalSettings {
        match &self.settings_name {
            Some(name) => self.manager.named_settings(name),
            None => self.manager.settings(),
        }
    }

    pub fn settings_name(&self) -> &str {
        self.settings_name
            .as_deref()
            .unwrap_or(settings_core::ROOT_SETTINGS_NAME)
    }
}
