//! Registry of the settings tree.

use std::sync::Arc;

use parking_lot::RwLock;

use super::Settings;
use super::hierarchy::{HierarchicalSettings, ROOT_SETTINGS_NAME, Tree};

/// Owns a settings tree: the root node and every named node below it.
///
/// Cloning shares the same tree.
#[derive(Clone)]
pub struct SettingsRepository {
    tree: Arc<RwLock<Tree>>,
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository {
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(Tree::new())),
        }
    }

    pub fn root_settings(&self) -> HierarchicalSettings {
        self.settings(ROOT_SETTINGS_NAME)
    }

    /// Returns the node called `name`, creating it (and linking it into the
    /// tree) on first use.
    pub fn settings(&self, name: &str) -> HierarchicalSettings {
        let id = self.tree.write().get_or_create(name);
        HierarchicalSettings::new(Arc::clone(&self.tree), id)
    }

    /// Returns the node called `name` only if it was created before.
    pub fn exists(&self, name: &str) -> Option<HierarchicalSettings> {
        let id = self.tree.read().resolved(name)?;
        Some(HierarchicalSettings::new(Arc::clone(&self.tree), id))
    }

    /// Every created node except the root. Provisional placeholders are not
    /// settings and are skipped.
    pub fn current_settings(&self) -> Vec<HierarchicalSettings> {
        let ids: Vec<_> = self.tree.read().resolved_ids().collect();
        let mut list: Vec<_> = ids
            .into_iter()
            .map(|id| HierarchicalSettings::new(Arc::clone(&self.tree), id))
            .filter(|settings| !settings.is_root())
            .collect();
        list.sort_by(|a, b| a.name().cmp(b.name()));
        list
    }

    /// Number of connectors configured across all nodes.
    pub fn connector_count(&self) -> usize {
        let ids: Vec<_> = self.tree.read().resolved_ids().collect();
        ids.into_iter()
            .map(|id| HierarchicalSettings::new(Arc::clone(&self.tree), id))
            .map(|settings| settings.own().connector_list().len())
            .sum()
    }

    /// Drops every connector and mapping and restores additivity on all
    /// nodes. Existing handles stay valid.
    pub fn reset_configuration(&self) {
        let ids: Vec<_> = self.tree.read().resolved_ids().collect();
        for id in ids {
            HierarchicalSettings::new(Arc::clone(&self.tree), id).reset();
        }
        tracing::debug!("Settings configuration reset");
    }
}

impl std::fmt::Debug for SettingsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsRepository")
            .field("settings", &self.current_settings().len())
            .field("connectors", &self.connector_count())
            .finish()
    }
}
