//! Preferences connector and its JSON backed store.
//!
//! Responsibilities:
//! - Persist node/key/value preferences in a JSON file, one store per scope.
//! - Read from the user store, then the system store; write to the user store.
//!
//! Does NOT handle:
//! - Change listeners or cross-process locking of the preference file.
//!
//! Invariants:
//! - A key `a/b/c` lives in node `a/b` under the name `c`. A key without `/`
//!   lives in the root node `""`.
//! - Reads never create nodes.
//! - Every successful put is flushed with an atomic write (temp file + rename).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{SettingsError, WriteStatus};
use crate::key::{leaf_name, normalize_relative, parent_path};
use crate::object::SettingsObject;

use super::{Connector, ConnectorBase};

type Nodes = BTreeMap<String, BTreeMap<String, String>>;

/// A preference tree stored as `{ "node/path": { "key": "value" } }`.
#[derive(Debug, Default)]
pub struct PreferencesStore {
    path: Option<PathBuf>,
    nodes: RwLock<Nodes>,
}

impl PreferencesStore {
    /// A store that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store at `path`.
    ///
    /// A missing file yields an empty store. An unreadable or invalid file is
    /// renamed to `<name>.corrupt.<timestamp>` and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let nodes = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Nodes>(&bytes) {
                Ok(nodes) => nodes,
                Err(e) => {
                    match create_corrupt_backup(&path) {
                        Ok(backup) => tracing::warn!(
                            path = %path.display(),
                            backup_path = %backup.display(),
                            error = %e,
                            "Preference file is corrupt, backed up and starting empty"
                        ),
                        Err(backup_err) => tracing::error!(
                            path = %path.display(),
                            error = %e,
                            backup_error = %backup_err,
                            "Preference file is corrupt and backup failed, starting empty"
                        ),
                    }
                    Nodes::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Nodes::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read preference file");
                Nodes::new()
            }
        };
        Self {
            path: Some(path),
            nodes: RwLock::new(nodes),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn node_exists(&self, node: &str) -> bool {
        self.nodes.read().contains_key(node)
    }

    pub fn get(&self, node: &str, key: &str) -> Option<String> {
        self.nodes.read().get(node)?.get(key).cloned()
    }

    /// Stores a value, creating the node as needed, and flushes.
    pub fn put(&self, node: &str, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut nodes = self.nodes.write();
        nodes
            .entry(node.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.flush(&nodes)
    }

    pub fn remove(&self, node: &str, key: &str) -> Result<Option<String>, SettingsError> {
        let mut nodes = self.nodes.write();
        let removed = nodes.get_mut(node).and_then(|entries| entries.remove(key));
        if removed.is_some() {
            self.flush(&nodes)?;
        }
        Ok(removed)
    }

    fn flush(&self, nodes: &Nodes) -> Result<(), SettingsError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(nodes).map_err(std::io::Error::from)?;
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;
        tracing::debug!(path = %path.display(), "Preferences flushed");
        Ok(())
    }
}

fn create_corrupt_backup(path: &Path) -> Result<PathBuf, std::io::Error> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let backup_path = path.with_extension(format!("corrupt.{timestamp}"));
    std::fs::rename(path, &backup_path)?;
    Ok(backup_path)
}

/// Splits a settings key into its preference node and entry name.
fn split_key(key: &str) -> (String, String) {
    let normalized = normalize_relative(key);
    let node = parent_path(&normalized).unwrap_or("").to_string();
    let name = leaf_name(&normalized).to_string();
    (node, name)
}

/// Reads user preferences, then system preferences. Writes go to the user
/// scope. Values are references for content and object lookups.
pub struct PreferencesConnector {
    base: ConnectorBase,
    user: Arc<PreferencesStore>,
    system: Arc<PreferencesStore>,
}

impl PreferencesConnector {
    pub const KIND: &'static str = "preferences";

    /// A connector over two in-memory stores.
    pub fn new(name: &str) -> Self {
        Self::with_stores(
            name,
            Arc::new(PreferencesStore::in_memory()),
            Arc::new(PreferencesStore::in_memory()),
        )
    }

    pub fn with_stores(name: &str, user: Arc<PreferencesStore>, system: Arc<PreferencesStore>) -> Self {
        Self {
            base: ConnectorBase::new(name),
            user,
            system,
        }
    }

    pub fn user_store(&self) -> &Arc<PreferencesStore> {
        &self.user
    }

    pub fn system_store(&self) -> &Arc<PreferencesStore> {
        &self.system
    }

    /// Writes into the system scope instead of the user scope.
    pub fn set_system_string(&self, key: &str, value: &str) -> WriteStatus {
        Self::put(&self.system, key, value)
    }

    fn put(store: &PreferencesStore, key: &str, value: &str) -> WriteStatus {
        let (node, name) = split_key(key);
        match store.put(&node, &name, value) {
            Ok(()) => WriteStatus::Success,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cannot store preference");
                WriteStatus::NotPossible
            }
        }
    }
}

impl Connector for PreferencesConnector {
    fn base(&self) -> &ConnectorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConnectorBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn get_string(&self, key: &str) -> Option<String> {
        let (node, name) = split_key(key);
        self.user
            .get(&node, &name)
            .or_else(|| self.system.get(&node, &name))
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        let reference = self.get_string(key)?;
        self.base.content_by_reference(&reference)
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        let reference = self.get_string(key)?;
        self.base.object_by_reference(&reference)
    }

    fn set_string(&self, key: &str, value: &str) -> WriteStatus {
        Self::put(&self.user, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("com/acme/param"), ("com/acme".to_string(), "param".to_string()));
        assert_eq!(split_key(r"\com\acme\param"), ("com/acme".to_string(), "param".to_string()));
        assert_eq!(split_key("param"), (String::new(), "param".to_string()));
    }

    #[test]
    fn test_user_scope_wins_over_system_scope() {
        let connector = PreferencesConnector::new("prefs");
        assert_eq!(connector.set_system_string("com/acme/a", "system"), WriteStatus::Success);
        assert_eq!(connector.get_string("com/acme/a"), Some("system".to_string()));

        assert_eq!(connector.set_string("com/acme/a", "user"), WriteStatus::Success);
        assert_eq!(connector.get_string("com/acme/a"), Some("user".to_string()));
        assert_eq!(connector.system_store().get("com/acme", "a"), Some("system".to_string()));
    }

    #[test]
    fn test_reads_do_not_create_nodes() {
        let connector = PreferencesConnector::new("prefs");
        assert_eq!(connector.get_string("com/acme/missing"), None);
        assert!(!connector.user_store().node_exists("com/acme"));
    }

    #[test]
    fn test_store_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs").join("user.json");

        let store = PreferencesStore::open(&path);
        store.put("com/acme", "key", "value").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let reopened = PreferencesStore::open(&path);
        assert_eq!(reopened.get("com/acme", "key"), Some("value".to_string()));
        assert_eq!(reopened.remove("com/acme", "key").unwrap(), Some("value".to_string()));
        assert_eq!(PreferencesStore::open(&path).get("com/acme", "key"), None);
    }

    #[test]
    fn test_corrupt_store_is_backed_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = PreferencesStore::open(&path);
        assert_eq!(store.get("", "anything"), None);
        assert!(!path.exists());

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("user.corrupt."))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read(backups[0].path()).unwrap(), b"{ not json");
    }
}
