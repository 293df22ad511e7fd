//! Flat settings scope.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::connector::{Connector, ConnectorPosition, insert_at_position};
use crate::error::SettingsError;

use super::{Route, Settings};

/// Connector chain and key mapping of one scope, published together.
#[derive(Clone, Default)]
pub(crate) struct Scope {
    pub(crate) connectors: Vec<Arc<dyn Connector>>,
    pub(crate) mapping: HashMap<String, String>,
}

impl Scope {
    /// The own mapping for `key`. Empty targets count as unmapped.
    pub(crate) fn mapping_for(&self, key: &str) -> Option<&str> {
        self.mapping
            .get(key)
            .map(String::as_str)
            .filter(|target| !target.is_empty())
    }
}

/// A named connector chain plus a key mapping table.
///
/// The connector list and the mapping form one immutable snapshot, so a
/// lookup never pairs a new chain with an old mapping. Configuration calls
/// are serialized; lookups never block on them.
pub struct SettingsInstance {
    name: String,
    scope: ArcSwap<Scope>,
    config_lock: Mutex<()>,
}

impl SettingsInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: ArcSwap::from_pointee(Scope::default()),
            config_lock: Mutex::new(()),
        }
    }

    fn update(&self, change: impl FnOnce(&mut Scope) -> Result<(), SettingsError>) -> Result<(), SettingsError> {
        let _guard = self.config_lock.lock();
        let mut next = self.scope.load().as_ref().clone();
        change(&mut next)?;
        self.scope.store(Arc::new(next));
        Ok(())
    }

    /// Appends a connector at the end of the chain.
    pub fn add_connector(&self, connector: Arc<dyn Connector>) -> Result<(), SettingsError> {
        self.add_connector_at(connector, &ConnectorPosition::AtLast)
    }

    pub fn add_connector_at(
        &self,
        connector: Arc<dyn Connector>,
        position: &ConnectorPosition,
    ) -> Result<(), SettingsError> {
        self.update(|scope| insert_at_position(&mut scope.connectors, connector, position))
    }

    pub fn remove_all_connectors(&self) {
        let _ = self.update(|scope| {
            scope.connectors.clear();
            Ok(())
        });
    }

    /// Replaces the whole chain in one step.
    pub fn replace_connectors(&self, connectors: Vec<Arc<dyn Connector>>) -> Result<(), SettingsError> {
        let validated = validate(connectors)?;
        self.update(|scope| {
            scope.connectors = validated;
            Ok(())
        })
    }

    pub fn set_mapping(&self, mapping: HashMap<String, String>) {
        let _ = self.update(|scope| {
            scope.mapping = mapping;
            Ok(())
        });
    }

    /// Replaces chain and mapping as one snapshot. On a duplicate connector
    /// name nothing changes.
    pub fn configure(
        &self,
        connectors: Vec<Arc<dyn Connector>>,
        mapping: HashMap<String, String>,
    ) -> Result<(), SettingsError> {
        let validated = validate(connectors)?;
        self.update(|scope| {
            *scope = Scope {
                connectors: validated,
                mapping,
            };
            Ok(())
        })
    }

    pub(crate) fn scope(&self) -> Arc<Scope> {
        self.scope.load_full()
    }

    /// The own connector list.
    pub fn connector_list(&self) -> Vec<Arc<dyn Connector>> {
        self.scope.load().connectors.clone()
    }

    pub fn mapping(&self) -> HashMap<String, String> {
        self.scope.load().mapping.clone()
    }

    /// The own mapping for `key`. Empty targets count as unmapped.
    pub fn own_mapping(&self, key: &str) -> Option<String> {
        self.scope.load().mapping_for(key).map(str::to_string)
    }
}

fn validate(connectors: Vec<Arc<dyn Connector>>) -> Result<Vec<Arc<dyn Connector>>, SettingsError> {
    let mut validated: Vec<Arc<dyn Connector>> = Vec::with_capacity(connectors.len());
    for connector in connectors {
        insert_at_position(&mut validated, connector, &ConnectorPosition::AtLast)?;
    }
    Ok(validated)
}

impl Settings for SettingsInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn connectors(&self) -> Vec<Arc<dyn Connector>> {
        self.connector_list()
    }

    fn mapped_key(&self, key: &str) -> String {
        self.own_mapping(key).unwrap_or_else(|| key.to_string())
    }

    fn connector(&self, name: &str) -> Option<Arc<dyn Connector>> {
        self.scope.load().connectors.iter().find(|c| c.name() == name).cloned()
    }

    fn route(&self, key: &str) -> Route {
        let scope = self.scope.load();
        Route {
            key: scope.mapping_for(key).unwrap_or(key).to_string(),
            connectors: scope.connectors.clone(),
        }
    }
}

impl std::fmt::Debug for SettingsInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = self.scope.load();
        f.debug_struct("SettingsInstance")
            .field("name", &self.name)
            .field("connectors", &scope.connectors.len())
            .field("mapping", &scope.mapping.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::DecoratedConnector;
    use crate::object::settings_object;
    use crate::testing::CountingConnector;

    #[test]
    fn test_first_connector_wins() {
        let settings = SettingsInstance::new("flat");
        settings
            .add_connector(Arc::new(CountingConnector::new("a").with_string("k", "a")))
            .unwrap();
        settings
            .add_connector(Arc::new(CountingConnector::new("b").with_string("k", "b")))
            .unwrap();
        assert_eq!(settings.get_string("k"), Some("a".to_string()));

        let priority = CountingConnector::new("first").with_string("k", "first");
        settings
            .add_connector_at(Arc::new(priority), &ConnectorPosition::AtFirst)
            .unwrap();
        assert_eq!(settings.get_string("k"), Some("first".to_string()));
        assert_eq!(settings.get_string("missing"), None);
    }

    #[test]
    fn test_duplicate_connector_name_rejected() {
        let settings = SettingsInstance::new("flat");
        settings.add_connector(Arc::new(CountingConnector::new("a"))).unwrap();
        let err = settings.add_connector(Arc::new(CountingConnector::new("a"))).unwrap_err();
        assert!(matches!(err, SettingsError::DuplicateConnector(name) if name == "a"));
        assert_eq!(settings.connectors().len(), 1);
    }

    #[test]
    fn test_mapping_redirects_key() {
        let settings = SettingsInstance::new("flat");
        settings
            .add_connector(Arc::new(CountingConnector::new("a").with_string("real/key", "v")))
            .unwrap();
        settings.set_mapping(HashMap::from([
            ("alias".to_string(), "real/key".to_string()),
            ("blank".to_string(), String::new()),
        ]));
        assert_eq!(settings.mapped_key("alias"), "real/key");
        assert_eq!(settings.mapped_key("blank"), "blank");
        assert_eq!(settings.get_string("alias"), Some("v".to_string()));
    }

    #[test]
    fn test_write_goes_to_first_accepting_connector() {
        let settings = SettingsInstance::new("flat");
        let ro = CountingConnector::new("ro");
        let rw = CountingConnector::new("rw");
        let rw_calls = rw.calls();
        settings
            .add_connector(Arc::new(DecoratedConnector::wrap(Box::new(ro)).read_only()))
            .unwrap();
        settings.add_connector(Arc::new(rw)).unwrap();

        settings.set_string("k", "v").unwrap();
        assert_eq!(rw_calls.stored_string("k"), Some("v".to_string()));
        assert_eq!(settings.get_string("k"), Some("v".to_string()));

        let value = settings_object(7_i64);
        settings.set_object("obj", &value).unwrap();
        assert!(Arc::ptr_eq(&settings.get_object("obj").unwrap(), &value));
    }

    #[test]
    fn test_read_only_chain_write_fails_with_key() {
        let settings = SettingsInstance::new("flat");
        settings
            .add_connector(Arc::new(
                DecoratedConnector::wrap(Box::new(CountingConnector::new("ro"))).read_only(),
            ))
            .unwrap();
        let err = settings.set_content("com/acme/blob", b"x").unwrap_err();
        assert!(err.to_string().contains("com/acme/blob"));
    }

    #[test]
    fn test_remove_and_replace_connectors() {
        let settings = SettingsInstance::new("flat");
        settings.add_connector(Arc::new(CountingConnector::new("a"))).unwrap();
        settings.remove_all_connectors();
        assert!(settings.connectors().is_empty());

        settings
            .replace_connectors(vec![
                Arc::new(CountingConnector::new("x")) as Arc<dyn Connector>,
                Arc::new(CountingConnector::new("y")),
            ])
            .unwrap();
        assert_eq!(settings.connector("y").map(|c| c.name().to_string()), Some("y".to_string()));

        let dup = settings.replace_connectors(vec![
            Arc::new(CountingConnector::new("z")) as Arc<dyn Connector>,
            Arc::new(CountingConnector::new("z")),
        ]);
        assert!(dup.is_err());
        assert_eq!(settings.connectors().len(), 2);
    }

    #[test]
    fn test_configure_publishes_chain_and_mapping_together() {
        let settings = SettingsInstance::new("flat");
        settings
            .configure(
                vec![Arc::new(CountingConnector::new("old").with_string("old/key", "old")) as Arc<dyn Connector>],
                HashMap::from([("alias".to_string(), "old/key".to_string())]),
            )
            .unwrap();
        let before = settings.route("alias");

        settings
            .configure(
                vec![Arc::new(CountingConnector::new("new").with_string("new/key", "new")) as Arc<dyn Connector>],
                HashMap::from([("alias".to_string(), "new/key".to_string())]),
            )
            .unwrap();
        let after = settings.route("alias");

        assert_eq!(before.key, "old/key");
        assert_eq!(before.connectors[0].name(), "old");
        assert_eq!(after.key, "new/key");
        assert_eq!(after.connectors[0].name(), "new");
        assert_eq!(settings.get_string("alias"), Some("new".to_string()));
    }

    #[test]
    fn test_configure_with_duplicate_names_keeps_previous_scope() {
        let settings = SettingsInstance::new("flat");
        settings
            .configure(
                vec![Arc::new(CountingConnector::new("a")) as Arc<dyn Connector>],
                HashMap::from([("k".to_string(), "mapped".to_string())]),
            )
            .unwrap();
        let dup = settings.configure(
            vec![
                Arc::new(CountingConnector::new("z")) as Arc<dyn Connector>,
                Arc::new(CountingConnector::new("z")),
            ],
            HashMap::new(),
        );
        assert!(dup.is_err());
        assert_eq!(settings.connectors()[0].name(), "a");
        assert_eq!(settings.mapped_key("k"), "mapped");
    }
}
