//! Process-wide system properties and the connector reading them.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::object::SettingsObject;

use super::{Connector, ConnectorBase};

/// A process-wide string property table, filled at startup (for example from
/// `-D key=value` command line flags).
#[derive(Debug, Default)]
pub struct SystemProperties {
    values: RwLock<HashMap<String, String>>,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared table used by connectors built without an explicit one.
    pub fn global() -> Arc<SystemProperties> {
        static GLOBAL: OnceLock<Arc<SystemProperties>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SystemProperties::new())))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.write().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.write().remove(key)
    }

    /// Parses `key=value` and stores it. Returns false if there is no `=`.
    pub fn set_from_assignment(&self, assignment: &str) -> bool {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                self.set(key.trim(), value);
                true
            }
            _ => false,
        }
    }
}

/// Reads values from [`SystemProperties`]. Values are references for content
/// and object lookups.
pub struct SystemPropertyConnector {
    base: ConnectorBase,
    properties: Arc<SystemProperties>,
}

impl SystemPropertyConnector {
    pub const KIND: &'static str = "system-property";

    pub fn new(name: &str) -> Self {
        Self::with_properties(name, SystemProperties::global())
    }

    pub fn with_properties(name: &str, properties: Arc<SystemProperties>) -> Self {
        Self {
            base: ConnectorBase::new(name),
            properties,
        }
    }
}

impl Connector for SystemPropertyConnector {
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
        self.properties.get(key)
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        let reference = self.get_string(key)?;
        self.base.content_by_reference(&reference)
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        let reference = self.get_string(key)?;
        self.base.object_by_reference(&reference)
    }
}
