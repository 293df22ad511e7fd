//! Settings scopes: ordered connector chains with key remapping.
//!
//! Responsibilities:
//! - Define the [`Settings`] lookup API shared by flat and hierarchical scopes.
//! - Provide the flat [`SettingsInstance`], the [`HierarchicalSettings`] tree
//!   and the [`SettingsRepository`] that owns it.
//!
//! Does NOT handle:
//! - Building connectors from declarative configuration (see `settings-config`).
//!
//! Invariants:
//! - Reads return the first non-`None` connector result in chain order.
//! - A write that no connector accepts is a [`SettingsError::NoWritableConnector`].
//! - Lookups run against a snapshot of chain and mapping; reconfiguration
//!   swaps both at once, so a reader never sees a partially cleared chain or
//!   a new chain paired with an old mapping.

mod chain;
mod hierarchy;
mod instance;
mod repository;

use std::sync::Arc;

use crate::connector::Connector;
use crate::error::SettingsError;
use crate::object::SettingsObject;

pub use hierarchy::{HierarchicalSettings, ROOT_SETTINGS_NAME};
pub use instance::SettingsInstance;
pub use repository::SettingsRepository;

/// The mapped key and effective chain for one lookup, taken from a single
/// configuration snapshot.
#[derive(Clone)]
pub struct Route {
    pub key: String,
    pub connectors: Vec<Arc<dyn Connector>>,
}

/// Key/value lookup over an ordered connector chain.
///
/// Implementors provide the effective chain and the key mapping; the lookup
/// and write operations are shared.
pub trait Settings: Send + Sync {
    fn name(&self) -> &str;

    /// The effective connector chain, highest priority first.
    fn connectors(&self) -> Vec<Arc<dyn Connector>>;

    /// The key a lookup for `key` is actually issued with.
    fn mapped_key(&self, key: &str) -> String;

    /// Finds a connector of the effective chain by name.
    fn connector(&self, name: &str) -> Option<Arc<dyn Connector>> {
        self.connectors().into_iter().find(|c| c.name() == name)
    }

    /// Mapped key and chain for `key`, consistent with each other.
    fn route(&self, key: &str) -> Route {
        Route {
            key: self.mapped_key(key),
            connectors: self.connectors(),
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        let route = self.route(key);
        chain::first_found(&route.connectors, key, &route.key, "String", |c, k| c.get_string(k))
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        let route = self.route(key);
        chain::first_found(&route.connectors, key, &route.key, "Content", |c, k| c.get_content(k))
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        let route = self.route(key);
        chain::first_found(&route.connectors, key, &route.key, "Object", |c, k| c.get_object(k))
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let route = self.route(key);
        chain::first_written(&route.connectors, key, &route.key, |c, k| c.set_string(k, value))
    }

    fn set_content(&self, key: &str, value: &[u8]) -> Result<(), SettingsError> {
        let route = self.route(key);
        chain::first_written(&route.connectors, key, &route.key, |c, k| c.set_content(k, value))
    }

    fn set_object(&self, key: &str, value: &SettingsObject) -> Result<(), SettingsError> {
        let route = self.route(key);
        chain::first_written(&route.connectors, key, &route.key, |c, k| c.set_object(k, value))
    }
}
