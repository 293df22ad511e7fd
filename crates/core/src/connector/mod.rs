//! Connectors: the per-backend lookup units of a settings chain.
//!
//! Responsibilities:
//! - Define the [`Connector`] capability and its shared state, [`ConnectorBase`].
//! - Provide the concrete backends (system properties, environment, filesystem,
//!   bundled resources, property files, preferences, naming context).
//! - Provide [`DecoratedConnector`] for cached/filtered/read-only/notifying
//!   composition and [`ConnectorPosition`] for ordered insertion.
//!
//! Does NOT handle:
//! - Chain iteration across connectors (see `settings`).
//!
//! Invariants:
//! - A connector is configured through `&mut self`, initialized once, then
//!   shared as `Arc<dyn Connector>` and only used through `&self`.
//! - Reads and writes never fail loudly; backend errors become `None` or
//!   [`WriteStatus::NotPossible`].
//! - Property-style backends store references: content and objects are
//!   resolved by passing the stored string to the configured resolvers.

mod classpath;
mod decorated;
mod environment;
mod fs;
mod naming;
mod position;
mod preferences;
mod property_file;
mod system_property;

use std::sync::Arc;

use crate::content::{ContentResolver, EmptyContentResolver};
use crate::error::{SettingsError, WriteStatus};
use crate::object::{ObjectResolver, SettingsObject};

pub use classpath::ClasspathConnector;
pub use decorated::{Decoration, DecoratedConnector};
pub use environment::{EnvironmentConnector, environment_fallback_key};
pub use fs::FsConnector;
pub use naming::{
    DEFAULT_NAMING_PREFIX, InMemoryNamingContext, NamingConnector, NamingContext, NamingError,
    NamingValue,
};
pub use position::{ConnectorPosition, insert_at_position};
pub use preferences::{PreferencesConnector, PreferencesStore};
pub use property_file::PropertyFileConnector;
pub use system_property::{SystemProperties, SystemPropertyConnector};

/// State every connector carries: its name, resolvers and nested connectors.
#[derive(Default, Clone)]
pub struct ConnectorBase {
    name: String,
    content_resolver: Option<Arc<dyn ContentResolver>>,
    object_resolver: Option<Arc<dyn ObjectResolver>>,
    connectors: Vec<Arc<dyn Connector>>,
}

impl ConnectorBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_resolver(&self) -> Option<&Arc<dyn ContentResolver>> {
        self.content_resolver.as_ref()
    }

    pub fn object_resolver(&self) -> Option<&Arc<dyn ObjectResolver>> {
        self.object_resolver.as_ref()
    }

    /// Nested connectors available to `init` for auxiliary lookups.
    pub fn connectors(&self) -> &[Arc<dyn Connector>] {
        &self.connectors
    }

    /// Resolves `reference` through the content resolver.
    pub fn content_by_reference(&self, reference: &str) -> Option<Vec<u8>> {
        self.content_resolver.as_ref()?.get_content(reference)
    }

    /// Resolves `reference` through the object resolver, reading content from
    /// the content resolver (or nothing if none is configured).
    pub fn object_by_reference(&self, reference: &str) -> Option<SettingsObject> {
        let resolver = self.object_resolver.as_ref()?;
        match self.content_resolver.as_deref() {
            Some(content) => resolver.get_object(reference, content),
            None => resolver.get_object(reference, &EmptyContentResolver),
        }
    }

    /// Looks `key` up in the nested connectors, first non-`None` wins.
    pub fn nested_string(&self, key: &str) -> Option<String> {
        self.connectors.iter().find_map(|c| c.get_string(key))
    }
}

impl std::fmt::Debug for ConnectorBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorBase")
            .field("name", &self.name)
            .field("content_resolver", &self.content_resolver.is_some())
            .field("object_resolver", &self.object_resolver.is_some())
            .field("connectors", &self.connectors.len())
            .finish()
    }
}

/// A backend specific lookup and write unit.
pub trait Connector: Send + Sync {
    fn base(&self) -> &ConnectorBase;

    fn base_mut(&mut self) -> &mut ConnectorBase;

    /// Type identifier used by positions and the configuration registry.
    fn kind(&self) -> &'static str;

    fn get_string(&self, key: &str) -> Option<String>;

    fn get_content(&self, key: &str) -> Option<Vec<u8>>;

    fn get_object(&self, key: &str) -> Option<SettingsObject>;

    fn set_string(&self, _key: &str, _value: &str) -> WriteStatus {
        WriteStatus::NotPossible
    }

    fn set_content(&self, _key: &str, _value: &[u8]) -> WriteStatus {
        WriteStatus::NotPossible
    }

    fn set_object(&self, _key: &str, _value: &SettingsObject) -> WriteStatus {
        WriteStatus::NotPossible
    }

    /// Called exactly once after configuration and before first use.
    fn init(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    fn set_name(&mut self, name: String) {
        self.base_mut().name = name;
    }

    fn content_resolver(&self) -> Option<&Arc<dyn ContentResolver>> {
        self.base().content_resolver()
    }

    fn set_content_resolver(&mut self, resolver: Arc<dyn ContentResolver>) {
        self.base_mut().content_resolver = Some(resolver);
    }

    fn object_resolver(&self) -> Option<&Arc<dyn ObjectResolver>> {
        self.base().object_resolver()
    }

    fn set_object_resolver(&mut self, resolver: Arc<dyn ObjectResolver>) {
        self.base_mut().object_resolver = Some(resolver);
    }

    fn add_connector(&mut self, connector: Arc<dyn Connector>) {
        self.base_mut().connectors.push(connector);
    }

    /// True if every write through this connector is refused up front.
    fn is_read_only(&self) -> bool {
        false
    }

    /// Tells the object resolver that the content at `key` changed.
    fn notify_content_has_changed(&self, key: &str) {
        if let Some(resolver) = self.object_resolver() {
            resolver.notify_content_has_changed(key);
        }
    }
}

impl std::fmt::Debug for dyn Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}
