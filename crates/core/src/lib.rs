//! Hierarchical settings lookup over ordered connector chains.
//!
//! A key such as `com/acme/app/param` is resolved by asking each connector of
//! a settings scope in turn (system properties, environment, files, bundled
//! resources, property files, preferences, a naming context) and returning the
//! first value found. Raw content can be turned into typed objects through
//! object resolvers driven by sidecar `<key>.properties` descriptors.
//!
//! The main entry points are [`SettingsRepository`] for a tree of named
//! scopes and [`SettingsInstance`] for a single flat chain.

pub mod cache;
pub mod connector;
pub mod content;
pub mod error;
pub mod filter;
pub mod key;
pub mod object;
pub mod properties;
pub mod settings;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use connector::{Connector, ConnectorPosition, DecoratedConnector, Decoration};
pub use content::ContentResolver;
pub use error::{SettingsError, WriteStatus};
pub use filter::{Filter, PatternFilter};
pub use object::{ObjectResolver, SettingsObject, settings_object};
pub use properties::Properties;
pub use settings::{
    HierarchicalSettings, ROOT_SETTINGS_NAME, Route, Settings, SettingsInstance, SettingsRepository,
};
