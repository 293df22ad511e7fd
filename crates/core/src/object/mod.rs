//! Object resolvers: content plus a sidecar descriptor to typed objects.
//!
//! Responsibilities:
//! - Define the [`ObjectResolver`] capability and the [`SettingsObject`] handle.
//! - Implement the descriptor protocol once in [`DescriptorObjectResolver`],
//!   parameterized by an [`ObjectConverter`].
//! - Provide JSON and properties converters, the union combinator and the
//!   filtered/read-only wrappers.
//!
//! Does NOT handle:
//! - Locating content (callers pass a [`ContentResolver`]).
//!
//! Invariants:
//! - A missing or foreign descriptor means "not mine": `None` or
//!   `NotPossible`, never an error, so union chains fall through.
//! - Cached objects are returned as the same `Arc` (pointer identity).

mod descriptor;
mod json;
mod properties;
mod union;
mod wrappers;

use std::any::Any;
use std::sync::Arc;

use crate::content::ContentResolver;
use crate::error::{SettingsError, WriteStatus};

pub use descriptor::{
    DEFAULT_PROPERTY_SUFFIX, DescriptorObjectResolver, ObjectConverter, PROP_CACHED,
    PROP_OBJECT_RESOLVER_KEY, PROP_READONLY,
};
pub use json::{JSON_RESOLVER_KEY, JsonConverter, JsonObjectResolver};
pub use properties::{PROPERTIES_RESOLVER_KEY, PropertiesConverter, PropertiesObjectResolver};
pub use union::UnionObjectResolver;
pub use wrappers::{FilteredObjectResolver, ReadOnlyObjectResolver};

/// A resolved configuration object. Identity is `Arc::ptr_eq`.
pub type SettingsObject = Arc<dyn Any + Send + Sync>;

/// Wraps a value into a [`SettingsObject`].
pub fn settings_object<T: Any + Send + Sync>(value: T) -> SettingsObject {
    Arc::new(value)
}

/// Resolves a key and a content source to a typed object.
pub trait ObjectResolver: Send + Sync {
    fn get_object(&self, key: &str, content: &dyn ContentResolver) -> Option<SettingsObject>;

    fn set_object(
        &self,
        _key: &str,
        _content: &dyn ContentResolver,
        _value: &SettingsObject,
    ) -> WriteStatus {
        WriteStatus::NotPossible
    }

    /// Appends a delegate. Only union style resolvers accept delegates.
    fn add_object_resolver(&self, _resolver: Arc<dyn ObjectResolver>) -> Result<(), SettingsError> {
        Err(SettingsError::NotComposable("object resolver"))
    }

    /// Drops any cached object derived from the content at `key`.
    fn notify_content_has_changed(&self, _key: &str) {}
}
