//! The sidecar descriptor protocol shared by every concrete object resolver.
//!
//! Responsibilities:
//! - Load `<key><suffix>` (default `.properties`) next to the content and
//!   check that it names this resolver in `objectResolverKey`.
//! - Convert content to objects and back through an [`ObjectConverter`].
//! - Decide per key whether results are cached (`cached` property, falling
//!   back to the resolver default) and honour `readonly=true` on writes.
//!
//! Does NOT handle:
//! - Format specific decoding (converters own that).
//!
//! Invariants:
//! - No object is produced for content without a descriptor.
//! - Ownership mismatches and malformed descriptors are silent pass-throughs.
//! - Cache entries only go away through `notify_content_has_changed`.

use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::content::ContentResolver;
use crate::error::WriteStatus;
use crate::filter::Filter;
use crate::properties::Properties;

use super::{ObjectResolver, SettingsObject};

/// Descriptor property naming the owning resolver.
pub const PROP_OBJECT_RESOLVER_KEY: &str = "objectResolverKey";
/// Descriptor property overriding the resolver's default caching.
pub const PROP_CACHED: &str = "cached";
/// Descriptor property that forbids writes when `true`.
pub const PROP_READONLY: &str = "readonly";
/// Suffix appended to a key to locate its descriptor.
pub const DEFAULT_PROPERTY_SUFFIX: &str = ".properties";

/// Format specific half of an object resolver.
pub trait ObjectConverter: Send + Sync {
    /// Identity expected in the descriptor's `objectResolverKey`.
    fn identity(&self) -> &str;

    fn content_to_object(
        &self,
        key: &str,
        descriptor: &Properties,
        content: &[u8],
        source: &dyn ContentResolver,
    ) -> Option<SettingsObject>;

    /// Serializes `value`. Converters that cannot write keep the default.
    fn object_to_content(
        &self,
        _key: &str,
        _descriptor: &Properties,
        _value: &SettingsObject,
    ) -> Option<Vec<u8>> {
        None
    }
}

/// Object resolver driven by sidecar descriptors.
pub struct DescriptorObjectResolver<C> {
    converter: C,
    identity_override: Option<String>,
    property_suffix: String,
    cached_by_default: bool,
    filter: Option<Arc<dyn Filter>>,
    cache: ObjectCache,
}

impl<C: ObjectConverter> DescriptorObjectResolver<C> {
    pub fn new(converter: C) -> Self {
        Self {
            converter,
            identity_override: None,
            property_suffix: DEFAULT_PROPERTY_SUFFIX.to_string(),
            cached_by_default: false,
            filter: None,
            cache: ObjectCache::new(),
        }
    }

    /// Caches results whose descriptor does not set `cached`.
    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached_by_default = cached;
        self
    }

    pub fn with_property_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.property_suffix = suffix.into();
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Claims descriptors naming `identity` instead of the converter's default.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity_override = Some(identity.into());
        self
    }

    pub fn identity(&self) -> &str {
        self.identity_override
            .as_deref()
            .unwrap_or_else(|| self.converter.identity())
    }

    pub fn is_cached(&self) -> bool {
        self.cached_by_default
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    fn is_filtered_out(&self, key: &str) -> bool {
        self.filter.as_ref().is_some_and(|f| !f.is_valid(key))
    }

    fn load_descriptor(&self, key: &str, source: &dyn ContentResolver) -> Option<Properties> {
        let bytes = source.get_content(&format!("{key}{}", self.property_suffix))?;
        Some(Properties::from_bytes(&bytes))
    }

    /// Returns the descriptor if it declares this resolver as owner.
    fn owned_descriptor(&self, key: &str, source: &dyn ContentResolver) -> Option<Properties> {
        let descriptor = self.load_descriptor(key, source)?;
        match descriptor.get(PROP_OBJECT_RESOLVER_KEY) {
            None | Some("") => {
                tracing::warn!(
                    key = %key,
                    property = PROP_OBJECT_RESOLVER_KEY,
                    "Object descriptor is missing the required property"
                );
                None
            }
            Some(owner) if owner.trim() == self.identity() => Some(descriptor),
            Some(_) => None,
        }
    }

    fn cache_enabled(&self, descriptor: &Properties) -> bool {
        match descriptor.get(PROP_CACHED) {
            Some(value) => value.trim().eq_ignore_ascii_case("true"),
            None => self.cached_by_default,
        }
    }
}

impl<C: ObjectConverter> ObjectResolver for DescriptorObjectResolver<C> {
    fn get_object(&self, key: &str, content: &dyn ContentResolver) -> Option<SettingsObject> {
        if self.is_filtered_out(key) {
            return None;
        }
        if let Some(cached) = self.cache.get(key) {
            return Some(cached);
        }

        let bytes = content.get_content(key)?;
        let descriptor = self.owned_descriptor(key, content)?;
        let object = self
            .converter
            .content_to_object(key, &descriptor, &bytes, content)?;

        if self.cache_enabled(&descriptor) {
            self.cache.put(key, Arc::clone(&object));
        }
        Some(object)
    }

    fn set_object(
        &self,
        key: &str,
        content: &dyn ContentResolver,
        value: &SettingsObject,
    ) -> WriteStatus {
        if self.is_filtered_out(key) {
            return WriteStatus::NotPossible;
        }
        let Some(descriptor) = self.owned_descriptor(key, content) else {
            return WriteStatus::NotPossible;
        };
        if descriptor.is_true(PROP_READONLY) {
            tracing::debug!(key = %key, "Object descriptor is readonly; refusing write");
            return WriteStatus::NotPossible;
        }
        let Some(bytes) = self.converter.object_to_content(key, &descriptor, value) else {
            return WriteStatus::NotPossible;
        };

        let status = content.set_content(key, &bytes);
        if status.is_success() {
            if self.cache_enabled(&descriptor) {
                self.cache.put(key, Arc::clone(value));
            } else {
                self.cache.invalidate(key);
            }
        }
        status
    }

    fn notify_content_has_changed(&self, key: &str) {
        self.cache.invalidate(key);
        if let Some(base) = key.strip_suffix(self.property_suffix.as_str()) {
            self.cache.invalidate(base);
        }
    }
}
