//! Per-key value caches used by cached connectors and object resolvers.
//!
//! Responsibilities:
//! - Provide [`KeyedCache`], a narrow `get`/`put`/`invalidate` component over
//!   a concurrent `moka` cache.
//! - Provide [`ConnectorCache`], one cache per accessor kind (string, content,
//!   object) for a cached connector layer.
//!
//! Does NOT handle:
//! - Time based expiry. Entries live until invalidated or cleared.
//! - Deciding what to cache (callers own that policy).
//!
//! Invariants:
//! - Concurrent population of the same key is last-write-wins.
//! - A cached connector stores `None` results too (negative caching), so a
//!   missing key costs one backend call per cache generation.

use moka::sync::Cache as MokaCache;

use crate::object::SettingsObject;

/// Concurrent key to value cache without expiry.
#[derive(Clone)]
pub struct KeyedCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: MokaCache<String, V>,
}

impl<V> KeyedCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self {
            inner: MokaCache::builder().build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key)
    }

    pub fn put(&self, key: &str, value: V) {
        self.inner.insert(key.to_string(), value);
    }

    /// Returns the cached value or computes, stores and returns it.
    ///
    /// Concurrent callers for the same key share one computation.
    pub fn get_or_insert_with(&self, key: &str, init: impl FnOnce() -> V) -> V {
        self.inner.get_with(key.to_string(), init)
    }

    pub fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

impl<V> Default for KeyedCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for KeyedCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

/// Cache of resolved objects keyed by settings key.
pub type ObjectCache = KeyedCache<SettingsObject>;

/// The three per-kind caches owned by one cached connector layer.
#[derive(Debug, Default, Clone)]
pub struct ConnectorCache {
    pub strings: KeyedCache<Option<String>>,
    pub contents: KeyedCache<Option<Vec<u8>>>,
    pub objects: KeyedCache<Option<SettingsObject>>,
}

impl ConnectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every cached value for `key`.
    pub fn invalidate(&self, key: &str) {
        self.strings.invalidate(key);
        self.contents.invalidate(key);
        self.objects.invalidate(key);
    }

    pub fn clear(&self) {
        self.strings.clear();
        self.contents.clear();
        self.objects.clear();
    }
}
