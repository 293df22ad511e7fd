//! Connector decoration as an explicit, ordered layer list.
//!
//! Responsibilities:
//! - Apply [`Decoration`] layers (outermost first) around one base connector.
//! - Memoize reads per key and accessor kind in cached layers.
//! - Skip filtered keys, refuse writes in read-only layers, and notify the
//!   object resolver after successful content writes in notifier layers.
//!
//! Does NOT handle:
//! - Backend I/O (the wrapped connector does that).
//!
//! Invariants:
//! - Layers are evaluated in list order; a layer only sees calls that every
//!   outer layer let through.
//! - A filtered-out key never reaches inner layers or the backend.
//! - A read-only layer never calls any inner write.
//! - A successful write through a cached layer drops that key from its cache.

use std::sync::Arc;

use crate::cache::{ConnectorCache, KeyedCache};
use crate::content::ContentResolver;
use crate::error::{SettingsError, WriteStatus};
use crate::filter::Filter;
use crate::object::{ObjectResolver, SettingsObject};

use super::{Connector, ConnectorBase};

/// One layer around a base connector.
#[derive(Clone)]
pub enum Decoration {
    /// Memoizes string, content and object lookups, including misses.
    Cached(ConnectorCache),
    /// Hides keys the filter rejects.
    Filtered(Arc<dyn Filter>),
    /// Refuses every write.
    ReadOnly,
    /// Forwards `notify_content_has_changed` after successful content writes.
    ContentChangeNotifier,
}

impl Decoration {
    pub fn cached() -> Self {
        Decoration::Cached(ConnectorCache::new())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Decoration::Cached(_) => "cached",
            Decoration::Filtered(_) => "filtered",
            Decoration::ReadOnly => "read-only",
            Decoration::ContentChangeNotifier => "notify-content-changed",
        }
    }
}

impl std::fmt::Debug for Decoration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A base connector plus its decoration layers.
pub struct DecoratedConnector {
    inner: Box<dyn Connector>,
    layers: Vec<Decoration>,
}

fn strings(cache: &ConnectorCache) -> &KeyedCache<Option<String>> {
    &cache.strings
}

fn contents(cache: &ConnectorCache) -> &KeyedCache<Option<Vec<u8>>> {
    &cache.contents
}

fn objects(cache: &ConnectorCache) -> &KeyedCache<Option<SettingsObject>> {
    &cache.objects
}

type CacheSlot<T> = fn(&ConnectorCache) -> &KeyedCache<Option<T>>;

impl DecoratedConnector {
    /// Wraps `inner` with `layers`, listed outermost first.
    pub fn new(inner: Box<dyn Connector>, layers: Vec<Decoration>) -> Self {
        Self { inner, layers }
    }

    /// Starts an empty decoration around `inner`.
    pub fn wrap(inner: Box<dyn Connector>) -> Self {
        Self::new(inner, Vec::new())
    }

    /// Adds a cached layer inside the layers added so far.
    pub fn cached(self) -> Self {
        self.with_layer(Decoration::cached())
    }

    pub fn filtered(self, filter: Arc<dyn Filter>) -> Self {
        self.with_layer(Decoration::Filtered(filter))
    }

    pub fn read_only(self) -> Self {
        self.with_layer(Decoration::ReadOnly)
    }

    pub fn notify_changes(self) -> Self {
        self.with_layer(Decoration::ContentChangeNotifier)
    }

    pub fn with_layer(mut self, layer: Decoration) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn layers(&self) -> &[Decoration] {
        &self.layers
    }

    pub fn inner(&self) -> &dyn Connector {
        self.inner.as_ref()
    }

    /// Drops `key` from every cached layer.
    pub fn clear_cached_value(&self, key: &str) {
        for layer in &self.layers {
            if let Decoration::Cached(cache) = layer {
                cache.invalidate(key);
            }
        }
    }

    /// Drops everything from every cached layer.
    pub fn clear_cache(&self) {
        for layer in &self.layers {
            if let Decoration::Cached(cache) = layer {
                cache.clear();
            }
        }
    }

    fn read<T>(
        &self,
        depth: usize,
        key: &str,
        slot: CacheSlot<T>,
        backend: &dyn Fn(&dyn Connector, &str) -> Option<T>,
    ) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        match self.layers.get(depth) {
            None => backend(self.inner.as_ref(), key),
            Some(Decoration::Cached(cache)) => slot(cache)
                .get_or_insert_with(key, || self.read(depth + 1, key, slot, backend)),
            Some(Decoration::Filtered(filter)) if !filter.is_valid(key) => {
                tracing::trace!(connector = %self.name(), key = %key, "Key filtered out");
                None
            }
            Some(_) => self.read(depth + 1, key, slot, backend),
        }
    }

    fn write(
        &self,
        depth: usize,
        key: &str,
        changes_content: bool,
        backend: &dyn Fn(&dyn Connector) -> WriteStatus,
    ) -> WriteStatus {
        match self.layers.get(depth) {
            None => backend(self.inner.as_ref()),
            Some(Decoration::ReadOnly) => WriteStatus::NotPossible,
            Some(Decoration::Filtered(filter)) => {
                if filter.is_valid(key) {
                    self.write(depth + 1, key, changes_content, backend)
                } else {
                    WriteStatus::NotPossible
                }
            }
            Some(Decoration::Cached(cache)) => {
                let status = self.write(depth + 1, key, changes_content, backend);
                if status.is_success() {
                    cache.invalidate(key);
                }
                status
            }
            Some(Decoration::ContentChangeNotifier) => {
                let status = self.write(depth + 1, key, changes_content, backend);
                if status.is_success() && changes_content {
                    self.inner.notify_content_has_changed(key);
                }
                status
            }
        }
    }
}

impl Connector for DecoratedConnector {
    fn base(&self) -> &ConnectorBase {
        self.inner.base()
    }

    fn base_mut(&mut self) -> &mut ConnectorBase {
        self.inner.base_mut()
    }

    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.read(0, key, strings, &|c, k| c.get_string(k))
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        self.read(0, key, contents, &|c, k| c.get_content(k))
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        self.read(0, key, objects, &|c, k| c.get_object(k))
    }

    fn set_string(&self, key: &str, value: &str) -> WriteStatus {
        self.write(0, key, true, &|c| c.set_string(key, value))
    }

    fn set_content(&self, key: &str, value: &[u8]) -> WriteStatus {
        self.write(0, key, true, &|c| c.set_content(key, value))
    }

    fn set_object(&self, key: &str, value: &SettingsObject) -> WriteStatus {
        self.write(0, key, false, &|c| c.set_object(key, value))
    }

    fn init(&mut self) -> Result<(), SettingsError> {
        self.inner.init()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn set_name(&mut self, name: String) {
        self.inner.set_name(name);
    }

    fn content_resolver(&self) -> Option<&Arc<dyn ContentResolver>> {
        self.inner.content_resolver()
    }

    fn set_content_resolver(&mut self, resolver: Arc<dyn ContentResolver>) {
        self.inner.set_content_resolver(resolver);
    }

    fn object_resolver(&self) -> Option<&Arc<dyn ObjectResolver>> {
        self.inner.object_resolver()
    }

    fn set_object_resolver(&mut self, resolver: Arc<dyn ObjectResolver>) {
        self.inner.set_object_resolver(resolver);
    }

    fn add_connector(&mut self, connector: Arc<dyn Connector>) {
        self.inner.add_connector(connector);
    }

    fn is_read_only(&self) -> bool {
        self.layers
            .iter()
            .any(|layer| matches!(layer, Decoration::ReadOnly))
            || self.inner.is_read_only()
    }

    fn notify_content_has_changed(&self, key: &str) {
        self.clear_cached_value(key);
        self.inner.notify_content_has_changed(key);
    }
}
