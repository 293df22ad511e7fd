//! Test doubles for connector chains.
//!
//! Available when running tests or when the `test-utils` feature is enabled.
//!
//! # Example
//! ```ignore
//! use settings_core::testing::CountingConnector;
//!
//! let connector = CountingConnector::new("memory");
//! let calls = connector.calls();
//! calls.put_string("com/acme/key", "value");
//! // hand `connector` to a settings chain, then assert on `calls` counters
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::connector::{Connector, ConnectorBase};
use crate::error::WriteStatus;
use crate::object::SettingsObject;

/// Shared backing store and call counters of a [`CountingConnector`].
#[derive(Default)]
pub struct ConnectorCalls {
    pub string_reads: AtomicUsize,
    pub content_reads: AtomicUsize,
    pub object_reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub notifications: AtomicUsize,
    refuse_writes: AtomicBool,
    strings: Mutex<HashMap<String, String>>,
    contents: Mutex<HashMap<String, Vec<u8>>>,
    objects: Mutex<HashMap<String, SettingsObject>>,
}

impl ConnectorCalls {
    pub fn put_string(&self, key: &str, value: &str) {
        self.strings.lock().insert(key.to_string(), value.to_string());
    }

    pub fn put_content(&self, key: &str, value: &[u8]) {
        self.contents.lock().insert(key.to_string(), value.to_vec());
    }

    pub fn put_object(&self, key: &str, value: SettingsObject) {
        self.objects.lock().insert(key.to_string(), value);
    }

    pub fn stored_string(&self, key: &str) -> Option<String> {
        self.strings.lock().get(key).cloned()
    }

    /// Makes every backend write report `NotPossible` (attempts still count).
    pub fn refuse_writes(&self, refuse: bool) {
        self.refuse_writes.store(refuse, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.string_reads.load(Ordering::SeqCst)
            + self.content_reads.load(Ordering::SeqCst)
            + self.object_reads.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.reads() + self.writes.load(Ordering::SeqCst)
    }

    fn write<T>(&self, map: &Mutex<HashMap<String, T>>, key: &str, value: T) -> WriteStatus {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.refuse_writes.load(Ordering::SeqCst) {
            return WriteStatus::NotPossible;
        }
        map.lock().insert(key.to_string(), value);
        WriteStatus::Success
    }
}

/// In-memory connector that counts every backend call.
pub struct CountingConnector {
    base: ConnectorBase,
    kind: &'static str,
    calls: Arc<ConnectorCalls>,
}

impl CountingConnector {
    pub fn new(name: &str) -> Self {
        Self {
            base: ConnectorBase::new(name),
            kind: "counting",
            calls: Arc::new(ConnectorCalls::default()),
        }
    }

    /// Overrides the reported kind, for position tests.
    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = kind;
        self
    }

    /// Starts with one string entry.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.calls.put_string(key, value);
        self
    }

    pub fn calls(&self) -> Arc<ConnectorCalls> {
        Arc::clone(&self.calls)
    }
}

impl Connector for CountingConnector {
    fn base(&self) -> &ConnectorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConnectorBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        self.kind
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.calls.string_reads.fetch_add(1, Ordering::SeqCst);
        self.calls.strings.lock().get(key).cloned()
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        self.calls.content_reads.fetch_add(1, Ordering::SeqCst);
        self.calls.contents.lock().get(key).cloned()
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        self.calls.object_reads.fetch_add(1, Ordering::SeqCst);
        self.calls.objects.lock().get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) -> WriteStatus {
        self.calls.write(&self.calls.strings, key, value.to_string())
    }

    fn set_content(&self, key: &str, value: &[u8]) -> WriteStatus {
        self.calls.write(&self.calls.contents, key, value.to_vec())
    }

    fn set_object(&self, key: &str, value: &SettingsObject) -> WriteStatus {
        self.calls.write(&self.calls.objects, key, Arc::clone(value))
    }

    fn notify_content_has_changed(&self, key: &str) {
        self.calls.notifications.fetch_add(1, Ordering::SeqCst);
        if let Some(resolver) = self.object_resolver() {
            resolver.notify_content_has_changed(key);
        }
    }
}
