//! Naming-context connector.
//!
//! Responsibilities:
//! - Look keys up in a [`NamingContext`] under a context path prefix, falling
//!   back to the bare key.
//! - Rebind values, creating parent sub-contexts on the way.
//! - Probe context availability once and memoize the answer.
//!
//! Does NOT handle:
//! - Remote naming protocols. Contexts are supplied by the application.
//!
//! Invariants:
//! - The availability probe runs at most once per generation; concurrent
//!   callers wait on the same probe. `reset_availability` starts a new
//!   generation.
//! - While the context is known to be unavailable every read is `None` and
//!   every write is `NotPossible`, without touching the context.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::error::WriteStatus;
use crate::key::normalize_relative;
use crate::object::{SettingsObject, settings_object};

use super::{Connector, ConnectorBase};

pub const DEFAULT_NAMING_PREFIX: &str = "comp/env/";

/// A value bound in a naming context.
#[derive(Clone)]
pub enum NamingValue {
    String(String),
    Bytes(Vec<u8>),
    Object(SettingsObject),
    /// A sub-context (a branch, not a leaf).
    Context,
}

impl NamingValue {
    fn type_name(&self) -> &'static str {
        match self {
            NamingValue::String(_) => "string",
            NamingValue::Bytes(_) => "bytes",
            NamingValue::Object(_) => "object",
            NamingValue::Context => "context",
        }
    }
}

impl std::fmt::Debug for NamingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingValue::String(s) => f.debug_tuple("String").field(s).finish(),
            NamingValue::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            NamingValue::Object(_) => f.write_str("Object(..)"),
            NamingValue::Context => f.write_str("Context"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// There is no naming context at all.
    #[error("no naming context available")]
    NoContext,

    #[error("name '{0}' is not bound")]
    NotFound(String),

    #[error("naming context is read only")]
    ReadOnly,

    /// A leaf value sits where a branch is required.
    #[error("name '{0}' is bound to a value, not a context")]
    NotAContext(String),
}

/// A hierarchical name → value directory.
pub trait NamingContext: Send + Sync {
    fn lookup(&self, name: &str) -> Result<NamingValue, NamingError>;

    fn rebind(&self, name: &str, value: NamingValue) -> Result<(), NamingError>;

    fn create_subcontext(&self, name: &str) -> Result<(), NamingError>;

    /// Checks that the context is reachable. Only [`NamingError::NoContext`]
    /// means unavailable.
    fn probe(&self, prefix: &str) -> Result<(), NamingError> {
        self.lookup(prefix.trim_end_matches('/')).map(|_| ())
    }
}

/// A process-local naming context keyed by slash-delimited names.
#[derive(Debug)]
pub struct InMemoryNamingContext {
    entries: RwLock<BTreeMap<String, NamingValue>>,
    available: AtomicBool,
    read_only: AtomicBool,
    probes: AtomicUsize,
}

impl Default for InMemoryNamingContext {
    fn default() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
            read_only: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
        }
    }
}

impl InMemoryNamingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` at `name`, creating parent branches without checks.
    pub fn with_binding(self, name: &str, value: NamingValue) -> Self {
        {
            let mut entries = self.entries.write();
            let mut branch = String::new();
            for segment in name.split('/').take(name.split('/').count().saturating_sub(1)) {
                if !branch.is_empty() {
                    branch.push('/');
                }
                branch.push_str(segment);
                entries.entry(branch.clone()).or_insert(NamingValue::Context);
            }
            entries.insert(name.to_string(), value);
        }
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of availability probes served so far.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), NamingError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(NamingError::NoContext)
        }
    }
}

impl NamingContext for InMemoryNamingContext {
    fn lookup(&self, name: &str) -> Result<NamingValue, NamingError> {
        self.check_available()?;
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| NamingError::NotFound(name.to_string()))
    }

    fn rebind(&self, name: &str, value: NamingValue) -> Result<(), NamingError> {
        self.check_available()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(NamingError::ReadOnly);
        }
        let mut entries = self.entries.write();
        if let Some(idx) = name.rfind('/') {
            let parent = &name[..idx];
            match entries.get(parent) {
                Some(NamingValue::Context) => {}
                Some(_) => return Err(NamingError::NotAContext(parent.to_string())),
                None => return Err(NamingError::NotFound(parent.to_string())),
            }
        }
        entries.insert(name.to_string(), value);
        Ok(())
    }

    fn create_subcontext(&self, name: &str) -> Result<(), NamingError> {
        self.check_available()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(NamingError::ReadOnly);
        }
        let mut entries = self.entries.write();
        match entries.get(name) {
            Some(NamingValue::Context) => Ok(()),
            Some(_) => Err(NamingError::NotAContext(name.to_string())),
            None => {
                entries.insert(name.to_string(), NamingValue::Context);
                Ok(())
            }
        }
    }

    fn probe(&self, prefix: &str) -> Result<(), NamingError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.lookup(prefix.trim_end_matches('/')).map(|_| ())
    }
}

/// Reads and writes values in a naming context.
///
/// Keys are looked up as `<prefix><key>` first and as the bare key second.
/// A bound string is tried as a content/object reference before it is
/// returned as-is.
pub struct NamingConnector {
    base: ConnectorBase,
    context: Option<Arc<dyn NamingContext>>,
    prefix: String,
    availability: Mutex<Option<bool>>,
}

impl NamingConnector {
    pub const KIND: &'static str = "naming";

    /// A connector without a context. It reports itself unavailable until a
    /// context is set.
    pub fn new(name: &str) -> Self {
        Self {
            base: ConnectorBase::new(name),
            context: None,
            prefix: DEFAULT_NAMING_PREFIX.to_string(),
            availability: Mutex::new(None),
        }
    }

    pub fn with_context(name: &str, context: Arc<dyn NamingContext>) -> Self {
        let mut connector = Self::new(name);
        connector.context = Some(context);
        connector
    }

    pub fn set_context(&mut self, context: Arc<dyn NamingContext>) {
        self.context = Some(context);
        self.reset_availability();
    }

    pub fn context_path_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_context_path_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// Returns the memoized availability, probing the context if unknown.
    pub fn is_available(&self) -> bool {
        let mut availability = self.availability.lock();
        if let Some(known) = *availability {
            return known;
        }
        let available = match self.context.as_ref() {
            None => {
                tracing::info!(connector = %self.name(), "No naming context configured, connector disabled");
                false
            }
            Some(context) => match context.probe(&self.prefix) {
                Ok(()) => {
                    tracing::debug!(connector = %self.name(), "Naming context is available");
                    true
                }
                Err(NamingError::NoContext) => {
                    tracing::info!(connector = %self.name(), "No naming context available, connector disabled");
                    false
                }
                Err(e) => {
                    tracing::info!(connector = %self.name(), "Naming context is available but the probe failed");
                    tracing::debug!(connector = %self.name(), error = %e, "Naming probe error");
                    true
                }
            },
        };
        *availability = Some(available);
        available
    }

    /// The memoized availability without probing.
    pub fn known_availability(&self) -> Option<bool> {
        *self.availability.lock()
    }

    /// Forgets the memoized availability; the next access probes again.
    pub fn reset_availability(&self) {
        *self.availability.lock() = None;
    }

    fn normalize(&self, key: &str, with_prefix: bool) -> String {
        if key.starts_with(&self.prefix) {
            return key.to_string();
        }
        let relative = normalize_relative(key);
        if with_prefix {
            format!("{}{relative}", self.prefix)
        } else {
            relative
        }
    }

    fn lookup(&self, key: &str) -> Option<NamingValue> {
        if !self.is_available() {
            return None;
        }
        let context = self.context.as_ref()?;
        let prefixed = self.normalize(key, true);
        match context.lookup(&prefixed) {
            Ok(value) => Some(value),
            Err(NamingError::NoContext) => {
                tracing::info!(connector = %self.name(), key = %key, "Naming context vanished during lookup");
                None
            }
            Err(e) => {
                tracing::debug!(key = %key, name = %prefixed, error = %e, "Cannot look up prefixed name");
                let bare = self.normalize(key, false);
                if bare == prefixed {
                    return None;
                }
                context.lookup(&bare).ok()
            }
        }
    }

    fn rebind(&self, key: &str, value: NamingValue) -> WriteStatus {
        if self.known_availability() == Some(false) {
            return WriteStatus::NotPossible;
        }
        let Some(context) = self.context.as_ref() else {
            return WriteStatus::NotPossible;
        };
        let name = self.normalize(key, true);
        tracing::debug!(connector = %self.name(), name = %name, "Rebinding naming value");
        let result = Self::create_parent_contexts(context.as_ref(), &name)
            .and_then(|()| context.rebind(&name, value));
        match result {
            Ok(()) => WriteStatus::Success,
            Err(e) => {
                tracing::info!(connector = %self.name(), key = %key, error = %e, "Cannot bind naming value");
                WriteStatus::NotPossible
            }
        }
    }

    fn create_parent_contexts(context: &dyn NamingContext, name: &str) -> Result<(), NamingError> {
        let segments: Vec<&str> = name.split('/').collect();
        let mut branch = String::new();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if !branch.is_empty() {
                branch.push('/');
            }
            branch.push_str(segment);
            match context.lookup(&branch) {
                Ok(NamingValue::Context) => {}
                Ok(_) => return Err(NamingError::NotAContext(branch)),
                Err(NamingError::NotFound(_)) => {
                    tracing::debug!(name = %branch, "Creating naming sub-context");
                    context.create_subcontext(&branch)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn type_mismatch(&self, key: &str, value: &NamingValue) {
        tracing::warn!(connector = %self.name(), key = %key, found = value.type_name(), "Wrong type bound for key");
    }
}

impl Connector for NamingConnector {
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
        match self.lookup(key)? {
            NamingValue::String(value) => Some(value),
            other => {
                self.type_mismatch(key, &other);
                None
            }
        }
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        match self.lookup(key)? {
            NamingValue::String(reference) => {
                let content = self.base.content_by_reference(&reference);
                if content.is_none() {
                    tracing::warn!(connector = %self.name(), key = %key, "Bound string does not reference any content");
                }
                content
            }
            NamingValue::Bytes(bytes) => Some(bytes),
            other => {
                self.type_mismatch(key, &other);
                None
            }
        }
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        match self.lookup(key)? {
            NamingValue::String(reference) => self
                .base
                .object_by_reference(&reference)
                .or_else(|| Some(settings_object(reference))),
            NamingValue::Bytes(bytes) => Some(settings_object(bytes)),
            NamingValue::Object(object) => Some(object),
            NamingValue::Context => {
                self.type_mismatch(key, &NamingValue::Context);
                None
            }
        }
    }

    fn set_string(&self, key: &str, value: &str) -> WriteStatus {
        self.rebind(key, NamingValue::String(value.to_string()))
    }

    fn set_content(&self, key: &str, value: &[u8]) -> WriteStatus {
        self.rebind(key, NamingValue::Bytes(value.to_vec()))
    }

    fn set_object(&self, key: &str, value: &SettingsObject) -> WriteStatus {
        self.rebind(key, NamingValue::Object(Arc::clone(value)))
    }
}
