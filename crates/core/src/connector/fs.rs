//! Filesystem connector.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::content::{ContentResolver, FsContentResolver, UnionContentResolver};
use crate::error::WriteStatus;
use crate::object::SettingsObject;

use super::{Connector, ConnectorBase};

/// Treats keys as file paths below a root folder.
///
/// Strings are file contents decoded as UTF-8. Objects are resolved from the
/// connector's own files first, then from a configured custom content
/// resolver.
pub struct FsConnector {
    base: ConnectorBase,
    fs: Arc<FsContentResolver>,
    sources: Arc<UnionContentResolver>,
}

impl FsConnector {
    pub const KIND: &'static str = "fs";

    pub fn new(name: &str) -> Self {
        Self::with_root(name, ".")
    }

    pub fn with_root(name: &str, root: impl Into<PathBuf>) -> Self {
        let fs = Arc::new(FsContentResolver::new(root));
        let mut connector = Self {
            base: ConnectorBase::new(name),
            sources: Arc::new(UnionContentResolver::new()),
            fs,
        };
        connector.rebuild_sources();
        connector
    }

    pub fn root_folder(&self) -> &Path {
        self.fs.root()
    }

    pub fn set_root_folder(&mut self, root: impl Into<PathBuf>) {
        self.fs = Arc::new(FsContentResolver::new(root));
        self.rebuild_sources();
    }

    fn rebuild_sources(&mut self) {
        let mut delegates = vec![self.fs.clone() as Arc<dyn ContentResolver>];
        if let Some(custom) = self.base.content_resolver() {
            delegates.push(Arc::clone(custom));
        }
        self.sources = Arc::new(UnionContentResolver::from_resolvers(delegates));
    }
}

impl Connector for FsConnector {
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
        let bytes = self.fs.get_content(key)?;
        match String::from_utf8(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(connector = %self.name(), key = %key, error = %e, "File content is not UTF-8 text");
                None
            }
        }
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        self.fs.get_content(key)
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        self.object_resolver()?.get_object(key, self.sources.as_ref())
    }

    fn set_string(&self, key: &str, value: &str) -> WriteStatus {
        self.fs.set_content(key, value.as_bytes())
    }

    fn set_content(&self, key: &str, value: &[u8]) -> WriteStatus {
        self.fs.set_content(key, value)
    }

    fn set_object(&self, key: &str, value: &SettingsObject) -> WriteStatus {
        match self.object_resolver() {
            Some(resolver) => resolver.set_object(key, self.sources.as_ref(), value),
            None => WriteStatus::NotPossible,
        }
    }

    fn set_content_resolver(&mut self, resolver: Arc<dyn ContentResolver>) {
        self.base_mut().content_resolver = Some(resolver);
        self.rebuild_sources();
    }
}
