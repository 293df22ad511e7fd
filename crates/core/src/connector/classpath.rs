//! Bundled-resource connector.

use std::sync::Arc;

use crate::content::{ClasspathContentResolver, ContentResolver, UnionContentResolver};
use crate::object::SettingsObject;

use super::{Connector, ConnectorBase};

/// Reads bundled resources by key. Read only.
pub struct ClasspathConnector {
    base: ConnectorBase,
    resources: Arc<ClasspathContentResolver>,
    sources: Arc<UnionContentResolver>,
}

impl ClasspathConnector {
    pub const KIND: &'static str = "classpath";

    pub fn new(name: &str) -> Self {
        Self::with_resources(name, ClasspathContentResolver::new())
    }

    pub fn with_resources(name: &str, resources: ClasspathContentResolver) -> Self {
        let resources = Arc::new(resources);
        let sources = Arc::new(UnionContentResolver::from_resolvers(vec![
            resources.clone() as Arc<dyn ContentResolver>,
        ]));
        Self {
            base: ConnectorBase::new(name),
            resources,
            sources,
        }
    }
}

impl Connector for ClasspathConnector {
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
        let bytes = self.resources.get_content(key)?;
        match String::from_utf8(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(connector = %self.name(), key = %key, error = %e, "Resource is not UTF-8 text");
                None
            }
        }
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        self.resources.get_content(key)
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        self.object_resolver()?.get_object(key, self.sources.as_ref())
    }

    fn set_content_resolver(&mut self, resolver: Arc<dyn ContentResolver>) {
        self.sources = Arc::new(UnionContentResolver::from_resolvers(vec![
            self.resources.clone() as Arc<dyn ContentResolver>,
            Arc::clone(&resolver),
        ]));
        self.base_mut().content_resolver = Some(resolver);
    }
}
