//! Property file connector.
//!
//! Responsibilities:
//! - Load a properties document from a `file:` or `classpath:` path, or from
//!   raw content, and serve its values as strings.
//! - Optionally rewrite `file:./relative` values so they point next to the
//!   properties file itself.
//!
//! Does NOT handle:
//! - Reloading when the file changes. The document is read once.
//! - Writes. The connector is read only.

use std::path::Path;
use std::sync::Arc;

use url::Url;

use crate::content::{
    CLASSPATH_PREFIX, ClasspathContentResolver, ContentResolver, FILE_PREFIX, FsContentResolver,
};
use crate::error::SettingsError;
use crate::key::normalize_relative;
use crate::object::SettingsObject;
use crate::properties::Properties;

use super::{Connector, ConnectorBase};

pub struct PropertyFileConnector {
    base: ConnectorBase,
    properties: Properties,
    classpath: Arc<ClasspathContentResolver>,
    folder_url: Option<Url>,
    resolve_relative_paths: bool,
}

impl PropertyFileConnector {
    pub const KIND: &'static str = "property-file";

    pub fn new(name: &str) -> Self {
        Self {
            base: ConnectorBase::new(name),
            properties: Properties::new(),
            classpath: Arc::new(ClasspathContentResolver::new()),
            folder_url: None,
            resolve_relative_paths: false,
        }
    }

    /// Uses `classpath` to load `classpath:` property paths.
    pub fn with_classpath(mut self, classpath: Arc<ClasspathContentResolver>) -> Self {
        self.classpath = classpath;
        self
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn set_properties(&mut self, properties: Properties) {
        self.properties = properties;
        self.apply_relative_paths();
    }

    pub fn set_property_from_content(&mut self, content: &[u8]) {
        self.set_properties(Properties::from_bytes(content));
    }

    /// Loads the document from a `file:` or `classpath:` path.
    pub fn set_property_from_path(&mut self, path: &str) -> Result<(), SettingsError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(self.init_error("the property path cannot be empty".to_string()));
        }

        let (content, folder_url) = if let Some(file) = path.strip_prefix(FILE_PREFIX) {
            let content = FsContentResolver::default().get_content(path);
            (content, Self::file_folder_url(file))
        } else if let Some(resource) = path.strip_prefix(CLASSPATH_PREFIX) {
            let content = self.classpath.get_content(path);
            (content, Self::classpath_folder_url(resource))
        } else {
            return Err(self.init_error(format!(
                "the property path must start with '{FILE_PREFIX}' or '{CLASSPATH_PREFIX}', got '{path}'"
            )));
        };

        let Some(content) = content else {
            return Err(self.init_error(format!("property file '{path}' not found")));
        };
        self.folder_url = folder_url;
        self.set_property_from_content(&content);
        tracing::debug!(connector = %self.name(), path = %path, entries = self.properties.len(), "Loaded property file");
        Ok(())
    }

    pub fn set_resolve_relative_paths(&mut self, resolve: bool) {
        self.resolve_relative_paths = resolve;
        self.apply_relative_paths();
    }

    fn init_error(&self, message: String) -> SettingsError {
        SettingsError::Init {
            name: self.name().to_string(),
            message,
        }
    }

    fn file_folder_url(file: &str) -> Option<Url> {
        let absolute = std::path::absolute(Path::new(file)).ok()?;
        Url::from_directory_path(absolute.parent()?).ok()
    }

    fn classpath_folder_url(resource: &str) -> Option<Url> {
        let resource = normalize_relative(resource);
        let folder = match resource.rfind('/') {
            Some(idx) => &resource[..=idx],
            None => "",
        };
        Url::parse(&format!("{CLASSPATH_PREFIX}/{folder}")).ok()
    }

    fn apply_relative_paths(&mut self) {
        if !self.resolve_relative_paths {
            return;
        }
        let Some(folder) = self.folder_url.as_ref() else {
            return;
        };
        let relative_prefix = format!("{FILE_PREFIX}.");
        let rewrites: Vec<(String, String)> = self
            .properties
            .iter()
            .filter(|(_, value)| value.starts_with(&relative_prefix))
            .filter_map(|(key, value)| {
                let joined = folder.join(&value[FILE_PREFIX.len()..]).ok()?;
                Some((key.to_string(), Self::url_to_reference(&joined)))
            })
            .collect();
        for (key, value) in rewrites {
            self.properties.set(key, value);
        }
    }

    fn url_to_reference(url: &Url) -> String {
        if url.scheme() == "file"
            && let Ok(path) = url.to_file_path()
        {
            return format!("{FILE_PREFIX}{}", path.display());
        }
        url.to_string()
    }
}

impl Connector for PropertyFileConnector {
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
        self.properties.get(key).map(str::to_string)
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        let reference = self.get_string(key)?;
        self.base.content_by_reference(&reference)
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        let reference = self.get_string(key)?;
        self.base.object_by_reference(&reference)
    }
}
