//! Type-id to factory registry for configurable components.
//!
//! Responsibilities:
//! - Map the `type` of a document entry to a factory for connectors,
//!   content resolvers and object resolvers.
//! - Hold the shared process resources factories draw on (bundled
//!   resources, system properties, named naming contexts).
//!
//! Does NOT handle:
//! - Decoration, nested references or `init` (see `configurator`).
//!
//! Invariants:
//! - Registering an id twice replaces the earlier factory.
//! - Factories only read parameters; they never touch a repository.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use settings_core::Connector;
use settings_core::connector::{
    ClasspathConnector, EnvironmentConnector, FsConnector, NamingConnector, NamingContext,
    PreferencesConnector, PreferencesStore, PropertyFileConnector, SystemProperties,
    SystemPropertyConnector,
};
use settings_core::content::{
    ClasspathContentResolver, ContentResolver, FsContentResolver, UnionContentResolver,
};
use settings_core::object::{
    JsonObjectResolver, ObjectResolver, PropertiesObjectResolver, UnionObjectResolver,
};

use crate::error::ConfigError;
use crate::params::Params;

/// Everything a factory gets to build one entry.
pub struct FactoryContext<'a> {
    pub name: &'a str,
    pub params: &'a Params,
    /// Default caching flag of an object resolver entry.
    pub cached: Option<bool>,
    pub registry: &'a Registry,
}

pub type ConnectorFactory =
    Arc<dyn Fn(&FactoryContext<'_>) -> Result<Box<dyn Connector>, ConfigError> + Send + Sync>;
pub type ContentResolverFactory = Arc<
    dyn Fn(&FactoryContext<'_>) -> Result<Arc<dyn ContentResolver>, ConfigError> + Send + Sync,
>;
pub type ObjectResolverFactory = Arc<
    dyn Fn(&FactoryContext<'_>) -> Result<Arc<dyn ObjectResolver>, ConfigError> + Send + Sync,
>;

/// Component factories and the resources they share.
#[derive(Clone)]
pub struct Registry {
    connectors: HashMap<String, ConnectorFactory>,
    content_resolvers: HashMap<String, ContentResolverFactory>,
    object_resolvers: HashMap<String, ObjectResolverFactory>,
    classpath: Arc<ClasspathContentResolver>,
    system_properties: Arc<SystemProperties>,
    naming_contexts: HashMap<String, Arc<dyn NamingContext>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Registry {
    /// A registry without any factories.
    pub fn empty() -> Self {
        Self {
            connectors: HashMap::new(),
            content_resolvers: HashMap::new(),
            object_resolvers: HashMap::new(),
            classpath: Arc::new(ClasspathContentResolver::new()),
            system_properties: SystemProperties::global(),
            naming_contexts: HashMap::new(),
        }
    }

    /// A registry with every built-in component registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_default_connectors();
        registry.register_default_content_resolvers();
        registry.register_default_object_resolvers();
        registry
    }

    pub fn with_classpath(mut self, classpath: ClasspathContentResolver) -> Self {
        self.classpath = Arc::new(classpath);
        self
    }

    pub fn with_system_properties(mut self, properties: Arc<SystemProperties>) -> Self {
        self.system_properties = properties;
        self
    }

    /// Makes `context` available to `naming` connectors with `context=<name>`.
    pub fn with_naming_context(mut self, name: &str, context: Arc<dyn NamingContext>) -> Self {
        self.naming_contexts.insert(name.to_string(), context);
        self
    }

    pub fn classpath(&self) -> &Arc<ClasspathContentResolver> {
        &self.classpath
    }

    pub fn system_properties(&self) -> &Arc<SystemProperties> {
        &self.system_properties
    }

    pub fn naming_context(&self, name: &str) -> Option<Arc<dyn NamingContext>> {
        self.naming_contexts.get(name).cloned()
    }

    pub fn register_connector<F>(&mut self, type_id: &str, factory: F)
    where
        F: Fn(&FactoryContext<'_>) -> Result<Box<dyn Connector>, ConfigError> + Send + Sync + 'static,
    {
        self.connectors.insert(type_id.to_string(), Arc::new(factory));
    }

    pub fn register_content_resolver<F>(&mut self, type_id: &str, factory: F)
    where
        F: Fn(&FactoryContext<'_>) -> Result<Arc<dyn ContentResolver>, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        self.content_resolvers
            .insert(type_id.to_string(), Arc::new(factory));
    }

    pub fn register_object_resolver<F>(&mut self, type_id: &str, factory: F)
    where
        F: Fn(&FactoryContext<'_>) -> Result<Arc<dyn ObjectResolver>, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        self.object_resolvers
            .insert(type_id.to_string(), Arc::new(factory));
    }

    pub fn build_connector(
        &self,
        type_id: &str,
        ctx: &FactoryContext<'_>,
    ) -> Result<Box<dyn Connector>, ConfigError> {
        let factory = self
            .connectors
            .get(type_id)
            .ok_or_else(|| unknown("connector", type_id))?;
        factory(ctx)
    }

    pub fn build_content_resolver(
        &self,
        type_id: &str,
        ctx: &FactoryContext<'_>,
    ) -> Result<Arc<dyn ContentResolver>, ConfigError> {
        let factory = self
            .content_resolvers
            .get(type_id)
            .ok_or_else(|| unknown("content resolver", type_id))?;
        factory(ctx)
    }

    pub fn build_object_resolver(
        &self,
        type_id: &str,
        ctx: &FactoryContext<'_>,
    ) -> Result<Arc<dyn ObjectResolver>, ConfigError> {
        let factory = self
            .object_resolvers
            .get(type_id)
            .ok_or_else(|| unknown("object resolver", type_id))?;
        factory(ctx)
    }

    /// Registered connector type ids, sorted.
    pub fn connector_types(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.connectors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    fn register_default_connectors(&mut self) {
        self.register_connector(SystemPropertyConnector::KIND, |ctx| {
            Ok(Box::new(SystemPropertyConnector::with_properties(
                ctx.name,
                Arc::clone(ctx.registry.system_properties()),
            )))
        });

        self.register_connector(EnvironmentConnector::KIND, |ctx| {
            Ok(Box::new(EnvironmentConnector::new(ctx.name)))
        });

        self.register_connector(FsConnector::KIND, |ctx| {
            let connector = match ctx.params.get("rootFolder")? {
                Some(root) => FsConnector::with_root(ctx.name, PathBuf::from(root)),
                None => FsConnector::new(ctx.name),
            };
            Ok(Box::new(connector))
        });

        self.register_connector(ClasspathConnector::KIND, |ctx| {
            let resources = (**ctx.registry.classpath()).clone();
            Ok(Box::new(ClasspathConnector::with_resources(ctx.name, resources)))
        });

        self.register_connector(PropertyFileConnector::KIND, |ctx| {
            let mut connector = PropertyFileConnector::new(ctx.name)
                .with_classpath(Arc::clone(ctx.registry.classpath()));
            if let Some(resolve) = ctx.params.bool("resolveRelativePaths")? {
                connector.set_resolve_relative_paths(resolve);
            }
            if let Some(content) = ctx.params.get("propertyFromContent")? {
                connector.set_property_from_content(content.as_bytes());
            }
            if let Some(path) = ctx.params.get("propertyFromPath")? {
                connector.set_property_from_path(&path)?;
            }
            Ok(Box::new(connector))
        });

        self.register_connector(PreferencesConnector::KIND, |ctx| {
            let store = |param: &str| -> Result<Arc<PreferencesStore>, ConfigError> {
                Ok(Arc::new(match ctx.params.get(param)? {
                    Some(path) => PreferencesStore::open(path),
                    None => PreferencesStore::in_memory(),
                }))
            };
            Ok(Box::new(PreferencesConnector::with_stores(
                ctx.name,
                store("userPath")?,
                store("systemPath")?,
            )))
        });

        self.register_connector(NamingConnector::KIND, |ctx| {
            let mut connector = match ctx.params.get("context")? {
                Some(context) => {
                    let bound = ctx.registry.naming_context(&context).ok_or_else(|| {
                        ConfigError::InvalidParameter {
                            name: ctx.name.to_string(),
                            param: "context".to_string(),
                            message: format!("no naming context registered as '{context}'"),
                        }
                    })?;
                    NamingConnector::with_context(ctx.name, bound)
                }
                None => NamingConnector::new(ctx.name),
            };
            if let Some(prefix) = ctx.params.get("contextPathPrefix")? {
                connector.set_context_path_prefix(prefix);
            }
            Ok(Box::new(connector))
        });
    }

    fn register_default_content_resolvers(&mut self) {
        self.register_content_resolver("fs", |ctx| {
            let resolver = match ctx.params.get("rootFolder")? {
                Some(root) => FsContentResolver::new(root),
                None => FsContentResolver::default(),
            };
            Ok(Arc::new(resolver))
        });
        self.register_content_resolver("classpath", |ctx| {
            Ok(Arc::clone(ctx.registry.classpath()) as Arc<dyn ContentResolver>)
        });
        self.register_content_resolver("union", |_| Ok(Arc::new(UnionContentResolver::new())));
    }

    fn register_default_object_resolvers(&mut self) {
        self.register_object_resolver("json", |ctx| {
            let mut resolver = JsonObjectResolver::json();
            if let Some(cached) = ctx.cached {
                resolver = resolver.with_cached(cached);
            }
            if let Some(suffix) = ctx.params.get("propertySuffix")? {
                resolver = resolver.with_property_suffix(suffix);
            }
            Ok(Arc::new(resolver))
        });
        self.register_object_resolver("properties", |ctx| {
            let mut resolver = PropertiesObjectResolver::properties();
            if let Some(cached) = ctx.cached {
                resolver = resolver.with_cached(cached);
            }
            if let Some(suffix) = ctx.params.get("propertySuffix")? {
                resolver = resolver.with_property_suffix(suffix);
            }
            Ok(Arc::new(resolver))
        });
        self.register_object_resolver("union", |_| Ok(Arc::new(UnionObjectResolver::new())));
    }
}

fn unknown(category: &'static str, type_id: &str) -> ConfigError {
    ConfigError::UnknownType {
        category,
        type_id: type_id.to_string(),
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("connectors", &self.connector_types())
            .field("content_resolvers", &self.content_resolvers.len())
            .field("object_resolvers", &self.object_resolvers.len())
            .field("naming_contexts", &self.naming_contexts.len())
            .finish()
    }
}
