//! Applies a configuration document to a settings repository.
//!
//! Responsibilities:
//! - Build content resolvers, object resolvers and connectors through the
//!   [`Registry`], wire their references and decorations, and call `init`
//!   exactly once per connector.
//! - Attach connectors, mappings and additivity to the root and named
//!   settings nodes, replacing whatever those nodes held before.
//! - Reset every node the document does not configure, so nothing from an
//!   earlier document survives a reconfiguration.
//! - Report every entry that had to be left out.
//!
//! Does NOT handle:
//! - Finding or reading the document (see `discovery` and `document`).
//!
//! Invariants:
//! - References between entries of the same list resolve only against
//!   entries declared earlier, so reference cycles cannot be built.
//! - A failing entry is logged at `error!` and omitted; entries that refer to
//!   it are omitted too. Nothing else is affected.
//! - A node's connectors, mapping and additivity are swapped together.

use std::collections::HashMap;
use std::sync::Arc;

use settings_core::content::{FilteredContentResolver, ReadOnlyContentResolver};
use settings_core::object::{FilteredObjectResolver, ReadOnlyObjectResolver};
use settings_core::{
    Connector, ContentResolver, DecoratedConnector, Filter, ObjectResolver, PatternFilter,
    Settings, SettingsRepository,
};
use tracing::{debug, error, info};

use crate::document::{ConfigDocument, ConnectorEntry, FilterEntry, ResolverEntry, ScopeEntry};
use crate::error::ConfigError;
use crate::params::Params;
use crate::registry::{FactoryContext, Registry};

/// An entry that could not be built or applied.
#[derive(Debug)]
pub struct OmittedEntry {
    pub category: &'static str,
    pub name: String,
    pub error: ConfigError,
}

/// Outcome of applying a document.
#[derive(Debug, Default)]
pub struct ConfigReport {
    /// Names of the connectors that were built, in document order.
    pub connectors: Vec<String>,
    /// Settings nodes that were configured, the root as `root`.
    pub scopes: Vec<String>,
    pub omitted: Vec<OmittedEntry>,
}

impl ConfigReport {
    /// True if every entry of the document was applied.
    pub fn is_complete(&self) -> bool {
        self.omitted.is_empty()
    }

    fn omit(&mut self, category: &'static str, name: &str, err: ConfigError) {
        error!(category, name = %name, error = %err, "Configuration entry omitted");
        self.omitted.push(OmittedEntry {
            category,
            name: name.to_string(),
            error: err,
        });
    }
}

/// Everything built from a document, before it touches a repository.
struct Plan {
    connectors: HashMap<String, Arc<dyn Connector>>,
    mappings: HashMap<String, HashMap<String, String>>,
    report: ConfigReport,
}

/// Builds and applies configuration documents.
#[derive(Debug, Clone, Default)]
pub struct Configurator {
    registry: Registry,
}

impl Configurator {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Applies `doc` to `repository`, leaving out failing entries.
    pub fn configure(&self, doc: &ConfigDocument, repository: &SettingsRepository) -> ConfigReport {
        let plan = self.plan(doc);
        self.apply(doc, plan, repository)
    }

    /// Applies `doc` only if every entry builds. On failure the repository is
    /// left untouched and the first error is returned.
    pub fn configure_strict(
        &self,
        doc: &ConfigDocument,
        repository: &SettingsRepository,
    ) -> Result<ConfigReport, ConfigError> {
        let mut plan = self.plan(doc);
        if !plan.report.omitted.is_empty() {
            return Err(plan.report.omitted.remove(0).error);
        }
        let mut report = self.apply(doc, plan, repository);
        if report.omitted.is_empty() {
            Ok(report)
        } else {
            Err(report.omitted.remove(0).error)
        }
    }

    fn plan(&self, doc: &ConfigDocument) -> Plan {
        let mut report = ConfigReport::default();

        let mut content_resolvers: HashMap<String, Arc<dyn ContentResolver>> = HashMap::new();
        for entry in &doc.content_resolvers {
            match self.build_content_resolver(entry, &content_resolvers) {
                Ok(resolver) => {
                    content_resolvers.insert(entry.name.clone(), resolver);
                }
                Err(err) => report.omit("content resolver", &entry.name, err),
            }
        }

        let mut object_resolvers: HashMap<String, Arc<dyn ObjectResolver>> = HashMap::new();
        for entry in &doc.object_resolvers {
            match self.build_object_resolver(entry, &object_resolvers) {
                Ok(resolver) => {
                    object_resolvers.insert(entry.name.clone(), resolver);
                }
                Err(err) => report.omit("object resolver", &entry.name, err),
            }
        }

        let mut connectors: HashMap<String, Arc<dyn Connector>> = HashMap::new();
        for entry in &doc.connectors {
            if connectors.contains_key(&entry.name) {
                let err = settings_core::SettingsError::DuplicateConnector(entry.name.clone());
                report.omit("connector", &entry.name, err.into());
                continue;
            }
            match self.build_connector(entry, &content_resolvers, &object_resolvers, &connectors) {
                Ok(connector) => {
                    debug!(connector = %entry.name, kind = connector.kind(), "Connector built");
                    report.connectors.push(entry.name.clone());
                    connectors.insert(entry.name.clone(), connector);
                }
                Err(err) => report.omit("connector", &entry.name, err),
            }
        }

        let mappings = doc
            .mappings
            .iter()
            .map(|m| {
                let entries = m.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                (m.name.clone(), entries)
            })
            .collect();

        Plan {
            connectors,
            mappings,
            report,
        }
    }

    fn apply(&self, doc: &ConfigDocument, plan: Plan, repository: &SettingsRepository) -> ConfigReport {
        let Plan {
            connectors,
            mappings,
            mut report,
        } = plan;

        let root = doc.effective_root();
        let scopes = std::iter::once((settings_core::ROOT_SETTINGS_NAME, &root))
            .chain(doc.settings.iter().map(|scope| (scope.name.as_str(), scope)));

        for (name, scope) in scopes {
            if let Err(err) = apply_scope(name, scope, &connectors, &mappings, repository, &mut report) {
                report.omit("settings", name, err);
                continue;
            }
            report.scopes.push(name.to_string());
        }

        let stale = std::iter::once(repository.root_settings())
            .chain(repository.current_settings())
            .filter(|settings| !report.scopes.iter().any(|name| name == settings.name()));
        for settings in stale {
            debug!(settings = %settings.name(), "Settings node not in document; reset");
            settings.reset();
        }

        info!(
            connectors = report.connectors.len(),
            scopes = report.scopes.len(),
            omitted = report.omitted.len(),
            "Configuration applied"
        );
        report
    }

    fn build_content_resolver(
        &self,
        entry: &ResolverEntry,
        built: &HashMap<String, Arc<dyn ContentResolver>>,
    ) -> Result<Arc<dyn ContentResolver>, ConfigError> {
        let params = Params::new(&entry.name, entry.params.clone());
        let ctx = self.context(&entry.name, &params, entry.cached);
        let resolver = self.registry.build_content_resolver(&entry.type_id, &ctx)?;
        for reference in &entry.resolvers {
            let delegate = lookup("content resolver", &entry.name, reference, built)?;
            resolver.add_content_resolver(delegate)?;
        }

        let mut resolver = resolver;
        if let Some(filter) = &entry.filter {
            resolver = Arc::new(FilteredContentResolver::new(resolver, build_filter(filter)?));
        }
        if entry.read_only {
            resolver = Arc::new(ReadOnlyContentResolver::new(resolver));
        }
        Ok(resolver)
    }

    fn build_object_resolver(
        &self,
        entry: &ResolverEntry,
        built: &HashMap<String, Arc<dyn ObjectResolver>>,
    ) -> Result<Arc<dyn ObjectResolver>, ConfigError> {
        let params = Params::new(&entry.name, entry.params.clone());
        let ctx = self.context(&entry.name, &params, entry.cached);
        let resolver = self.registry.build_object_resolver(&entry.type_id, &ctx)?;
        for reference in &entry.resolvers {
            let delegate = lookup("object resolver", &entry.name, reference, built)?;
            resolver.add_object_resolver(delegate)?;
        }

        let mut resolver = resolver;
        if let Some(filter) = &entry.filter {
            resolver = Arc::new(FilteredObjectResolver::new(resolver, build_filter(filter)?));
        }
        if entry.read_only {
            resolver = Arc::new(ReadOnlyObjectResolver::new(resolver));
        }
        Ok(resolver)
    }

    fn build_connector(
        &self,
        entry: &ConnectorEntry,
        content_resolvers: &HashMap<String, Arc<dyn ContentResolver>>,
        object_resolvers: &HashMap<String, Arc<dyn ObjectResolver>>,
        built: &HashMap<String, Arc<dyn Connector>>,
    ) -> Result<Arc<dyn Connector>, ConfigError> {
        let nested = entry
            .connectors
            .iter()
            .map(|reference| lookup("connector", &entry.name, reference, built))
            .collect::<Result<Vec<_>, _>>()?;
        let params = Params::new(&entry.name, entry.params.clone()).with_connectors(nested.clone());
        let ctx = self.context(&entry.name, &params, None);
        let mut connector = self.registry.build_connector(&entry.type_id, &ctx)?;

        if let Some(reference) = &entry.content_resolver {
            let resolver = lookup("content resolver", &entry.name, reference, content_resolvers)?;
            connector.set_content_resolver(resolver);
        }
        if let Some(reference) = &entry.object_resolver {
            let resolver = lookup("object resolver", &entry.name, reference, object_resolvers)?;
            connector.set_object_resolver(resolver);
        }
        for nested in nested {
            connector.add_connector(nested);
        }

        connector.init()?;

        // Content written through a connector must not leave a stale object
        // in its resolver's cache.
        let notify = entry.notify_content_changed || entry.object_resolver.is_some();
        let decorate = entry.read_only || entry.filter.is_some() || entry.cached || notify;
        if !decorate {
            return Ok(Arc::from(connector));
        }

        let mut decorated = DecoratedConnector::wrap(connector);
        if entry.read_only {
            decorated = decorated.read_only();
        }
        if let Some(filter) = &entry.filter {
            decorated = decorated.filtered(build_filter(filter)?);
        }
        if entry.cached {
            decorated = decorated.cached();
        }
        if notify {
            decorated = decorated.notify_changes();
        }
        Ok(Arc::new(decorated))
    }

    fn context<'a>(
        &'a self,
        name: &'a str,
        params: &'a Params,
        cached: Option<bool>,
    ) -> FactoryContext<'a> {
        FactoryContext {
            name,
            params,
            cached,
            registry: &self.registry,
        }
    }
}

fn apply_scope(
    name: &str,
    scope: &ScopeEntry,
    connectors: &HashMap<String, Arc<dyn Connector>>,
    mappings: &HashMap<String, HashMap<String, String>>,
    repository: &SettingsRepository,
    report: &mut ConfigReport,
) -> Result<(), ConfigError> {
    let mapping = match &scope.mapping {
        Some(reference) => lookup("mapping", name, reference, mappings)?,
        None => HashMap::new(),
    };

    let mut chain = Vec::with_capacity(scope.connectors.len());
    for reference in &scope.connectors {
        match lookup("connector", name, reference, connectors) {
            Ok(connector) => chain.push(connector),
            Err(err) => report.omit("connector reference", reference, err),
        }
    }

    repository
        .settings(name)
        .configure(chain, mapping, scope.additivity.unwrap_or(true))?;
    debug!(settings = %name, "Settings node configured");
    Ok(())
}

fn lookup<T: Clone>(
    category: &'static str,
    owner: &str,
    reference: &str,
    built: &HashMap<String, T>,
) -> Result<T, ConfigError> {
    built
        .get(reference)
        .cloned()
        .ok_or_else(|| ConfigError::MissingReference {
            category,
            name: owner.to_string(),
            reference: reference.to_string(),
        })
}

fn build_filter(entry: &FilterEntry) -> Result<Arc<dyn Filter>, ConfigError> {
    let filter = PatternFilter::from_patterns(&entry.include, &entry.exclude)?;
    Ok(Arc::new(filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use settings_core::connector::SystemProperties;

    fn configurator() -> (Configurator, Arc<SystemProperties>) {
        let properties = Arc::new(SystemProperties::new());
        let registry = Registry::with_defaults().with_system_properties(Arc::clone(&properties));
        (Configurator::new(registry), properties)
    }

    fn names(settings: &impl Settings) -> Vec<String> {
        settings
            .connectors()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    #[test]
    fn test_failing_entry_is_omitted_and_rest_applies() {
        let (configurator, properties) = configurator();
        properties.set("app/name", "demo");
        let doc = ConfigDocument::from_json(
            r#"{"connectors": [
                {"name": "broken", "type": "no-such-type"},
                {"name": "props", "type": "system-property", "readOnly": true}
            ]}"#,
        )
        .unwrap();

        let repo = SettingsRepository::new();
        let report = configurator.configure(&doc, &repo);
        assert_eq!(report.connectors, vec!["props"]);
        assert_eq!(report.omitted.len(), 2);
        assert_eq!(report.omitted[0].name, "broken");
        assert_eq!(report.omitted[1].category, "connector reference");

        let root = repo.root_settings();
        assert_eq!(names(&root), vec!["props"]);
        assert_eq!(root.get_string("app/name"), Some("demo".to_string()));
        assert!(root.set_string("app/name", "x").is_err());
    }

    #[test]
    fn test_strict_leaves_repository_untouched() {
        let (configurator, _) = configurator();
        let repo = SettingsRepository::new();
        let doc = ConfigDocument::from_json(
            r#"{"connectors": [{"name": "fs", "type": "fs", "objectResolver": "ghost"}]}"#,
        )
        .unwrap();

        let err = configurator.configure_strict(&doc, &repo).unwrap_err();
        assert!(matches!(err, ConfigError::MissingReference { reference, .. } if reference == "ghost"));
        assert_eq!(repo.connector_count(), 0);
    }

    #[test]
    fn test_references_resolve_only_backwards() {
        let (configurator, _) = configurator();
        let doc = ConfigDocument::from_json(
            r#"{"objectResolvers": [
                {"name": "all", "type": "union", "resolvers": ["json"]},
                {"name": "json", "type": "json"}
            ]}"#,
        )
        .unwrap();
        let report = configurator.configure(&doc, &SettingsRepository::new());
        assert_eq!(report.omitted.len(), 1);
        assert_eq!(report.omitted[0].name, "all");
    }

    #[test]
    fn test_leaf_resolver_rejects_delegates() {
        let (configurator, _) = configurator();
        let doc = ConfigDocument::from_json(
            r#"{"contentResolvers": [
                {"name": "files", "type": "fs"},
                {"name": "more", "type": "fs", "resolvers": ["files"]}
            ]}"#,
        )
        .unwrap();
        let report = configurator.configure(&doc, &SettingsRepository::new());
        assert_eq!(report.omitted.len(), 1);
        assert!(matches!(
            report.omitted[0].error,
            ConfigError::Settings(settings_core::SettingsError::NotComposable(_))
        ));
    }

    #[test]
    fn test_scopes_get_mapping_and_additivity() {
        let (configurator, properties) = configurator();
        properties.set("com/acme/db", "jdbc:acme");
        let doc = ConfigDocument::from_json(
            r#"{
                "connectors": [{"name": "props", "type": "system-property"}],
                "mappings": [{"name": "aliases", "entries": {"db": "com/acme/db"}}],
                "root": {"connectors": ["props"]},
                "settings": [
                    {"name": "com.acme", "mapping": "aliases"},
                    {"name": "com.isolated", "additivity": false}
                ]
            }"#,
        )
        .unwrap();

        let repo = SettingsRepository::new();
        let report = configurator.configure(&doc, &repo);
        assert!(report.is_complete());
        assert_eq!(report.scopes, vec!["root", "com.acme", "com.isolated"]);

        assert_eq!(
            repo.settings("com.acme.app").get_string("db"),
            Some("jdbc:acme".to_string())
        );
        assert_eq!(repo.root_settings().get_string("db"), None);
        assert!(repo.settings("com.isolated").connectors().is_empty());
    }

    #[test]
    fn test_reconfiguring_replaces_previous_chain() {
        let (configurator, _) = configurator();
        let repo = SettingsRepository::new();
        let first = ConfigDocument::from_json(
            r#"{"connectors": [{"name": "a", "type": "environment"}, {"name": "b", "type": "system-property"}]}"#,
        )
        .unwrap();
        let second =
            ConfigDocument::from_json(r#"{"connectors": [{"name": "c", "type": "environment"}]}"#)
                .unwrap();

        configurator.configure(&first, &repo);
        configurator.configure(&second, &repo);
        assert_eq!(names(&repo.root_settings()), vec!["c"]);
    }

    #[test]
    fn test_scope_missing_from_new_document_is_reset() {
        let (configurator, _) = configurator();
        let repo = SettingsRepository::new();
        let first = ConfigDocument::from_json(
            r#"{
                "connectors": [
                    {"name": "env", "type": "environment"},
                    {"name": "sp", "type": "system-property"}
                ],
                "mappings": [{"name": "aliases", "entries": {"db": "app/db"}}],
                "root": {"connectors": ["sp"]},
                "settings": [{"name": "app", "connectors": ["env"], "mapping": "aliases", "additivity": false}]
            }"#,
        )
        .unwrap();
        let second = ConfigDocument::from_json(
            r#"{"connectors": [{"name": "sp", "type": "system-property"}]}"#,
        )
        .unwrap();

        configurator.configure(&first, &repo);
        let app = repo.settings("app");
        assert_eq!(names(&app), vec!["env"]);

        let report = configurator.configure(&second, &repo);
        assert_eq!(report.scopes, vec!["root"]);
        assert_eq!(names(&app), vec!["sp"]);
        assert!(app.additivity());
        assert!(app.own().mapping().is_empty());
        assert_eq!(app.mapped_key("db"), "db");
    }

    #[test]
    fn test_duplicate_connector_name_is_omitted() {
        let (configurator, _) = configurator();
        let doc = ConfigDocument::from_json(
            r#"{
                "connectors": [{"name": "a", "type": "environment"}, {"name": "a", "type": "fs"}],
                "root": {"connectors": ["a"]}
            }"#,
        )
        .unwrap();
        let repo = SettingsRepository::new();
        let report = configurator.configure(&doc, &repo);
        assert_eq!(report.omitted.len(), 1);
        assert_eq!(repo.root_settings().connectors()[0].kind(), "environment");
    }
}
