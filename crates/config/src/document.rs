//! The declarative configuration document.
//!
//! Responsibilities:
//! - Define the serde model of `settings.json`.
//! - Read documents from strings and files.
//!
//! Does NOT handle:
//! - Instantiating anything described by the document (see `configurator`).
//! - `${env.NAME}` substitution (see `params`; it runs at build time).
//!
//! Invariants:
//! - Field names are camelCase on the wire.
//! - Entries reference each other by name; order inside a list is priority.
//! - Every collection defaults to empty so partial documents parse.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A complete configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default)]
    pub content_resolvers: Vec<ResolverEntry>,
    #[serde(default)]
    pub object_resolvers: Vec<ResolverEntry>,
    #[serde(default)]
    pub connectors: Vec<ConnectorEntry>,
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
    /// Root scope. When absent, every top-level connector is attached to the
    /// root in document order.
    #[serde(default)]
    pub root: Option<ScopeEntry>,
    /// Named scopes of the hierarchy, e.g. `com.acme.app`.
    #[serde(default)]
    pub settings: Vec<ScopeEntry>,
}

/// A content or object resolver definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub filter: Option<FilterEntry>,
    #[serde(default)]
    pub read_only: bool,
    /// Default caching flag for descriptor-driven object resolvers.
    #[serde(default)]
    pub cached: Option<bool>,
    /// Delegates appended to a union resolver, by name.
    #[serde(default)]
    pub resolvers: Vec<String>,
}

/// A connector definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Forward content writes to the object resolver. Always on when
    /// `objectResolver` is set.
    #[serde(default)]
    pub notify_content_changed: bool,
    #[serde(default)]
    pub filter: Option<FilterEntry>,
    #[serde(default)]
    pub content_resolver: Option<String>,
    #[serde(default)]
    pub object_resolver: Option<String>,
    /// Auxiliary connectors, by name. Their values are available to
    /// `${connectors...}` and `${connector.NAME...}` in `params`.
    #[serde(default)]
    pub connectors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// A named key-mapping table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub name: String,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

/// Connector references, mapping and additivity for one settings node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeEntry {
    /// Dotted node name. Ignored for the root scope.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub additivity: Option<bool>,
    #[serde(default)]
    pub connectors: Vec<String>,
    #[serde(default)]
    pub mapping: Option<String>,
}

impl ConfigDocument {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a document from disk.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::ConfigFileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn connector(&self, name: &str) -> Option<&ConnectorEntry> {
        self.connectors.iter().find(|entry| entry.name == name)
    }

    pub fn mapping(&self, name: &str) -> Option<&MappingEntry> {
        self.mappings.iter().find(|entry| entry.name == name)
    }

    /// The root scope, synthesized from the connector list when absent.
    pub fn effective_root(&self) -> ScopeEntry {
        self.root.clone().unwrap_or_else(|| ScopeEntry {
            connectors: self.connectors.iter().map(|c| c.name.clone()).collect(),
            ..ScopeEntry::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let doc = ConfigDocument::from_json(
            r#"{
                "contentResolvers": [{"name": "files", "type": "fs", "params": {"rootFolder": "/etc/app"}}],
                "objectResolvers": [{"name": "json", "type": "json", "cached": true}],
                "connectors": [{
                    "name": "main",
                    "type": "fs",
                    "cached": true,
                    "readOnly": true,
                    "filter": {"include": ["com/.*"], "exclude": ["com/secret/.*"]},
                    "objectResolver": "json"
                }],
                "mappings": [{"name": "aliases", "entries": {"db": "com/acme/db"}}],
                "root": {"connectors": ["main"], "mapping": "aliases"},
                "settings": [{"name": "com.acme", "additivity": false}]
            }"#,
        )
        .unwrap();

        let main = doc.connector("main").unwrap();
        assert_eq!(main.type_id, "fs");
        assert!(main.cached && main.read_only && !main.notify_content_changed);
        assert_eq!(main.filter.as_ref().unwrap().exclude, vec!["com/secret/.*"]);
        assert_eq!(doc.object_resolvers[0].cached, Some(true));
        assert_eq!(doc.mapping("aliases").unwrap().entries["db"], "com/acme/db");
        assert_eq!(doc.settings[0].additivity, Some(false));
    }

    #[test]
    fn test_empty_document_is_valid() {
        let doc = ConfigDocument::from_json("{}").unwrap();
        assert_eq!(doc, ConfigDocument::default());
        assert!(doc.effective_root().connectors.is_empty());
    }

    #[test]
    fn test_root_defaults_to_all_connectors() {
        let doc = ConfigDocument::from_json(
            r#"{"connectors": [{"name": "a", "type": "environment"}, {"name": "b", "type": "system-property"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.effective_root().connectors, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_type_is_a_parse_error() {
        let err = ConfigDocument::from_json(r#"{"connectors": [{"name": "a"}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ConfigDocument::from_path(&missing),
            Err(ConfigError::ConfigFileRead { path, .. }) if path == missing
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert!(matches!(
            ConfigDocument::from_path(&broken),
            Err(ConfigError::ConfigFileParse { path, .. }) if path == broken
        ));
    }
}
