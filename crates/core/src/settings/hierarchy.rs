//! Dotted-name settings tree with additivity and late ancestor linking.
//!
//! Responsibilities:
//! - Keep settings nodes in an arena indexed by name, where an index entry is
//!   either a resolved node or a provisional placeholder listing the
//!   descendants that wait for that ancestor.
//! - Link each new node to its nearest existing ancestor (or the root) and
//!   re-link waiting descendants when an ancestor appears later.
//! - Resolve effective connector chains and key mappings along the parent
//!   links while the node is additive.
//!
//! Does NOT handle:
//! - Removing nodes. Nodes live as long as the repository.
//!
//! Invariants:
//! - A node's parent is always its nearest resolved ancestor by name, or the
//!   root; creation order does not change the final links.
//! - The arena lock is never held while a connector is called.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::connector::{Connector, ConnectorPosition};
use crate::error::SettingsError;

use super::instance::Scope;
use super::{Route, Settings, SettingsInstance};

pub const ROOT_SETTINGS_NAME: &str = "root";

pub(crate) type NodeId = usize;

const ROOT_ID: NodeId = 0;

struct Node {
    settings: Arc<SettingsInstance>,
    additive: bool,
    parent: Option<NodeId>,
}

enum Entry {
    Resolved(NodeId),
    Provisional(Vec<NodeId>),
}

pub(crate) struct Tree {
    nodes: Vec<Node>,
    index: HashMap<String, Entry>,
}

impl Tree {
    pub(crate) fn new() -> Self {
        let root = Node {
            settings: Arc::new(SettingsInstance::new(ROOT_SETTINGS_NAME)),
            additive: true,
            parent: None,
        };
        let mut index = HashMap::new();
        index.insert(ROOT_SETTINGS_NAME.to_string(), Entry::Resolved(ROOT_ID));
        Self {
            nodes: vec![root],
            index,
        }
    }

    fn name(&self, id: NodeId) -> &str {
        self.nodes[id].settings.name()
    }

    pub(crate) fn resolved(&self, name: &str) -> Option<NodeId> {
        match self.index.get(name) {
            Some(Entry::Resolved(id)) => Some(*id),
            _ => None,
        }
    }

    pub(crate) fn resolved_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.index.values().filter_map(|entry| match entry {
            Entry::Resolved(id) => Some(*id),
            Entry::Provisional(_) => None,
        })
    }

    /// Returns the node for `name`, creating and linking it if needed.
    pub(crate) fn get_or_create(&mut self, name: &str) -> NodeId {
        let pending = match self.index.get(name) {
            Some(Entry::Resolved(id)) => return *id,
            Some(Entry::Provisional(children)) => Some(children.clone()),
            None => None,
        };

        let id = self.nodes.len();
        self.nodes.push(Node {
            settings: Arc::new(SettingsInstance::new(name)),
            additive: true,
            parent: Some(ROOT_ID),
        });
        self.index.insert(name.to_string(), Entry::Resolved(id));
        if let Some(children) = pending {
            self.update_children(id, &children);
        }
        self.update_parents(id);
        tracing::debug!(settings = %name, parent = %self.parent_name(id).unwrap_or_default(), "Created settings node");
        id
    }

    /// Walks `a.b.c` → `a.b` → `a`: links to the nearest resolved ancestor and
    /// registers with every provisional level passed on the way.
    fn update_parents(&mut self, id: NodeId) {
        let name = self.name(id).to_string();
        let mut parent = ROOT_ID;
        let mut end = name.len();
        while let Some(dot) = name[..end].rfind('.') {
            let ancestor = &name[..dot];
            match self.index.get_mut(ancestor) {
                None => {
                    self.index
                        .insert(ancestor.to_string(), Entry::Provisional(vec![id]));
                }
                Some(Entry::Resolved(found)) => {
                    parent = *found;
                    break;
                }
                Some(Entry::Provisional(children)) => children.push(id),
            }
            end = dot;
        }
        self.nodes[id].parent = Some(parent);
    }

    /// Adopts waiting descendants unless they already hang below this node.
    fn update_children(&mut self, id: NodeId, children: &[NodeId]) {
        let descendant_prefix = format!("{}.", self.name(id));
        for &child in children {
            let already_below = self.nodes[child]
                .parent
                .is_some_and(|p| self.name(p).starts_with(&descendant_prefix));
            if !already_below {
                self.nodes[child].parent = Some(id);
            }
        }
    }

    pub(crate) fn parent_name(&self, id: NodeId) -> Option<String> {
        self.nodes[id].parent.map(|p| self.name(p).to_string())
    }

    /// Scope snapshots of `id` and, while additive, its ancestors, nearest
    /// first.
    fn scopes(&self, id: NodeId) -> Vec<Arc<Scope>> {
        let mut scopes = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            scopes.push(node.settings.scope());
            current = if node.additive { node.parent } else { None };
        }
        scopes
    }

    fn route(&self, id: NodeId, key: &str) -> Route {
        let scopes = self.scopes(id);
        let mapped = scopes
            .iter()
            .find_map(|scope| scope.mapping_for(key))
            .unwrap_or(key)
            .to_string();
        Route {
            key: mapped,
            connectors: scopes
                .iter()
                .flat_map(|scope| scope.connectors.iter().cloned())
                .collect(),
        }
    }
}

/// Handle to one node of a settings tree.
///
/// Cloning the handle is cheap; every clone addresses the same node.
#[derive(Clone)]
pub struct HierarchicalSettings {
    tree: Arc<RwLock<Tree>>,
    id: NodeId,
    settings: Arc<SettingsInstance>,
}

impl HierarchicalSettings {
    pub(crate) fn new(tree: Arc<RwLock<Tree>>, id: NodeId) -> Self {
        let settings = Arc::clone(&tree.read().nodes[id].settings);
        Self { tree, id, settings }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// Name of the current parent node; `None` for the root.
    pub fn parent_name(&self) -> Option<String> {
        self.tree.read().parent_name(self.id)
    }

    pub fn parent(&self) -> Option<HierarchicalSettings> {
        let parent = self.tree.read().nodes[self.id].parent?;
        Some(HierarchicalSettings::new(Arc::clone(&self.tree), parent))
    }

    pub fn additivity(&self) -> bool {
        self.tree.read().nodes[self.id].additive
    }

    pub fn set_additivity(&self, additive: bool) {
        self.tree.write().nodes[self.id].additive = additive;
    }

    /// This node's own flat scope (connectors and mapping without ancestors).
    pub fn own(&self) -> &SettingsInstance {
        &self.settings
    }

    pub fn add_connector(&self, connector: Arc<dyn Connector>) -> Result<(), SettingsError> {
        self.settings.add_connector(connector)
    }

    pub fn add_connector_at(
        &self,
        connector: Arc<dyn Connector>,
        position: &ConnectorPosition,
    ) -> Result<(), SettingsError> {
        self.settings.add_connector_at(connector, position)
    }

    pub fn remove_all_connectors(&self) {
        self.settings.remove_all_connectors();
    }

    pub fn replace_connectors(&self, connectors: Vec<Arc<dyn Connector>>) -> Result<(), SettingsError> {
        self.settings.replace_connectors(connectors)
    }

    pub fn set_mapping(&self, mapping: HashMap<String, String>) {
        self.settings.set_mapping(mapping);
    }

    /// Replaces connectors, mapping and additivity of this node at once.
    ///
    /// Lookups through this node or its descendants see either the old or the
    /// new configuration, never a mix.
    pub fn configure(
        &self,
        connectors: Vec<Arc<dyn Connector>>,
        mapping: HashMap<String, String>,
        additive: bool,
    ) -> Result<(), SettingsError> {
        let mut tree = self.tree.write();
        self.settings.configure(connectors, mapping)?;
        tree.nodes[self.id].additive = additive;
        Ok(())
    }

    /// Drops own connectors and mapping and makes the node additive again.
    pub fn reset(&self) {
        let mut tree = self.tree.write();
        let _ = self.settings.configure(Vec::new(), HashMap::new());
        tree.nodes[self.id].additive = true;
    }
}

impl Settings for HierarchicalSettings {
    fn name(&self) -> &str {
        self.settings.name()
    }

    fn connectors(&self) -> Vec<Arc<dyn Connector>> {
        self.tree.read().route(self.id, "").connectors
    }

    fn mapped_key(&self, key: &str) -> String {
        self.tree.read().route(self.id, key).key
    }

    fn route(&self, key: &str) -> Route {
        self.tree.read().route(self.id, key)
    }
}

impl std::fmt::Debug for HierarchicalSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalSettings")
            .field("name", &self.settings.name())
            .field("parent", &self.parent_name())
            .field("additive", &self.additivity())
            .finish()
    }
}
