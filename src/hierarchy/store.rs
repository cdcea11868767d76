use std::collections::HashMap;

use thiserror::Error;

use super::depth::DepthCalculator;
use super::labels::LabelSource;
use crate::models::{HierarchyKind, HierarchyNode, HierarchyRow};

/// Errors raised by hierarchy lookups and construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// No hierarchy with that name has been created.
    #[error("no hierarchy named `{0}` has been created")]
    NotFound(HierarchyKind),

    /// A hierarchy with that name has already been created.
    #[error("hierarchy `{0}` has already been created")]
    AlreadyExists(HierarchyKind),

    /// The hierarchy has no node with that key.
    #[error("no node `{uri}` in hierarchy `{kind}`")]
    NodeNotFound { kind: HierarchyKind, uri: String },

    /// A walk revisited a node that is its own descendant.
    #[error("cycle through `{uri}` in hierarchy `{kind}`")]
    Cycle { kind: HierarchyKind, uri: String },

    /// The graph could not answer the rows query for this hierarchy.
    #[error("failed to query rows for hierarchy `{kind}`: {reason}")]
    Query { kind: HierarchyKind, reason: String },
}

/// One named tree of ontology entities, keyed by URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    kind: HierarchyKind,
    root: String,
    nodes: HashMap<String, HierarchyNode>,
}

impl Hierarchy {
    /// Creates an empty hierarchy rooted at `root`.
    pub fn new(kind: HierarchyKind, root: impl Into<String>) -> Self {
        Self {
            kind,
            root: root.into(),
            nodes: HashMap::new(),
        }
    }

    /// Builds a hierarchy by merging `rows` in order.
    pub fn from_rows(
        kind: HierarchyKind,
        root: impl Into<String>,
        rows: impl IntoIterator<Item = HierarchyRow>,
        labels: &dyn LabelSource,
    ) -> Self {
        let mut hierarchy = Self::new(kind, root);
        for row in rows {
            hierarchy.add_row(row, labels);
        }
        hierarchy
    }

    /// Merges one query row.
    ///
    /// The entity's parent is overwritten by this row's super entity (or the
    /// root when the row has none); domains and ranges accumulate. A previous
    /// parent keeps its child link. Missing parents are created as stubs with
    /// their label resolved once.
    pub fn add_row(&mut self, row: HierarchyRow, labels: &dyn LabelSource) {
        let HierarchyRow {
            entity,
            super_entity,
            domain,
            range,
        } = row;

        let parent = match super_entity {
            Some(parent) => Some(parent),
            None if entity != self.root => Some(self.root.clone()),
            None => None,
        };

        let node = self
            .nodes
            .entry(entity.clone())
            .or_insert_with(|| HierarchyNode::new(entity.clone(), labels.label_for(&entity)));
        node.set_parent(parent.clone());
        if let Some(domain) = domain {
            node.add_domain(domain);
        }
        if let Some(range) = range {
            node.add_range(range);
        }

        if let Some(parent) = parent {
            self.nodes
                .entry(parent.clone())
                .or_insert_with(|| HierarchyNode::new(parent.clone(), labels.label_for(&parent)))
                .add_child(entity);
        }
    }

    /// Inserts or replaces a node as-is.
    pub fn insert_node(&mut self, node: HierarchyNode) {
        self.nodes.insert(node.id().to_string(), node);
    }

    pub fn kind(&self) -> HierarchyKind {
        self.kind
    }

    /// URI of the designated top entity.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn get(&self, uri: &str) -> Option<&HierarchyNode> {
        self.nodes.get(uri)
    }

    /// Looks up a node, reporting a missing key as an error.
    pub fn node(&self, uri: &str) -> Result<&HierarchyNode, HierarchyError> {
        self.nodes.get(uri).ok_or_else(|| HierarchyError::NodeNotFound {
            kind: self.kind,
            uri: uri.to_string(),
        })
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.nodes.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.values()
    }
}

/// Named collection of hierarchies plus their memoized maximum depths.
///
/// Built once, then read-only while serving recommendations, apart from
/// [`HierarchyStore::replace`].
#[derive(Debug, Clone, Default)]
pub struct HierarchyStore {
    hierarchies: HashMap<HierarchyKind, Hierarchy>,
    names: Vec<HierarchyKind>,
    depths: DepthCalculator,
}

impl HierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `HierarchyError::AlreadyExists` if `kind` was already created;
    /// the existing hierarchy is left untouched.
    pub fn create(
        &mut self,
        kind: HierarchyKind,
        root: impl Into<String>,
    ) -> Result<(), HierarchyError> {
        if self.hierarchies.contains_key(&kind) {
            tracing::warn!(hierarchy = %kind, "a hierarchy with that name has already been created");
            return Err(HierarchyError::AlreadyExists(kind));
        }
        self.hierarchies.insert(kind, Hierarchy::new(kind, root));
        self.names.push(kind);
        Ok(())
    }

    /// Creates a hierarchy and merges `rows` into it.
    pub fn build(
        &mut self,
        kind: HierarchyKind,
        root: impl Into<String>,
        rows: impl IntoIterator<Item = HierarchyRow>,
        labels: &dyn LabelSource,
    ) -> Result<(), HierarchyError> {
        self.create(kind, root)?;
        self.grow(kind, rows, labels)?;
        if let Ok(hierarchy) = self.hierarchy(kind) {
            tracing::info!(hierarchy = %kind, nodes = hierarchy.len(), "built hierarchy");
        }
        Ok(())
    }

    /// Merges `rows` into an existing hierarchy.
    pub fn grow(
        &mut self,
        kind: HierarchyKind,
        rows: impl IntoIterator<Item = HierarchyRow>,
        labels: &dyn LabelSource,
    ) -> Result<(), HierarchyError> {
        let hierarchy = self.hierarchies.get_mut(&kind).ok_or_else(|| not_found(kind))?;
        for row in rows {
            hierarchy.add_row(row, labels);
        }
        Ok(())
    }

    /// Returns the hierarchy named `kind`.
    pub fn hierarchy(&self, kind: HierarchyKind) -> Result<&Hierarchy, HierarchyError> {
        self.hierarchies.get(&kind).ok_or_else(|| not_found(kind))
    }

    /// Returns the root URI of the hierarchy named `kind`.
    pub fn root(&self, kind: HierarchyKind) -> Result<&str, HierarchyError> {
        self.hierarchy(kind).map(Hierarchy::root)
    }

    /// Swaps in a new tree for an existing hierarchy, returning the old one.
    ///
    /// The memoized depth for `kind` is kept.
    pub fn replace(
        &mut self,
        kind: HierarchyKind,
        hierarchy: Hierarchy,
    ) -> Result<Hierarchy, HierarchyError> {
        let slot = self.hierarchies.get_mut(&kind).ok_or_else(|| not_found(kind))?;
        Ok(std::mem::replace(slot, hierarchy))
    }

    /// Hierarchy names in creation order.
    pub fn names(&self) -> &[HierarchyKind] {
        &self.names
    }

    /// Maximum depth of the subtree under `node`, memoized per hierarchy name.
    ///
    /// Only the first call for a given `kind` computes anything; later calls
    /// return that value whatever `node` they pass.
    pub fn max_depth(&mut self, kind: HierarchyKind, node: &str) -> Result<usize, HierarchyError> {
        let hierarchy = self.hierarchies.get(&kind).ok_or_else(|| not_found(kind))?;
        self.depths.max_depth(hierarchy, node)
    }

    /// Depth memo and walk counter.
    pub fn depths(&self) -> &DepthCalculator {
        &self.depths
    }
}

fn not_found(kind: HierarchyKind) -> HierarchyError {
    tracing::warn!(hierarchy = %kind, "no hierarchy with that name has been created");
    HierarchyError::NotFound(kind)
}
