//! Dependency graph construction
//!
//! Builds the node arena from filtered records and wires incoming (dependency)
//! and outgoing (dependent) edges from their direct references.

use indexmap::IndexMap;
use crate::export::{Record, RecordId};

/// A measure sheet in the dependency graph
///
/// Links to other nodes are ids into the owning [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Identifier copied from the record
    pub id: RecordId,

    /// Display name
    pub name: String,

    /// Type tag
    pub type_name: String,

    /// Nodes this node depends on (data flows from them into this node)
    incoming: Vec<RecordId>,

    /// Nodes depending on this node (data flows from this node into them)
    outgoing: Vec<RecordId>,
}

impl Node {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            type_name: record.type_name.clone(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Ids of dependencies, in reference order
    pub fn incoming(&self) -> &[RecordId] {
        &self.incoming
    }

    /// Ids of dependents, in wiring order
    pub fn outgoing(&self) -> &[RecordId] {
        &self.outgoing
    }

    /// No edge in either direction
    pub fn is_isolated(&self) -> bool {
        self.incoming.is_empty() && self.outgoing.is_empty()
    }
}

/// Counters collected while building the graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Nodes created in the materialize pass (duplicates included)
    pub materialized: usize,

    /// Ids seen more than once; the last record wins
    pub duplicate_ids: Vec<RecordId>,

    /// Edges wired (each counted once, as an incoming/outgoing pair)
    pub edges: usize,

    /// References whose target is not in the graph
    pub references_dropped: usize,

    /// Isolated nodes removed
    pub pruned: usize,
}

/// Dependency graph with paired incoming/outgoing edges
///
/// Iteration follows the export order of each id's first occurrence.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<RecordId, Node>,
    stats: BuildStats,
}

impl DependencyGraph {
    /// Build the graph from already-filtered records
    pub fn build(records: &[&Record]) -> Self {
        let mut graph = Self::default();

        // Materialize every record before wiring so forward references resolve
        for record in records {
            graph.stats.materialized += 1;
            if graph.nodes.insert(record.id, Node::from_record(record)).is_some() {
                tracing::debug!(id = record.id, "duplicate record id, keeping the later record");
                graph.stats.duplicate_ids.push(record.id);
            }
        }

        for record in records {
            for target in record.referenced_ids() {
                if !graph.link(record.id, target) {
                    graph.stats.references_dropped += 1;
                }
            }
        }

        graph.prune();
        graph
    }

    /// Record that `dependent` reads from `dependency`
    ///
    /// Both halves of the edge are written together. Returns false, changing
    /// nothing, when either end is not in the graph.
    fn link(&mut self, dependent: RecordId, dependency: RecordId) -> bool {
        if !self.nodes.contains_key(&dependent) || !self.nodes.contains_key(&dependency) {
            return false;
        }

        if let Some(node) = self.nodes.get_mut(&dependent) {
            node.incoming.push(dependency);
        }
        if let Some(node) = self.nodes.get_mut(&dependency) {
            node.outgoing.push(dependent);
        }

        self.stats.edges += 1;
        true
    }

    fn prune(&mut self) {
        let before = self.nodes.len();
        self.nodes.retain(|id, node| {
            if node.is_isolated() {
                tracing::debug!(id = *id, name = %node.name, "pruning isolated node");
                false
            } else {
                true
            }
        });
        self.stats.pruned = before - self.nodes.len();
    }

    /// Get a node by id
    pub fn get(&self, id: RecordId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Check whether a node survived construction
    pub fn contains(&self, id: RecordId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes, in graph order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immediate dependencies of a node
    pub fn dependencies(&self, id: RecordId) -> Vec<&Node> {
        self.resolve(id, Node::incoming)
    }

    /// Immediate dependents of a node
    pub fn dependents(&self, id: RecordId) -> Vec<&Node> {
        self.resolve(id, Node::outgoing)
    }

    fn resolve(&self, id: RecordId, edges: fn(&Node) -> &[RecordId]) -> Vec<&Node> {
        self.nodes
            .get(&id)
            .map(|node| edges(node).iter().filter_map(|other| self.nodes.get(other)).collect())
            .unwrap_or_default()
    }

    /// Counters from construction
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}
