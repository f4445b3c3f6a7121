//! One-hop neighbor views
//!
//! Turns a node and its immediate neighbors into edge descriptors in the
//! line-oriented `'<source>' -> '<destination>'` diagram notation.

use regex::Regex;
use sheetgraph_core::{config::DEFAULT_LABEL_PATTERN, ConfigError, LabelConfig};
use std::fmt;
use crate::export::RecordId;
use crate::graph::{DependencyGraph, Node};

/// Derives short diagram labels from display names
#[derive(Debug, Clone)]
pub struct Labeler {
    pattern: Regex,
}

impl Labeler {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    pub fn from_config(config: &LabelConfig) -> Result<Self, ConfigError> {
        config.compile().map(Self::new)
    }

    /// First capture group of the pattern, or the whole name when nothing matches
    pub fn short_label<'n>(&self, name: &'n str) -> &'n str {
        self.pattern
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or(name)
    }
}

impl Default for Labeler {
    fn default() -> Self {
        Self::new(Regex::new(DEFAULT_LABEL_PATTERN).expect("default label pattern compiles"))
    }
}

/// One directed edge of a diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDescriptor {
    pub source: String,
    pub destination: String,
}

impl EdgeDescriptor {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for EdgeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' -> '{}'", self.source, self.destination)
    }
}

/// Immediate upstream and downstream edges of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborView {
    /// Id of the node at the center of the view
    pub node_id: RecordId,

    /// Short label of the center node
    pub label: String,

    /// Dependency -> node, one per incoming entry
    pub upstream: Vec<EdgeDescriptor>,

    /// Node -> dependent, one per outgoing entry
    pub downstream: Vec<EdgeDescriptor>,
}

impl NeighborView {
    /// Build the view of `node`; neighbors equal to the node itself are skipped
    pub fn for_node(graph: &DependencyGraph, node: &Node, labeler: &Labeler) -> Self {
        let label = labeler.short_label(&node.name).to_string();

        let neighbor_labels = |ids: &[RecordId]| -> Vec<String> {
            ids.iter()
                .filter(|id| **id != node.id)
                .filter_map(|id| graph.get(*id))
                .map(|neighbor| labeler.short_label(&neighbor.name).to_string())
                .collect()
        };

        let upstream = neighbor_labels(node.incoming())
            .into_iter()
            .map(|source| EdgeDescriptor::new(source, label.clone()))
            .collect();

        let downstream = neighbor_labels(node.outgoing())
            .into_iter()
            .map(|destination| EdgeDescriptor::new(label.clone(), destination))
            .collect();

        Self {
            node_id: node.id,
            label,
            upstream,
            downstream,
        }
    }

    /// No edge left after self-loop suppression
    pub fn is_empty(&self) -> bool {
        self.upstream.is_empty() && self.downstream.is_empty()
    }

    /// Upstream edges, one per line
    pub fn upstream_diagram(&self) -> String {
        join_lines(&self.upstream)
    }

    /// Downstream edges, one per line
    pub fn downstream_diagram(&self) -> String {
        join_lines(&self.downstream)
    }

    /// Full payload for the renderer: upstream lines, then downstream lines
    pub fn to_diagram(&self) -> String {
        format!("{}\n{}", self.upstream_diagram(), self.downstream_diagram())
    }
}

fn join_lines(edges: &[EdgeDescriptor]) -> String {
    edges
        .iter()
        .map(|edge| edge.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find a node by numeric id, short label, or full name
///
/// A numeric query is tried as a record id first. It only falls back to label
/// matching when no node has that id, so a sheet labeled `12` is shadowed by
/// the node with id 12.
pub fn find_node<'g>(graph: &'g DependencyGraph, labeler: &Labeler, query: &str) -> Option<&'g Node> {
    if let Ok(id) = query.parse::<RecordId>() {
        if let Some(node) = graph.get(id) {
            return Some(node);
        }
    }

    graph
        .nodes()
        .find(|node| labeler.short_label(&node.name) == query || node.name == query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Record, Reference};
    use pretty_assertions::assert_eq;

    fn sheet(id: RecordId, name: &str, refs: &[RecordId]) -> Record {
        refs.iter().fold(Record::new(id, name, "MeasureSheet"), |record, target| {
            record.with_reference(Reference::new(*target, "MeasureSheet"))
        })
    }

    #[test]
    fn short_label_takes_number_prefix() {
        let labeler = Labeler::default();
        assert_eq!(labeler.short_label("12.3.4 Some Name"), "12.3.4");
        assert_eq!(labeler.short_label("12.3 Revenue"), "12.3");
        assert_eq!(labeler.short_label("7"), "7");
    }

    #[test]
    fn short_label_falls_back_to_name() {
        let labeler = Labeler::default();
        assert_eq!(labeler.short_label("Untitled"), "Untitled");
        assert_eq!(labeler.short_label("Revenue 12.3"), "Revenue 12.3");
        assert_eq!(labeler.short_label(""), "");
    }

    #[test]
    fn custom_label_pattern() {
        let labeler = Labeler::from_config(&LabelConfig {
            pattern: r"^\[(\w+)\]".to_string(),
        })
        .unwrap();
        assert_eq!(labeler.short_label("[REV] Revenue"), "REV");
        assert_eq!(labeler.short_label("12.3 Revenue"), "12.3 Revenue");
    }

    #[test]
    fn view_lists_both_directions() {
        let a = sheet(1, "1.0 Input", &[]);
        let b = sheet(2, "2.0 Model", &[1]);
        let c = sheet(3, "3.0 Output", &[2]);
        let graph = DependencyGraph::build(&[&a, &b, &c]);
        let labeler = Labeler::default();

        let view = NeighborView::for_node(&graph, graph.get(2).unwrap(), &labeler);
        assert_eq!(view.label, "2.0");
        assert_eq!(view.upstream, vec![EdgeDescriptor::new("1.0", "2.0")]);
        assert_eq!(view.downstream, vec![EdgeDescriptor::new("2.0", "3.0")]);
        assert_eq!(view.to_diagram(), "'1.0' -> '2.0'\n'2.0' -> '3.0'");
    }

    #[test]
    fn self_loops_are_suppressed() {
        let a = sheet(1, "1.0 Loop", &[1, 2]);
        let b = sheet(2, "2.0 Other", &[]);
        let graph = DependencyGraph::build(&[&a, &b]);
        let labeler = Labeler::default();

        let view = NeighborView::for_node(&graph, graph.get(1).unwrap(), &labeler);
        assert_eq!(view.upstream, vec![EdgeDescriptor::new("2.0", "1.0")]);
        assert!(view.downstream.is_empty());
        assert_eq!(view.to_diagram(), "'2.0' -> '1.0'\n");
    }

    #[test]
    fn only_self_loop_gives_empty_view() {
        let a = sheet(1, "1.0 Loop", &[1]);
        let graph = DependencyGraph::build(&[&a]);
        let view = NeighborView::for_node(&graph, graph.get(1).unwrap(), &Labeler::default());
        assert!(view.is_empty());
        assert_eq!(view.to_diagram(), "\n");
    }

    #[test]
    fn duplicate_edges_are_repeated() {
        let a = sheet(1, "1.0 A", &[2, 2]);
        let b = sheet(2, "2.0 B", &[]);
        let graph = DependencyGraph::build(&[&a, &b]);
        let view = NeighborView::for_node(&graph, graph.get(2).unwrap(), &Labeler::default());
        assert_eq!(view.downstream_diagram(), "'2.0' -> '1.0'\n'2.0' -> '1.0'");
    }

    #[test]
    fn find_by_id_or_label() {
        let a = sheet(10, "1.0 A", &[20]);
        let b = sheet(20, "2.0 B", &[]);
        let graph = DependencyGraph::build(&[&a, &b]);
        let labeler = Labeler::default();

        assert_eq!(find_node(&graph, &labeler, "20").map(|n| n.id), Some(20));
        assert_eq!(find_node(&graph, &labeler, "1.0").map(|n| n.id), Some(10));
        assert_eq!(find_node(&graph, &labeler, "2.0 B").map(|n| n.id), Some(20));
        assert!(find_node(&graph, &labeler, "3.0").is_none());
    }

    #[test]
    fn numeric_query_prefers_id_over_label() {
        let costs = sheet(12, "7 Costs", &[30]);
        let revenue = sheet(30, "12 Revenue", &[]);
        let tax = sheet(40, "13 Tax", &[12]);
        let graph = DependencyGraph::build(&[&costs, &revenue, &tax]);
        let labeler = Labeler::default();

        assert_eq!(find_node(&graph, &labeler, "12").map(|n| n.id), Some(12));
        // No node has id 13, so the label matches
        assert_eq!(find_node(&graph, &labeler, "13").map(|n| n.id), Some(40));
        assert_eq!(find_node(&graph, &labeler, "12 Revenue").map(|n| n.id), Some(30));
    }
}
