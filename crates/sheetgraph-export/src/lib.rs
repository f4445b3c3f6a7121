//! Solution export parsing and dependency graph construction
//!
//! This crate handles:
//! - Parsing data.json (flat solution export)
//! - Filtering records down to eligible measure sheets
//! - Building the paired incoming/outgoing dependency graph
//! - One-hop neighbor views for diagram rendering

pub mod export;
pub mod filter;
pub mod graph;
pub mod view;

pub use export::{Export, ExportError, Record, RecordId, Reference};
pub use filter::{DropReason, FilterOutcome, FilterStats, RecordFilter};
pub use graph::{BuildStats, DependencyGraph, Node};
pub use view::{find_node, EdgeDescriptor, Labeler, NeighborView};
