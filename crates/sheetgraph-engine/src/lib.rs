//! SheetGraph engine - runs the whole export-to-diagrams pipeline
//!
//! - Filtering and graph construction (via sheetgraph-export)
//! - Per-node rendering (via a sheetgraph-render renderer)
//! - Writing diagram files and the run report

pub mod pipeline;
pub mod writer;

pub use pipeline::{Pipeline, PipelineError};
pub use writer::DiagramWriter;
