//! End-to-end run: filter, build, and render one diagram per node
//!
//! Nodes are rendered one at a time in graph order. By default the first
//! render or write failure aborts the run; with `keep_going` each failure is
//! recorded in the run report and the remaining nodes are still processed.

use sheetgraph_core::{Config, ConfigError, Diagnostic, DiagnosticCode, RunReport, Severity};
use sheetgraph_export::{DependencyGraph, Export, ExportError, Labeler, NeighborView, RecordFilter, RecordId};
use sheetgraph_render::{DiagramRenderer, RenderError};
use std::collections::HashSet;
use std::path::PathBuf;
use crate::writer::DiagramWriter;

/// Errors that stop a run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create output directory {path}: {message}")]
    OutputDir { path: String, message: String },

    #[error("Failed to render diagram for {label} (id {node_id}): {source}")]
    Render {
        node_id: RecordId,
        label: String,
        #[source]
        source: RenderError,
    },

    #[error("Failed to write diagram for node {node_id} to {path}: {message}")]
    Write {
        node_id: RecordId,
        path: String,
        message: String,
    },
}

impl PipelineError {
    /// Report entry for a per-node failure
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Self::Render { node_id, .. } => Some(
                Diagnostic::new(DiagnosticCode::RenderFailed, Severity::Error, self.to_string())
                    .with_node(*node_id),
            ),
            Self::Write { node_id, path, .. } => Some(
                Diagnostic::new(DiagnosticCode::WriteFailed, Severity::Error, self.to_string())
                    .with_node(*node_id)
                    .with_path(path.clone()),
            ),
            _ => None,
        }
    }
}

/// Drives one run against a renderer
pub struct Pipeline<'a> {
    config: &'a Config,
    renderer: &'a dyn DiagramRenderer,
    labeler: Labeler,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, renderer: &'a dyn DiagramRenderer) -> Result<Self, PipelineError> {
        let labeler = Labeler::from_config(&config.labels)?;
        Ok(Self {
            config,
            renderer,
            labeler,
        })
    }

    pub fn labeler(&self) -> &Labeler {
        &self.labeler
    }

    /// Read the configured export file
    pub fn load(&self) -> Result<Export, PipelineError> {
        let input = self.config.input_path();
        tracing::debug!(path = %input.display(), "loading export");
        Ok(Export::from_file(&input)?)
    }

    /// Filter the export and build the dependency graph, filling in the report summary
    pub fn build_graph(&self, export: &Export, report: &mut RunReport) -> DependencyGraph {
        let (eligible, dropped) = RecordFilter::new(&self.config.filter).apply_counted(&export.records);
        let graph = DependencyGraph::build(&eligible);
        let stats = graph.stats();

        report.summary.records_read = export.len();
        report.summary.records_eligible = eligible.len();
        report.summary.dropped_folders = dropped.folders;
        report.summary.dropped_no_references = dropped.no_references;
        report.summary.dropped_excluded_parent = dropped.excluded_parent;
        report.summary.dropped_wrong_type = dropped.wrong_type;
        report.summary.nodes_built = graph.len();
        report.summary.nodes_pruned = stats.pruned;
        report.summary.references_dropped = stats.references_dropped;
        report.summary.duplicate_ids = stats.duplicate_ids.len();

        for id in &stats.duplicate_ids {
            report.add_diagnostic(
                Diagnostic::new(
                    DiagnosticCode::DuplicateIdentifier,
                    Severity::Info,
                    format!("Record id {} appears more than once; the last record was kept", id),
                )
                .with_node(*id),
            );
        }

        tracing::info!(
            records = export.len(),
            eligible = eligible.len(),
            dropped = dropped.dropped(),
            nodes = graph.len(),
            pruned = stats.pruned,
            "built dependency graph"
        );

        graph
    }

    /// Neighbor views of every node, in graph order
    pub fn views(&self, graph: &DependencyGraph) -> Vec<NeighborView> {
        graph
            .nodes()
            .map(|node| NeighborView::for_node(graph, node, &self.labeler))
            .collect()
    }

    /// Render and write one diagram per node of the export
    pub async fn run(&self, export: &Export) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::new();
        let graph = self.build_graph(export, &mut report);

        let writer = DiagramWriter::new(self.config.output_path());
        writer.prepare().map_err(|e| PipelineError::OutputDir {
            path: writer.dir().display().to_string(),
            message: e.to_string(),
        })?;

        let mut written: HashSet<PathBuf> = HashSet::new();

        for node in graph.nodes() {
            let view = NeighborView::for_node(&graph, node, &self.labeler);
            tracing::info!(id = node.id, "Generating {}", node.name);

            match self.render_view(&writer, &view).await {
                Ok(path) => {
                    if !written.insert(path.clone()) {
                        tracing::warn!(id = node.id, path = %path.display(), "label collision, diagram overwritten");
                        report.add_diagnostic(
                            Diagnostic::new(
                                DiagnosticCode::Warning,
                                Severity::Warn,
                                format!("Diagram {} was overwritten by node {}", path.display(), node.id),
                            )
                            .with_node(node.id)
                            .with_path(path.display().to_string()),
                        );
                    }
                    report.summary.diagrams_written += 1;
                }
                Err(err) if self.config.keep_going => {
                    tracing::warn!(id = node.id, "{}", err);
                    if let Some(diagnostic) = err.to_diagnostic() {
                        report.add_diagnostic(diagnostic);
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    async fn render_view(&self, writer: &DiagramWriter, view: &NeighborView) -> Result<PathBuf, PipelineError> {
        let bytes = self
            .renderer
            .render(&view.to_diagram())
            .await
            .map_err(|source| PipelineError::Render {
                node_id: view.node_id,
                label: view.label.clone(),
                source,
            })?;

        writer
            .write(&view.label, self.renderer.extension(), &bytes)
            .map_err(|e| PipelineError::Write {
                node_id: view.node_id,
                path: writer.path_for(&view.label, self.renderer.extension()).display().to_string(),
                message: e.to_string(),
            })
    }
}
