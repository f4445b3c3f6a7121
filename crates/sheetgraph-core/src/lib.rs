//! SheetGraph Core
//!
//! Configuration, diagnostics and the run report shared by every crate.
//! Never rename diagnostic codes - they are part of report.json.

pub mod diagnostic;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use report::{RunReport, RunSummary, ReportVersion};
pub use config::{Config, ConfigError, FilterConfig, LabelConfig, RendererConfig, RendererKind};
