//! Mock renderer for testing
//!
//! Records every diagram it is asked to render and returns the source bytes
//! back, without running any layout engine. Failures can be simulated for
//! diagrams containing a given label.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sheetgraph_render::{MockRenderer, DiagramRenderer};
//!
//! let renderer = MockRenderer::new().fail_on("2.0");
//! assert!(renderer.render("'1.0' -> '2.0'").await.is_err());
//! assert_eq!(renderer.rendered().await.len(), 0);
//! ```

use crate::renderer::{DiagramRenderer, RenderError};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock renderer for testing
pub struct MockRenderer {
    /// Diagrams rendered successfully, in call order
    rendered: Arc<RwLock<Vec<String>>>,

    /// Diagrams containing any of these labels fail to render
    failing_labels: Vec<String>,

    /// Simulate a missing renderer
    unavailable: bool,
}

impl MockRenderer {
    /// Create a mock that renders everything
    pub fn new() -> Self {
        Self {
            rendered: Arc::new(RwLock::new(Vec::new())),
            failing_labels: Vec::new(),
            unavailable: false,
        }
    }

    /// Fail any diagram mentioning `'label'`
    pub fn fail_on(mut self, label: impl Into<String>) -> Self {
        self.failing_labels.push(format!("'{}'", label.into()));
        self
    }

    /// Make `check` fail
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Diagrams rendered so far
    pub async fn rendered(&self) -> Vec<String> {
        self.rendered.read().await.clone()
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DiagramRenderer for MockRenderer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn extension(&self) -> &str {
        "txt"
    }

    async fn render(&self, diagram: &str) -> Result<Vec<u8>, RenderError> {
        if self.failing_labels.iter().any(|label| diagram.contains(label.as_str())) {
            return Err(RenderError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "simulated render failure".to_string(),
            });
        }

        self.rendered.write().await.push(diagram.to_string());
        Ok(diagram.as_bytes().to_vec())
    }

    async fn check(&self) -> Result<(), RenderError> {
        if self.unavailable {
            Err(RenderError::Unavailable("mock renderer disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_rendered_diagrams() {
        let renderer = MockRenderer::new();
        let out = renderer.render("'1.0' -> '2.0'").await.unwrap();

        assert_eq!(out, b"'1.0' -> '2.0'");
        assert_eq!(renderer.rendered().await, vec!["'1.0' -> '2.0'".to_string()]);
    }

    #[tokio::test]
    async fn simulated_failures() {
        let renderer = MockRenderer::new().fail_on("2.0").unavailable();

        assert!(renderer.render("'1.0' -> '2.0'").await.is_err());
        // "12.0" must not match the quoted "2.0"
        assert!(renderer.render("'12.0' -> '3.0'").await.is_ok());
        assert!(renderer.check().await.is_err());
        assert_eq!(renderer.rendered().await.len(), 1);
    }
}
