//! Renderer that emits the diagram source itself
//!
//! Useful where d2 is not installed; the `.d2` files can be compiled later.

use crate::renderer::{DiagramRenderer, RenderError};

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceRenderer;

#[async_trait::async_trait]
impl DiagramRenderer for SourceRenderer {
    fn name(&self) -> &'static str {
        "source"
    }

    fn extension(&self) -> &str {
        "d2"
    }

    async fn render(&self, diagram: &str) -> Result<Vec<u8>, RenderError> {
        let mut bytes = diagram.as_bytes().to_vec();
        if !diagram.ends_with('\n') {
            bytes.push(b'\n');
        }
        Ok(bytes)
    }
}
