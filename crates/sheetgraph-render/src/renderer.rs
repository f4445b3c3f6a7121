//! Diagram renderer trait

/// Errors that can occur while rendering a diagram
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to start renderer '{0}': {1}")]
    Spawn(String, String),

    #[error("Renderer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Renderer IO error: {0}")]
    Io(String),

    #[error("Renderer unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Turns diagram source into image bytes
///
/// The source is the line-oriented `'<source>' -> '<destination>'` notation
/// produced by the neighbor view. The returned bytes are opaque to callers.
#[async_trait::async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Get the renderer name (e.g., "d2")
    fn name(&self) -> &'static str;

    /// File extension of the rendered output, without the dot
    fn extension(&self) -> &str;

    /// Render one diagram
    async fn render(&self, diagram: &str) -> Result<Vec<u8>, RenderError>;

    /// Check that the renderer can run at all
    ///
    /// Lets callers fail before processing any node.
    async fn check(&self) -> Result<(), RenderError> {
        Ok(())
    }
}
