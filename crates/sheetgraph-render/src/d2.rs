//! Renderer backed by the external `d2` binary
//!
//! The diagram is piped to `d2 [args] - -` and the SVG is read back from
//! stdout. Layout engine and padding are plain arguments so they stay
//! configurable from sheetgraph.toml.

use crate::renderer::{DiagramRenderer, RenderError};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Renders diagrams to SVG with d2
#[derive(Debug, Clone)]
pub struct D2Renderer {
    command: String,
    args: Vec<String>,
}

impl D2Renderer {
    /// Create a renderer running `command` with no extra arguments
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    /// Set arguments passed before the stdin/stdout operands
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.command);
        command.kill_on_drop(true);
        command
    }
}

impl Default for D2Renderer {
    fn default() -> Self {
        Self::new("d2").with_args(
            ["--layout", "elk", "--pad", "5"].iter().map(|s| s.to_string()).collect(),
        )
    }
}

#[async_trait::async_trait]
impl DiagramRenderer for D2Renderer {
    fn name(&self) -> &'static str {
        "d2"
    }

    fn extension(&self) -> &str {
        "svg"
    }

    async fn render(&self, diagram: &str) -> Result<Vec<u8>, RenderError> {
        let mut child = self
            .command()
            .args(&self.args)
            .arg("-")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RenderError::Spawn(self.command.clone(), e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            // An early exit shows up in the exit status below
            if let Err(e) = stdin.write_all(diagram.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::trace!(bytes = output.stdout.len(), "d2 rendered diagram");
        Ok(output.stdout)
    }

    async fn check(&self) -> Result<(), RenderError> {
        let output = self
            .command()
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| RenderError::Unavailable(format!("{}: {}", self.command, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RenderError::Unavailable(format!(
                "{} --version exited with {}",
                self.command, output.status
            )))
        }
    }
}
