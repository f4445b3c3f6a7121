//! Diagram renderers
//!
//! The graph code only produces diagram source text. Turning it into an
//! image happens behind the [`DiagramRenderer`] trait so the graph logic can
//! be tested without a layout engine.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sheetgraph_render::{D2Renderer, DiagramRenderer};
//!
//! let renderer = D2Renderer::default();
//! renderer.check().await?;
//! let svg = renderer.render("'1.0' -> '2.0'").await?;
//! ```

pub mod renderer;
pub mod d2;
pub mod source;
pub mod mock;

pub use renderer::{DiagramRenderer, RenderError};
pub use d2::D2Renderer;
pub use source::SourceRenderer;
pub use mock::MockRenderer;

use sheetgraph_core::{RendererConfig, RendererKind};

/// Build the renderer selected in the config
pub fn from_config(config: &RendererConfig) -> Box<dyn DiagramRenderer> {
    match config.kind {
        RendererKind::D2 => Box::new(D2Renderer::new(&config.command).with_args(config.args.clone())),
        RendererKind::Source => Box::new(SourceRenderer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_from_config() {
        let mut config = RendererConfig::default();
        assert_eq!(from_config(&config).name(), "d2");
        assert_eq!(from_config(&config).extension(), "svg");

        config.kind = RendererKind::Source;
        assert_eq!(from_config(&config).name(), "source");
        assert_eq!(from_config(&config).extension(), "d2");
    }
}
