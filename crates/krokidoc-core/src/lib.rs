#![forbid(unsafe_code)]

//! Markdown diagram-fence processing for Kroki-compatible rendering services.
//!
//! Design goals:
//! - pure transformation core (HTTP stays behind the [`DiagramRenderer`] seam)
//! - byte-exact pass-through of everything that is not a diagram fence
//! - deterministic, testable embed markup

pub mod config;
pub mod embed;
pub mod encode;
pub mod error;
pub mod options;
pub mod page;
pub mod registry;
pub mod render;
pub mod style;

#[cfg(test)]
mod tests;

pub use config::{HttpMethod, KrokiConfig, TagFormat};
pub use error::{Error, Result};
pub use options::{Align, BlockOptions};
pub use page::{Artifact, BlockFailure, PageContext, ProcessedPage};
pub use registry::{DiagramRegistry, DiagramSpec, Gate, OutputFormat};
pub use render::{DiagramRenderer, RenderError, RenderRequest};
pub use style::{compose_style, resolve_background};

use std::sync::Arc;

use indexmap::IndexMap;

/// Drives the fence-to-embed transformation.
#[derive(Clone)]
pub struct Processor {
    config: KrokiConfig,
    registry: DiagramRegistry,
    renderer: Option<Arc<dyn DiagramRenderer + Send + Sync>>,
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            config: KrokiConfig::default(),
            registry: DiagramRegistry::default_kroki(),
            renderer: None,
        }
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("config", &self.config)
            .field("has_renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: KrokiConfig) -> Self {
        self.config = config;
        self
    }

    /// Attaches the renderer used for `post`-mode artifacts and inline SVG.
    ///
    /// Without one, `get`-mode URL embeds still work; fetching embeds fail
    /// per the configured failure policy.
    pub fn with_renderer(mut self, renderer: Arc<dyn DiagramRenderer + Send + Sync>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn config(&self) -> &KrokiConfig {
        &self.config
    }

    pub fn registry(&self) -> &DiagramRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DiagramRegistry {
        &mut self.registry
    }

    /// Resolves a fence language token (prefix included) to an enabled
    /// diagram type, if any.
    pub fn spec_for_fence(&self, lang: &str) -> Option<&DiagramSpec> {
        let diagram_type = if self.config.fence_prefix.is_empty() {
            lang
        } else {
            lang.strip_prefix(self.config.fence_prefix.as_str())?
        };
        let spec = self.registry.get(diagram_type)?;
        spec.gate.enabled(&self.config).then_some(spec)
    }

    /// Resolves the output format used for one diagram type under this
    /// config.
    pub fn effective_format(&self, spec: &DiagramSpec) -> Result<OutputFormat> {
        page::effective_format(&self.config, spec)
    }

    /// Transforms one page of Markdown. See [`page::transform_page`].
    pub fn process_page(&self, page: &str, ctx: &PageContext) -> Result<ProcessedPage> {
        let renderer = self
            .renderer
            .as_deref()
            .map(|r| r as &dyn DiagramRenderer);
        page::transform_page(&self.config, &self.registry, renderer, page, ctx)
    }

    /// Builds the GET embed URL for one diagram source.
    pub fn encode_url(
        &self,
        diagram_type: &str,
        format: Option<OutputFormat>,
        source: &str,
    ) -> Result<String> {
        let Some(spec) = self.registry.get(diagram_type) else {
            return Err(Error::UnsupportedDiagram {
                diagram_type: diagram_type.to_string(),
            });
        };

        let format = match format {
            Some(format) if spec.supports(format) => format,
            Some(format) => {
                return Err(Error::UnsupportedFormat {
                    diagram_type: spec.id.to_string(),
                    format: format.as_str().to_string(),
                });
            }
            None => page::effective_format(&self.config, spec)?,
        };

        encode::get_url(
            &self.config.server_url,
            spec.id,
            format,
            source,
            &IndexMap::new(),
        )
    }
}
