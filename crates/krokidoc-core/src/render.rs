//! The seam between page processing and the remote rendering service.

use indexmap::IndexMap;

use crate::registry::OutputFormat;

/// One diagram to render remotely.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub diagram_type: String,
    pub output_format: OutputFormat,
    pub source: String,
    /// Renderer options forwarded verbatim to the service.
    pub options: IndexMap<String, String>,
}

/// Failure reported by a [`DiagramRenderer`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RenderError {
    /// HTTP status, when the failure came from a completed exchange.
    pub status: Option<u16>,
    pub message: String,
}

/// Fetches rendered diagram bytes from a rendering service.
///
/// The page processor calls this for `post`-mode artifact embeds and for
/// inline `svg` embeds; `get`-mode URL embeds never fetch.
pub trait DiagramRenderer {
    fn render(&self, request: &RenderRequest) -> std::result::Result<Vec<u8>, RenderError>;
}
