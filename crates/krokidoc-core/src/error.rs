use std::path::PathBuf;

use crate::render::RenderError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported diagram type: {diagram_type}")]
    UnsupportedDiagram { diagram_type: String },

    #[error("Diagram type {diagram_type} cannot be rendered as {format}")]
    UnsupportedFormat {
        diagram_type: String,
        format: String,
    },

    #[error("Malformed diagram options: {options}")]
    MalformedOptions { options: String },

    #[error("Failed to read diagram source from '{}': {source}", path.display())]
    FromFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Rendering {diagram_type} diagram failed: {source}")]
    Render {
        diagram_type: String,
        #[source]
        source: RenderError,
    },

    #[error("No renderer attached; {diagram_type} requires fetching the rendered diagram")]
    RendererRequired { diagram_type: String },

    #[error("Invalid Kroki server URL '{url}': {message}")]
    InvalidServerUrl { url: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to read configuration from '{}': {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Inline SVG rewrite failed: {message}")]
    InvalidSvg { message: String },
}
