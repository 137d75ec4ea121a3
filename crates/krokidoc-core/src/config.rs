use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::OutputFormat;

/// Default rendering service endpoint.
pub const DEFAULT_SERVER_URL: &str = "https://kroki.io";

/// Environment variable overriding [`KrokiConfig::server_url`].
pub const SERVER_ENV_VAR: &str = "KROKIDOC_SERVER";

#[derive(Debug, thiserror::Error)]
#[error("Unknown HTTP method: {method}")]
pub struct ParseHttpMethodError {
    pub method: String,
}

/// How rendered diagrams reach the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// Embed a service GET URL; the reader's browser fetches the diagram.
    #[default]
    Get,
    /// Fetch at build time and embed a generated asset file.
    Post,
}

impl FromStr for HttpMethod {
    type Err = ParseHttpMethodError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            _ => Err(ParseHttpMethodError {
                method: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown tag format: {format}")]
pub struct ParseTagFormatError {
    pub format: String,
}

/// The HTML shape a diagram embed takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagFormat {
    #[default]
    Img,
    Object,
    /// Inline the fetched SVG document itself.
    Svg,
}

impl FromStr for TagFormat {
    type Err = ParseTagFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "img" => Ok(Self::Img),
            "object" => Ok(Self::Object),
            "svg" => Ok(Self::Svg),
            _ => Err(ParseTagFormatError {
                format: s.to_string(),
            }),
        }
    }
}

/// Site-wide settings applied to every diagram block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KrokiConfig {
    /// Rendering service endpoint.
    pub server_url: String,
    pub http_method: HttpMethod,
    /// `User-Agent` sent on every request to the service.
    pub user_agent: String,
    /// Info-string prefix marking a fence as a diagram, e.g. `kroki-plantuml`.
    /// An empty prefix matches bare type names.
    pub fence_prefix: String,
    pub tag_format: TagFormat,
    /// Preferred output formats, tried in order until the diagram type
    /// supports one.
    pub file_types: Vec<OutputFormat>,
    /// Per-diagram-type format overrides, keyed by type id.
    pub file_type_overrides: IndexMap<String, OutputFormat>,
    /// Directory (under the site output root) for artifacts written in
    /// `post` mode.
    pub assets_dir: String,
    /// Abort the page on the first failing diagram block instead of leaving
    /// it untouched.
    pub fail_fast: bool,
    pub enable_blockdiag: bool,
    pub enable_bpmn: bool,
    pub enable_excalidraw: bool,
    pub enable_mermaid: bool,
    pub enable_diagramsnet: bool,
    /// Site-wide diagram background for light color schemes.
    pub diagram_background_color_light: Option<String>,
    /// Site-wide diagram background for dark color schemes.
    pub diagram_background_color_dark: Option<String>,
}

impl Default for KrokiConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            http_method: HttpMethod::Get,
            user_agent: concat!("krokidoc/", env!("CARGO_PKG_VERSION")).to_string(),
            fence_prefix: "kroki-".to_string(),
            tag_format: TagFormat::Img,
            file_types: vec![OutputFormat::Svg],
            file_type_overrides: IndexMap::new(),
            assets_dir: "kroki_generated".to_string(),
            fail_fast: false,
            enable_blockdiag: true,
            enable_bpmn: true,
            enable_excalidraw: true,
            enable_mermaid: true,
            enable_diagramsnet: false,
            diagram_background_color_light: None,
            diagram_background_color_dark: None,
        }
    }
}

impl KrokiConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Loads a config file and applies the environment override.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&text)?;
        config.apply_env();
        Ok(config)
    }

    /// Applies `KROKIDOC_SERVER` over the configured server URL when set and
    /// non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(server) = std::env::var(SERVER_ENV_VAR) {
            if !server.trim().is_empty() {
                self.server_url = server;
            }
        }
    }
}
