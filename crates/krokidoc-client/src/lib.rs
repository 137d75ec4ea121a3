#![forbid(unsafe_code)]

//! ureq-backed rendering client for Kroki-compatible services.
//!
//! Implements the [`DiagramRenderer`] seam from `krokidoc-core`: every render
//! goes out as a POST with a JSON payload, regardless of the page-embed
//! method (`get`-mode pages embed service URLs and never reach a client).

use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};
use url::Url;

use krokidoc_core::{DiagramRenderer, KrokiConfig, RenderError, RenderRequest};

/// Global timeout for all exchanges with the rendering service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum accepted response body size (32 MB).
pub const MAX_RESPONSE_BYTES: u64 = 32 * 1024 * 1024;

/// How much of an error response body is kept for diagnostics.
const ERROR_SNIPPET_CHARS: usize = 512;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid server URL '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to encode the render request: {source}")]
    Payload {
        #[source]
        source: serde_json::Error,
    },

    #[error("Request to the rendering service failed: {message}")]
    Transport { message: String },

    #[error("Rendering service responded {status}: {snippet}")]
    Http { status: u16, snippet: String },

    #[error("Failed to read the rendering service response: {message}")]
    Body { message: String },
}

impl Error {
    /// HTTP status of the failed exchange, when one completed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// JSON body of a render POST.
#[derive(Debug, Serialize)]
struct RenderPayload<'a> {
    diagram_source: &'a str,
    diagram_type: &'a str,
    output_format: &'a str,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    diagram_options: &'a IndexMap<String, String>,
}

impl<'a> From<&'a RenderRequest> for RenderPayload<'a> {
    fn from(request: &'a RenderRequest) -> Self {
        Self {
            diagram_source: &request.source,
            diagram_type: &request.diagram_type,
            output_format: request.output_format.as_str(),
            diagram_options: &request.options,
        }
    }
}

/// Blocking client for one rendering service endpoint.
#[derive(Debug, Clone)]
pub struct KrokiClient {
    agent: Agent,
    endpoint: Url,
    user_agent: String,
}

impl KrokiClient {
    pub fn new(server_url: &str, user_agent: &str) -> Result<Self> {
        let endpoint = Url::parse(server_url).map_err(|source| Error::InvalidServerUrl {
            url: server_url.to_string(),
            source,
        })?;
        Ok(Self {
            agent: agent(),
            endpoint,
            user_agent: user_agent.to_string(),
        })
    }

    pub fn from_config(config: &KrokiConfig) -> Result<Self> {
        Self::new(&config.server_url, &config.user_agent)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Renders one diagram, returning the raw response bytes.
    pub fn render_diagram(&self, request: &RenderRequest) -> Result<Vec<u8>> {
        let payload = RenderPayload::from(request);
        let body = serde_json::to_string(&payload).map_err(|source| Error::Payload { source })?;

        debug!(
            "POST {} for {} as {}",
            self.endpoint, request.diagram_type, request.output_format
        );
        let response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json")
            .header("User-Agent", self.user_agent.as_str())
            .send(body.as_str())
            .map_err(|e| Error::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        let mut body = response.into_body();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                snippet: error_snippet(body),
            });
        }

        let bytes = body
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_vec()
            .map_err(|e| Error::Body {
                message: e.to_string(),
            })?;
        debug!(
            "{} rendered {} ({} bytes)",
            request.diagram_type, request.output_format, bytes.len()
        );
        Ok(bytes)
    }
}

impl DiagramRenderer for KrokiClient {
    fn render(&self, request: &RenderRequest) -> std::result::Result<Vec<u8>, RenderError> {
        self.render_diagram(request).map_err(|e| RenderError {
            status: e.status(),
            message: e.to_string(),
        })
    }
}

/// HTTP agent with native-tls, a global timeout, and manual status handling.
fn agent() -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(REQUEST_TIMEOUT))
        .http_status_as_error(false)
        .build()
        .into()
}

fn error_snippet(mut body: ureq::Body) -> String {
    let bytes = body
        .with_config()
        .limit(64 * 1024)
        .read_to_vec()
        .unwrap_or_default();
    let text = String::from_utf8_lossy(&bytes);
    let snippet: String = text.trim().chars().take(ERROR_SNIPPET_CHARS).collect();
    if snippet.is_empty() {
        "(empty body)".to_string()
    } else {
        snippet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use krokidoc_core::OutputFormat;

    fn sample_request() -> RenderRequest {
        let mut options = IndexMap::new();
        options.insert("theme".to_string(), "forest".to_string());
        RenderRequest {
            diagram_type: "mermaid".to_string(),
            output_format: OutputFormat::Svg,
            source: "graph TD; A-->B".to_string(),
            options,
        }
    }

    #[test]
    fn payload_names_the_service_fields() {
        let request = sample_request();
        let value = serde_json::to_value(RenderPayload::from(&request)).unwrap();

        assert_eq!(value["diagram_source"], "graph TD; A-->B");
        assert_eq!(value["diagram_type"], "mermaid");
        assert_eq!(value["output_format"], "svg");
        assert_eq!(value["diagram_options"]["theme"], "forest");
    }

    #[test]
    fn payload_skips_empty_options() {
        let request = RenderRequest {
            options: IndexMap::new(),
            ..sample_request()
        };
        let json = serde_json::to_string(&RenderPayload::from(&request)).unwrap();

        assert!(!json.contains("diagram_options"), "got {json}");
    }

    #[test]
    fn error_status_comes_from_completed_exchanges_only() {
        let http = Error::Http {
            status: 400,
            snippet: "Syntax Error?".to_string(),
        };
        assert_eq!(http.status(), Some(400));

        let transport = Error::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn new_rejects_unparsable_server_urls() {
        let err = KrokiClient::new("not a url", "krokidoc-test").unwrap_err();
        assert!(matches!(err, Error::InvalidServerUrl { .. }));
    }

    #[test]
    fn from_config_uses_the_configured_endpoint() {
        let client = KrokiClient::from_config(&KrokiConfig::default()).unwrap();
        assert_eq!(client.endpoint().as_str(), "https://kroki.io/");

        let custom = KrokiConfig {
            server_url: "https://example.com/kroki".to_string(),
            ..KrokiConfig::default()
        };
        let client = KrokiClient::from_config(&custom).unwrap();
        assert_eq!(client.endpoint().as_str(), "https://example.com/kroki");
    }
}
