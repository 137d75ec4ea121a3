//! GET-request encoding: zlib deflate + URL-safe base64.

use std::io::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use indexmap::IndexMap;
use url::Url;

use crate::error::{Error, Result};
use crate::registry::OutputFormat;

/// Encodes diagram source for use as a GET URL path segment.
///
/// The service expects zlib-deflated source (maximum compression) in padded
/// URL-safe base64.
pub fn deflate_base64(source: &str) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(source.as_bytes())
        .expect("writing to a Vec cannot fail");
    let compressed = encoder.finish().expect("writing to a Vec cannot fail");
    URL_SAFE.encode(compressed)
}

/// Builds the GET embed URL for one diagram.
///
/// Layout: `<server>/<type>/<format>/<encoded>`, with renderer options
/// appended as query parameters in option order.
pub fn get_url(
    server_url: &str,
    diagram_type: &str,
    format: OutputFormat,
    source: &str,
    options: &IndexMap<String, String>,
) -> Result<String> {
    let mut url = Url::parse(server_url).map_err(|e| Error::InvalidServerUrl {
        url: server_url.to_string(),
        message: e.to_string(),
    })?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| Error::InvalidServerUrl {
                url: server_url.to_string(),
                message: "cannot be a base URL".to_string(),
            })?;
        segments.pop_if_empty();
        segments.push(diagram_type);
        segments.push(format.as_str());
        segments.push(&deflate_base64(source));
    }

    if !options.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in options {
            pairs.append_pair(key, value);
        }
    }

    Ok(url.to_string())
}
