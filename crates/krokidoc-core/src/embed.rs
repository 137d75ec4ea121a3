//! Embed-tag emission for rendered diagrams.
//!
//! All three shapes carry a fixed identifying attribute (`alt="Kroki"` on
//! `<img>`, `id="Kroki"` on `<object>` and inline `<svg>`) so site CSS and
//! scripts can address every generated embed uniformly.

use std::cell::Cell;

use htmlize::escape_attribute;
use lol_html::{RewriteStrSettings, element, rewrite_str};

use crate::error::{Error, Result};
use crate::registry::OutputFormat;

pub fn img_tag(src: &str, style: Option<&str>) -> String {
    let mut tag = format!(r#"<img alt="Kroki" src="{}""#, escape_attribute(src));
    if let Some(style) = style {
        tag.push_str(&format!(r#" style="{}""#, escape_attribute(style)));
    }
    tag.push_str(" />");
    tag
}

pub fn object_tag(src: &str, format: OutputFormat, style: Option<&str>) -> String {
    let mut tag = format!(
        r#"<object type="{}" id="Kroki" data="{}""#,
        format.mime_type(),
        escape_attribute(src)
    );
    if let Some(style) = style {
        tag.push_str(&format!(r#" style="{}""#, escape_attribute(style)));
    }
    tag.push_str("></object>");
    tag
}

/// Prepares a fetched SVG document for inlining into Markdown.
///
/// The root `<svg>` element gets `id="Kroki"` and the composed style; the XML
/// prolog and doctype are dropped, and blank lines are removed so a Markdown
/// renderer cannot split the document into separate raw-HTML chunks.
pub fn inline_svg(svg: &str, style: Option<&str>) -> Result<String> {
    let body = strip_xml_prolog(svg);

    // Nested `<svg>` elements are legal; only the document root is tagged.
    let tagged_root = Cell::new(false);
    let rewritten = rewrite_str(
        body,
        RewriteStrSettings {
            element_content_handlers: vec![element!("svg", |el| {
                if !tagged_root.replace(true) {
                    el.set_attribute("id", "Kroki")?;
                    if let Some(style) = style {
                        el.set_attribute("style", style)?;
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| Error::InvalidSvg {
        message: e.to_string(),
    })?;

    Ok(remove_blank_lines(&rewritten))
}

fn strip_xml_prolog(svg: &str) -> &str {
    let mut rest = svg.trim_start();
    loop {
        if rest.starts_with("<?") {
            let Some(end) = rest.find("?>") else { break };
            rest = rest[end + 2..].trim_start();
            continue;
        }
        if rest
            .get(..9)
            .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"))
        {
            let Some(end) = rest.find('>') else { break };
            rest = rest[end + 1..].trim_start();
            continue;
        }
        break;
    }
    rest
}

fn remove_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
