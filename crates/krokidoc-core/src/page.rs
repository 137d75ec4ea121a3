//! Single-page transformation: locate diagram fences, render, splice embeds.
//!
//! Replacement happens by byte range over the original text, so everything
//! outside recognized diagram fences survives byte-for-byte.

use std::ops::Range;
use std::path::{Path, PathBuf};

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{HttpMethod, KrokiConfig, TagFormat};
use crate::embed;
use crate::encode;
use crate::error::{Error, Result};
use crate::options::{self, BlockOptions};
use crate::registry::{DiagramRegistry, DiagramSpec, OutputFormat};
use crate::render::{DiagramRenderer, RenderRequest};
use crate::style;

/// First-line directive loading the diagram source from a file instead of
/// the fence body.
pub const FROM_FILE_PREFIX: &str = "@from_file:";

/// Where a page sits relative to the docs tree.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Page path relative to the docs root, e.g. `guide/arch.md`. Asset
    /// hrefs climb one `../` per directory level.
    pub rel_path: PathBuf,
    /// Root for `@from_file:` reads; paths resolve against the working
    /// directory when unset.
    pub docs_root: Option<PathBuf>,
}

/// A rendered diagram to be written under the site output root.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Path relative to the site output root.
    pub rel_path: PathBuf,
    pub bytes: Vec<u8>,
}

/// A diagram block that could not be rendered (when not failing fast).
#[derive(Debug)]
pub struct BlockFailure {
    pub diagram_type: String,
    /// Byte offset of the fence in the page source.
    pub offset: usize,
    pub error: Error,
}

/// Result of transforming one page.
#[derive(Debug)]
pub struct ProcessedPage {
    pub markdown: String,
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<BlockFailure>,
}

struct FencedBlock {
    /// Byte range of the whole fence, opening line through closing line.
    span: Range<usize>,
    info: String,
    body: String,
}

fn collect_fences(page: &str) -> Vec<FencedBlock> {
    let parser = Parser::new_ext(page, Options::empty());
    let mut blocks = Vec::new();
    let mut current: Option<FencedBlock> = None;

    for (event, span) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                current = Some(FencedBlock {
                    span: span.clone(),
                    info: info.to_string(),
                    body: String::new(),
                });
            }
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.body.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(mut block) = current.take() {
                    block.span.end = span.end;
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}

fn strip_fence_prefix<'a>(lang: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(lang);
    }
    lang.strip_prefix(prefix)
}

/// Resolves the output format for one diagram type under this config.
///
/// Overrides win when the type supports them; otherwise the first supported
/// entry of `file_types`; otherwise the type's own first format.
pub(crate) fn effective_format(config: &KrokiConfig, spec: &DiagramSpec) -> Result<OutputFormat> {
    if let Some(format) = config.file_type_overrides.get(spec.id) {
        if spec.supports(*format) {
            return Ok(*format);
        }
        warn!(
            "{} does not support the configured override {format}; falling back",
            spec.id
        );
    }

    for format in &config.file_types {
        if spec.supports(*format) {
            return Ok(*format);
        }
    }

    match spec.formats.first() {
        Some(format) => {
            warn!(
                "{} supports none of the configured file types; using {format}",
                spec.id
            );
            Ok(*format)
        }
        None => Err(Error::UnsupportedFormat {
            diagram_type: spec.id.to_string(),
            format: config
                .file_types
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

fn load_source(body: &str, ctx: &PageContext) -> Result<String> {
    let trimmed = body.trim();
    let Some(rel) = trimmed.strip_prefix(FROM_FILE_PREFIX) else {
        return Ok(body.to_string());
    };

    let rel = rel.trim();
    let path = match &ctx.docs_root {
        Some(root) => root.join(rel),
        None => PathBuf::from(rel),
    };
    std::fs::read_to_string(&path).map_err(|source| Error::FromFile { path, source })
}

fn fetch(
    renderer: Option<&dyn DiagramRenderer>,
    spec: &DiagramSpec,
    format: OutputFormat,
    source: &str,
    options: &BlockOptions,
) -> Result<Vec<u8>> {
    let Some(renderer) = renderer else {
        return Err(Error::RendererRequired {
            diagram_type: spec.id.to_string(),
        });
    };

    let request = RenderRequest {
        diagram_type: spec.id.to_string(),
        output_format: format,
        source: source.to_string(),
        options: options.render_options.clone(),
    };
    renderer.render(&request).map_err(|source| Error::Render {
        diagram_type: spec.id.to_string(),
        source,
    })
}

fn artifact_rel_path(assets_dir: &str, diagram_type: &str, format: OutputFormat) -> PathBuf {
    let token = Uuid::new_v4().simple().to_string();
    let name = format!("{diagram_type}-{}.{}", &token[..12], format.extension());
    Path::new(assets_dir).join(name)
}

fn page_relative_href(artifact: &Path, page: &Path) -> String {
    let depth = page.parent().map(|p| p.components().count()).unwrap_or(0);
    let mut href = String::new();
    for _ in 0..depth {
        href.push_str("../");
    }
    href.push_str(&artifact.to_string_lossy().replace('\\', "/"));
    href
}

// `svg` embeds return before URL/artifact planning, so only the two
// URL-carrying shapes reach this.
fn url_embed(tag: TagFormat, src: &str, format: OutputFormat, style: Option<&str>) -> String {
    match tag {
        TagFormat::Object => embed::object_tag(src, format, style),
        _ => embed::img_tag(src, style),
    }
}

fn render_block(
    config: &KrokiConfig,
    renderer: Option<&dyn DiagramRenderer>,
    ctx: &PageContext,
    spec: &DiagramSpec,
    opts_list: Option<&str>,
    body: &str,
) -> Result<(String, Option<Artifact>)> {
    let options = match opts_list {
        Some(list) => options::parse_block_options(list)?,
        None => BlockOptions::default(),
    };
    let source = load_source(body, ctx)?;
    let style = style::compose_style(config, &options);
    let style = style.as_deref();

    if config.tag_format == TagFormat::Svg {
        // Inlining needs the document body regardless of the embed method.
        let bytes = fetch(renderer, spec, OutputFormat::Svg, &source, &options)?;
        let text = String::from_utf8(bytes).map_err(|e| Error::InvalidSvg {
            message: e.to_string(),
        })?;
        return Ok((embed::inline_svg(&text, style)?, None));
    }

    let format = effective_format(config, spec)?;
    match config.http_method {
        HttpMethod::Get => {
            let url = encode::get_url(
                &config.server_url,
                spec.id,
                format,
                &source,
                &options.render_options,
            )?;
            Ok((url_embed(config.tag_format, &url, format, style), None))
        }
        HttpMethod::Post => {
            let bytes = fetch(renderer, spec, format, &source, &options)?;
            let rel_path = artifact_rel_path(&config.assets_dir, spec.id, format);
            let href = page_relative_href(&rel_path, &ctx.rel_path);
            let markup = url_embed(config.tag_format, &href, format, style);
            Ok((markup, Some(Artifact { rel_path, bytes })))
        }
    }
}

/// Transforms one page of Markdown, replacing recognized diagram fences with
/// embeds.
///
/// Blocks whose fence language is not a known, enabled diagram type are left
/// untouched. Failing blocks follow the configured policy: with `fail_fast`
/// the first failure aborts the page; otherwise the block stays untouched
/// and the failure is recorded.
pub fn transform_page(
    config: &KrokiConfig,
    registry: &DiagramRegistry,
    renderer: Option<&dyn DiagramRenderer>,
    page: &str,
    ctx: &PageContext,
) -> Result<ProcessedPage> {
    let blocks = collect_fences(page);

    let mut markdown = String::with_capacity(page.len());
    let mut cursor = 0usize;
    let mut artifacts = Vec::new();
    let mut failures = Vec::new();

    for block in &blocks {
        let Some(fence) = options::split_fence_info(&block.info) else {
            continue;
        };
        let Some(diagram_type) = strip_fence_prefix(fence.lang, &config.fence_prefix) else {
            continue;
        };
        let Some(spec) = registry.get(diagram_type) else {
            debug!("fence language {} is not a diagram type", fence.lang);
            continue;
        };
        if !spec.gate.enabled(config) {
            debug!("diagram type {} is disabled by configuration", spec.id);
            continue;
        }

        match render_block(config, renderer, ctx, spec, fence.options, &block.body) {
            Ok((markup, artifact)) => {
                markdown.push_str(&page[cursor..block.span.start]);
                markdown.push_str(&markup);
                if page[block.span.start..block.span.end].ends_with('\n') {
                    markdown.push('\n');
                }
                cursor = block.span.end;
                artifacts.extend(artifact);
            }
            Err(error) if config.fail_fast => return Err(error),
            Err(error) => {
                warn!("leaving {} block untouched: {error}", spec.id);
                failures.push(BlockFailure {
                    diagram_type: spec.id.to_string(),
                    offset: block.span.start,
                    error,
                });
            }
        }
    }

    markdown.push_str(&page[cursor..]);

    Ok(ProcessedPage {
        markdown,
        artifacts,
        failures,
    })
}
