//! Background-color resolution and style-attribute composition.

use crate::config::KrokiConfig;
use crate::options::{Align, BlockOptions};

/// Resolves the effective CSS `background` declaration value for one diagram.
///
/// The light and dark channels resolve independently: a per-diagram value
/// wins over the site-wide value for its own channel and leaves the other
/// channel alone. Values pass through verbatim.
///
/// - both channels absent: `None` (no declaration at all)
/// - one channel resolved: that color alone
/// - both resolved: `light-dark(<light>, <dark>)`
pub fn resolve_background(
    global_light: Option<&str>,
    global_dark: Option<&str>,
    block_light: Option<&str>,
    block_dark: Option<&str>,
) -> Option<String> {
    let light = block_light.or(global_light);
    let dark = block_dark.or(global_dark);

    match (light, dark) {
        (Some(light), Some(dark)) => Some(format!("light-dark({light}, {dark})")),
        (Some(light), None) => Some(light.to_string()),
        (None, Some(dark)) => Some(dark.to_string()),
        (None, None) => None,
    }
}

/// Composes the `style` attribute value for one diagram embed.
///
/// Declarations are `; `-joined in a fixed order: width, alignment, then
/// background last. Returns `None` when nothing applies so the tag can omit
/// the attribute entirely.
pub fn compose_style(config: &KrokiConfig, options: &BlockOptions) -> Option<String> {
    let mut declarations: Vec<String> = Vec::new();

    if let Some(width) = &options.display_width {
        declarations.push(format!("width: {width}"));
    }

    match options.display_align {
        Some(Align::Center) => {
            declarations.push("display: block".to_string());
            declarations.push("margin-left: auto".to_string());
            declarations.push("margin-right: auto".to_string());
        }
        Some(Align::Right) => {
            declarations.push("display: block".to_string());
            declarations.push("margin-left: auto".to_string());
        }
        Some(Align::Left) => {
            declarations.push("display: block".to_string());
            declarations.push("margin-right: auto".to_string());
        }
        None => {}
    }

    if let Some(background) = resolve_background(
        config.diagram_background_color_light.as_deref(),
        config.diagram_background_color_dark.as_deref(),
        options.bg_light.as_deref(),
        options.bg_dark.as_deref(),
    ) {
        declarations.push(format!("background: {background}"));
    }

    if declarations.is_empty() {
        None
    } else {
        Some(declarations.join("; "))
    }
}
