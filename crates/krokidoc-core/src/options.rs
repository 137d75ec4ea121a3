use std::str::FromStr;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Error, Result};

#[derive(Debug, thiserror::Error)]
#[error("Unknown alignment: {alignment}")]
pub struct ParseAlignError {
    pub alignment: String,
}

/// Horizontal placement of a rendered diagram within the page flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl FromStr for Align {
    type Err = ParseAlignError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(ParseAlignError {
                alignment: s.to_string(),
            }),
        }
    }
}

/// Options scoped to a single diagram block, taken from the fence info
/// string's `{key=value ...}` attribute list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockOptions {
    /// Background for light color schemes, overriding the site-wide value.
    pub bg_light: Option<String>,
    /// Background for dark color schemes, overriding the site-wide value.
    pub bg_dark: Option<String>,
    /// CSS width for the embed, e.g. `500px` or `80%`.
    pub display_width: Option<String>,
    pub display_align: Option<Align>,
    /// Unrecognized pairs, forwarded verbatim to the rendering service.
    pub render_options: IndexMap<String, String>,
}

/// A fence info string split into its language token and raw option list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FenceInfo<'a> {
    pub lang: &'a str,
    /// The content between `{` and `}`, unparsed.
    pub options: Option<&'a str>,
}

fn fence_info_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<lang>[^\s{}]+)\s*(?:\{(?P<opts>[^}]*)\}\s*)?$").expect("valid regex")
    })
}

/// Splits a fence info string into language and brace option list.
///
/// Info strings that do not have the `lang` or `lang {options}` shape are not
/// diagram fences; those return `None` and the block is left alone.
pub fn split_fence_info(info: &str) -> Option<FenceInfo<'_>> {
    let caps = fence_info_regex().captures(info)?;
    let lang = caps.name("lang")?.as_str();
    let options = caps.name("opts").map(|m| m.as_str());
    Some(FenceInfo { lang, options })
}

/// Parses a brace option list into [`BlockOptions`].
///
/// Pairs are whitespace-separated `key=value` tokens; values are taken
/// verbatim (colors like `#1a2b3c` need no quoting). Keys the processor does
/// not consume itself are collected for the rendering service.
pub fn parse_block_options(list: &str) -> Result<BlockOptions> {
    let mut options = BlockOptions::default();

    for pair in list.split_whitespace() {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::MalformedOptions {
                options: list.trim().to_string(),
            });
        };
        if key.is_empty() || value.is_empty() {
            return Err(Error::MalformedOptions {
                options: list.trim().to_string(),
            });
        }

        match key {
            "bg-light" => options.bg_light = Some(value.to_string()),
            "bg-dark" => options.bg_dark = Some(value.to_string()),
            "display-width" => options.display_width = Some(value.to_string()),
            "display-align" => {
                let align = value.parse().map_err(|_| Error::MalformedOptions {
                    options: list.trim().to_string(),
                })?;
                options.display_align = Some(align);
            }
            _ => {
                options
                    .render_options
                    .insert(key.to_string(), value.to_string());
            }
        }
    }

    Ok(options)
}
