use crate::options::{parse_block_options, split_fence_info};
use crate::*;

#[test]
fn split_recognizes_bare_language() {
    let fence = split_fence_info("kroki-plantuml").unwrap();
    assert_eq!(fence.lang, "kroki-plantuml");
    assert_eq!(fence.options, None);
}

#[test]
fn split_recognizes_language_with_brace_list() {
    let fence = split_fence_info("plantuml {bg-light=#eee display-width=500px}").unwrap();
    assert_eq!(fence.lang, "plantuml");
    assert_eq!(fence.options, Some("bg-light=#eee display-width=500px"));
}

#[test]
fn split_tolerates_surrounding_whitespace() {
    let fence = split_fence_info("  mermaid  {theme=forest}  ").unwrap();
    assert_eq!(fence.lang, "mermaid");
    assert_eq!(fence.options, Some("theme=forest"));
}

#[test]
fn split_keeps_empty_brace_list() {
    let fence = split_fence_info("plantuml {}").unwrap();
    assert_eq!(fence.lang, "plantuml");
    assert_eq!(fence.options, Some(""));
}

#[test]
fn split_rejects_info_strings_with_extra_words() {
    // Other tooling's info strings (e.g. `python title="x"`) are not ours.
    assert_eq!(split_fence_info("python title=\"x\""), None);
    assert_eq!(split_fence_info("foo bar baz"), None);
    assert_eq!(split_fence_info(""), None);
}

#[test]
fn parse_collects_the_styling_keys() {
    let options =
        parse_block_options("bg-light=#eee bg-dark=#222 display-width=500px display-align=center")
            .unwrap();
    assert_eq!(options.bg_light.as_deref(), Some("#eee"));
    assert_eq!(options.bg_dark.as_deref(), Some("#222"));
    assert_eq!(options.display_width.as_deref(), Some("500px"));
    assert_eq!(options.display_align, Some(Align::Center));
    assert!(options.render_options.is_empty());
}

#[test]
fn parse_forwards_unknown_keys_in_order() {
    let options = parse_block_options("theme=forest scale=2 bg-light=white").unwrap();
    let forwarded: Vec<(&str, &str)> = options
        .render_options
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(forwarded, vec![("theme", "forest"), ("scale", "2")]);
    assert_eq!(options.bg_light.as_deref(), Some("white"));
}

#[test]
fn parse_keeps_hash_values_verbatim() {
    let options = parse_block_options("bg-dark=#1a1a1a").unwrap();
    assert_eq!(options.bg_dark.as_deref(), Some("#1a1a1a"));
}

#[test]
fn parse_empty_list_yields_defaults() {
    assert_eq!(parse_block_options("").unwrap(), BlockOptions::default());
    assert_eq!(parse_block_options("   ").unwrap(), BlockOptions::default());
}

#[test]
fn parse_rejects_pairs_without_equals() {
    let err = parse_block_options("bg-light").unwrap_err();
    assert!(matches!(err, Error::MalformedOptions { .. }));
}

#[test]
fn parse_rejects_empty_keys_and_values() {
    assert!(parse_block_options("=white").is_err());
    assert!(parse_block_options("bg-light=").is_err());
}

#[test]
fn parse_rejects_unknown_alignment() {
    let err = parse_block_options("display-align=middle").unwrap_err();
    assert!(matches!(err, Error::MalformedOptions { .. }));
}

#[test]
fn align_parses_case_insensitively() {
    assert_eq!("LEFT".parse::<Align>().unwrap(), Align::Left);
    assert_eq!("Center".parse::<Align>().unwrap(), Align::Center);
    assert_eq!(" right ".parse::<Align>().unwrap(), Align::Right);
    assert!("top".parse::<Align>().is_err());
}
