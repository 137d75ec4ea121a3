use crate::*;

fn config_with_backgrounds(light: Option<&str>, dark: Option<&str>) -> KrokiConfig {
    KrokiConfig {
        diagram_background_color_light: light.map(str::to_string),
        diagram_background_color_dark: dark.map(str::to_string),
        ..KrokiConfig::default()
    }
}

#[test]
fn background_absent_everywhere_resolves_to_none() {
    assert_eq!(resolve_background(None, None, None, None), None);
}

#[test]
fn global_light_alone_resolves_to_plain_color() {
    assert_eq!(
        resolve_background(Some("white"), None, None, None).as_deref(),
        Some("white")
    );
}

#[test]
fn global_dark_alone_resolves_to_plain_color() {
    assert_eq!(
        resolve_background(None, Some("#1a1a1a"), None, None).as_deref(),
        Some("#1a1a1a")
    );
}

#[test]
fn both_globals_combine_into_light_dark() {
    assert_eq!(
        resolve_background(Some("white"), Some("#333"), None, None).as_deref(),
        Some("light-dark(white, #333)")
    );
}

#[test]
fn block_light_overrides_global_light_and_keeps_global_dark() {
    assert_eq!(
        resolve_background(Some("white"), Some("#333"), Some("#eee"), None).as_deref(),
        Some("light-dark(#eee, #333)")
    );
}

#[test]
fn block_dark_overrides_global_dark_and_keeps_global_light() {
    assert_eq!(
        resolve_background(Some("white"), Some("#333"), None, Some("#222")).as_deref(),
        Some("light-dark(white, #222)")
    );
}

#[test]
fn block_values_override_both_channels() {
    assert_eq!(
        resolve_background(Some("white"), Some("#333"), Some("#fff"), Some("#000")).as_deref(),
        Some("light-dark(#fff, #000)")
    );
}

#[test]
fn block_values_apply_without_any_global() {
    assert_eq!(
        resolve_background(None, None, Some("yellow"), Some("navy")).as_deref(),
        Some("light-dark(yellow, navy)")
    );
}

#[test]
fn block_light_alone_stays_a_single_color() {
    assert_eq!(
        resolve_background(None, None, Some("#eee"), None).as_deref(),
        Some("#eee")
    );
}

#[test]
fn single_resolved_channel_never_emits_light_dark() {
    for resolved in [
        resolve_background(Some("white"), None, None, None),
        resolve_background(None, Some("#222"), None, None),
        resolve_background(None, None, Some("cornsilk"), None),
        resolve_background(None, None, None, Some("#0a0a0a")),
    ] {
        let value = resolved.unwrap();
        assert!(
            !value.contains("light-dark"),
            "unexpected light-dark in {value}"
        );
    }
}

#[test]
fn color_values_pass_through_verbatim() {
    assert_eq!(
        resolve_background(Some("not a color!!"), None, None, None).as_deref(),
        Some("not a color!!")
    );
    assert_eq!(
        resolve_background(Some("rgb(1, 2, 3)"), Some("VAR(--bg)"), None, None).as_deref(),
        Some("light-dark(rgb(1, 2, 3), VAR(--bg))")
    );
}

#[test]
fn compose_style_returns_none_without_declarations() {
    let config = KrokiConfig::default();
    assert_eq!(compose_style(&config, &BlockOptions::default()), None);
}

#[test]
fn compose_style_emits_background_alone() {
    let config = config_with_backgrounds(Some("white"), None);
    assert_eq!(
        compose_style(&config, &BlockOptions::default()).as_deref(),
        Some("background: white")
    );
}

#[test]
fn compose_style_orders_width_then_align_then_background() {
    let config = config_with_backgrounds(Some("white"), Some("#333"));
    let options = BlockOptions {
        display_width: Some("500px".to_string()),
        display_align: Some(Align::Center),
        ..BlockOptions::default()
    };
    assert_eq!(
        compose_style(&config, &options).as_deref(),
        Some(
            "width: 500px; display: block; margin-left: auto; margin-right: auto; \
             background: light-dark(white, #333)"
        )
    );
}

#[test]
fn compose_style_align_right_pushes_left_margin_only() {
    let options = BlockOptions {
        display_align: Some(Align::Right),
        ..BlockOptions::default()
    };
    assert_eq!(
        compose_style(&KrokiConfig::default(), &options).as_deref(),
        Some("display: block; margin-left: auto")
    );
}

#[test]
fn compose_style_align_left_pushes_right_margin_only() {
    let options = BlockOptions {
        display_align: Some(Align::Left),
        ..BlockOptions::default()
    };
    assert_eq!(
        compose_style(&KrokiConfig::default(), &options).as_deref(),
        Some("display: block; margin-right: auto")
    );
}

#[test]
fn compose_style_width_alone_has_no_trailing_separator() {
    let options = BlockOptions {
        display_width: Some("80%".to_string()),
        ..BlockOptions::default()
    };
    assert_eq!(
        compose_style(&KrokiConfig::default(), &options).as_deref(),
        Some("width: 80%")
    );
}

#[test]
fn compose_style_block_background_wins_over_config() {
    let config = config_with_backgrounds(Some("white"), Some("#333"));
    let options = BlockOptions {
        bg_light: Some("#eee".to_string()),
        ..BlockOptions::default()
    };
    assert_eq!(
        compose_style(&config, &options).as_deref(),
        Some("background: light-dark(#eee, #333)")
    );
}
