use crate::*;

#[test]
fn empty_mapping_parses_to_defaults() {
    let config = KrokiConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, KrokiConfig::default());
}

#[test]
fn yaml_settings_land_in_the_typed_config() {
    let config = KrokiConfig::from_yaml_str(
        "server_url: \"https://kroki.internal\"\n\
         http_method: post\n\
         tag_format: object\n\
         fence_prefix: \"\"\n\
         file_types: [png, svg]\n\
         file_type_overrides: {graphviz: pdf}\n\
         assets_dir: rendered\n\
         fail_fast: true\n\
         enable_diagramsnet: true\n\
         diagram_background_color_light: white\n",
    )
    .unwrap();

    assert_eq!(config.server_url, "https://kroki.internal");
    assert_eq!(config.http_method, HttpMethod::Post);
    assert_eq!(config.tag_format, TagFormat::Object);
    assert_eq!(config.fence_prefix, "");
    assert_eq!(config.file_types, vec![OutputFormat::Png, OutputFormat::Svg]);
    assert_eq!(
        config.file_type_overrides.get("graphviz"),
        Some(&OutputFormat::Pdf)
    );
    assert_eq!(config.assets_dir, "rendered");
    assert!(config.fail_fast);
    assert!(config.enable_diagramsnet);
    assert_eq!(
        config.diagram_background_color_light.as_deref(),
        Some("white")
    );

    // Unset keys keep their defaults.
    assert!(config.enable_mermaid);
    assert_eq!(config.diagram_background_color_dark, None);
    assert_eq!(
        config.user_agent,
        concat!("krokidoc/", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn unknown_keys_are_rejected_by_name() {
    let err = KrokiConfig::from_yaml_str("server_urll: \"https://typo.example\"\n").unwrap_err();

    assert!(matches!(err, Error::InvalidConfig { .. }));
    let message = err.to_string();
    assert!(message.contains("server_urll"), "got {message}");
}

#[test]
fn malformed_yaml_is_an_invalid_config_error() {
    let err = KrokiConfig::from_yaml_str("file_types: [svg").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn load_reads_the_file_and_reports_missing_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("krokidoc.yml");
    std::fs::write(&path, "assets_dir: rendered\n").unwrap();

    let config = KrokiConfig::load(&path).unwrap();
    assert_eq!(config.assets_dir, "rendered");

    let err = KrokiConfig::load(&tmp.path().join("absent.yml")).unwrap_err();
    assert!(matches!(err, Error::ConfigIo { .. }));
}
