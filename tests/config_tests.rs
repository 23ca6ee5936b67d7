//! Tests for field configuration: builder, settings JSON and manual policies

use richtext_refs::config::{FieldConfig, FieldSettings, ManualPolicyConfig};
use richtext_refs::ContentError;

mod common;

#[test]
fn test_settings_json_round_trip() {
    let json = r#"{
        "removeNbsp": true,
        "supportsMb4": false,
        "capabilities": ["alignment", "fontsize"],
        "purifierConfig": {"allowedTags": ["section"]}
    }"#;
    let settings = FieldSettings::from_json(json).unwrap();
    assert!(settings.purify_html);
    assert!(settings.remove_nbsp);

    let config = settings.into_config().unwrap();
    assert!(config.remove_nbsp());
    assert!(!config.supports_mb4());
    assert!(config.policy().tags.contains("section"));
    let styles = config.allowed_styles();
    assert!(styles.contains("text-align"));
    assert!(styles.contains("font-size"));
    assert!(!styles.contains("color"));
}

#[test]
fn test_empty_settings_use_defaults() {
    let config = FieldConfig::from_settings_json("{}").unwrap();
    assert!(config.purify_html());
    assert!(config.remove_empty_tags());
    assert!(config.allowed_styles().is_empty());
}

#[test]
fn test_malformed_settings_rejected() {
    let err = FieldConfig::from_settings_json(r#"{"removeNbsp": "yes"}"#).unwrap_err();
    assert!(matches!(err, ContentError::MalformedManualConfig(_)));
}

#[test]
fn test_unknown_manual_policy_key_rejected() {
    let err = ManualPolicyConfig::from_json(r#"{"allowTags": ["section"]}"#).unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_manual_iframe_pattern_validated_at_build() {
    let err = FieldConfig::builder()
        .manual_policy_json(r#"{"safeIframePattern": "(unclosed"}"#)
        .build()
        .unwrap_err();
    assert!(matches!(err, ContentError::MalformedManualConfig(_)));
}

#[test]
fn test_manual_iframe_pattern_replaces_default() {
    let config = FieldConfig::builder()
        .manual_policy_json(r#"{"safeIframePattern": "^https://maps\\.example\\.com/"}"#)
        .build()
        .unwrap();
    let iframe = config.policy().iframe.as_ref().unwrap();
    assert!(iframe.permits("https://maps.example.com/embed?q=1"));
    assert!(!iframe.permits("https://www.youtube.com/embed/abc"));
}

#[test]
fn test_conflicting_policy_rejected_at_build() {
    let err = FieldConfig::builder()
        .manual_policy_json(r#"{"allowedAttributes": {"div": ["class"]}}"#)
        .build()
        .unwrap_err();
    assert!(matches!(err, ContentError::SanitizerPolicy(_)));

    let err = FieldConfig::builder()
        .policy_extension(|policy| {
            policy.allow_tag("script");
        })
        .build()
        .unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_zero_size_ceiling_rejected() {
    assert!(FieldConfig::builder().max_html_size(0).build().is_err());
}

#[test]
fn test_capabilities_from_slice() {
    let enabled: &[&str] = &["fontcolor", "unknown"];
    let config = FieldConfig::builder()
        .capabilities_from(enabled)
        .build()
        .unwrap();
    assert_eq!(
        config.allowed_styles().into_iter().collect::<Vec<_>>(),
        vec!["color"]
    );
}

#[test]
fn test_config_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FieldConfig>();
    let config = common::styled_config();
    let copy = config.clone();
    assert_eq!(config.allowed_styles(), copy.allowed_styles());
}
