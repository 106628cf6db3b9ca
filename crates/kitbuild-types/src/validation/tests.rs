//! Tests for config validation.

use super::*;
use crate::error::{ErrorCode, WarningCode};

fn error_codes(result: &ValidationResult) -> Vec<ErrorCode> {
    result.errors.iter().map(|e| e.code).collect()
}

fn warning_codes(result: &ValidationResult) -> Vec<WarningCode> {
    result.warnings.iter().map(|w| w.code).collect()
}

// ============================================================================
// Typed Config Tests
// ============================================================================

#[test]
fn test_default_config_is_valid() {
    let result = validate_config(&KitConfig::default());
    assert!(result.is_ok());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_bad_prerender_entry() {
    let mut config = KitConfig::default();
    config.prerender.entries = vec!["*".into(), "/ok".into(), "relative".into()];
    let result = validate_config(&config);
    assert_eq!(error_codes(&result), vec![ErrorCode::InvalidPrerenderEntry]);
    assert_eq!(result.errors[0].path.as_deref(), Some("prerender.entries[2]"));
}

#[test]
fn test_nothing_to_prerender_warns() {
    let mut config = KitConfig::default();
    config.prerender.entries.clear();
    config.prerender.crawl = false;
    let result = validate_config(&config);
    assert!(result.is_ok());
    assert_eq!(warning_codes(&result), vec![WarningCode::NoPrerenderEntries]);

    config.prerender.crawl = true;
    assert!(validate_config(&config).warnings.is_empty());
}

#[test]
fn test_unsafe_out_dir() {
    let mut config = KitConfig::default();
    config.out_dir = "../build".into();
    let result = validate_config(&config);
    assert_eq!(error_codes(&result), vec![ErrorCode::UnsafePath]);
    assert_eq!(result.errors[0].path.as_deref(), Some("out_dir"));
}

#[test]
fn test_prerender_concurrency_and_origin() {
    let mut config = KitConfig::default();
    config.prerender.concurrency = 0;
    config.prerender.origin = "kitbuild.dev".into();
    let result = validate_config(&config);
    assert_eq!(
        error_codes(&result),
        vec![ErrorCode::MalformedConfig, ErrorCode::MalformedConfig]
    );
}

// ============================================================================
// JSON Config Tests
// ============================================================================

#[test]
fn test_json_collects_every_csp_error() {
    let json = r#"{
        "csp": {
            "directives": {
                "script-src": ["self", "nonce-"],
                "img-src": ["ftp:"],
                "style-source": ["self"]
            }
        }
    }"#;
    let (config, result) = validate_config_json(json);
    assert!(config.is_none());
    assert_eq!(
        error_codes(&result),
        vec![
            ErrorCode::InvalidCspSource,
            ErrorCode::InvalidCspSource,
            ErrorCode::UnknownCspDirective,
        ]
    );
    let paths: Vec<_> = result.errors.iter().filter_map(|e| e.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            "csp.directives.img-src",
            "csp.directives.script-src",
            "csp.directives.style-source",
        ]
    );
}

#[test]
fn test_json_deprecated_directive_warns() {
    let json = r#"{
        "csp": { "directives": { "default-src": ["self"], "block-all-mixed-content": true } }
    }"#;
    let (config, result) = validate_config_json(json);
    assert!(config.is_some());
    assert!(result.is_ok());
    assert_eq!(warning_codes(&result), vec![WarningCode::DeprecatedCspDirective]);
    assert_eq!(
        result.warnings[0].path.as_deref(),
        Some("csp.directives.block-all-mixed-content")
    );
}

#[test]
fn test_json_report_only_without_target() {
    let json = r#"{ "csp": { "report_only": { "script-src": ["self"] } } }"#;
    let (_, result) = validate_config_json(json);
    assert_eq!(error_codes(&result), vec![ErrorCode::MissingReportTarget]);
}

#[test]
fn test_json_malformed() {
    let (config, result) = validate_config_json("{ not json");
    assert!(config.is_none());
    assert_eq!(error_codes(&result), vec![ErrorCode::MalformedConfig]);

    let (_, result) = validate_config_json("[]");
    assert_eq!(error_codes(&result), vec![ErrorCode::MalformedConfig]);

    let (_, result) = validate_config_json(r#"{ "prerender": { "crawl": "yes" } }"#);
    assert_eq!(error_codes(&result), vec![ErrorCode::MalformedConfig]);
}

#[test]
fn test_json_valid_config() {
    let json = r#"{
        "csp": { "mode": "auto", "directives": { "default-src": ["self"] } },
        "prerender": { "handle_http_error": "warn", "entries": ["*"] }
    }"#;
    let (config, result) = validate_config_json(json);
    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert!(config.is_some());
}
