//! End-to-end tests for CSP config files and header rendering.

use pretty_assertions::assert_eq;

use kitbuild_cli::commands::csp::{csp_output, InlineContent};
use kitbuild_cli::commands::validate::validate_output;
use kitbuild_tests::fixtures::ProjectFixture;
use kitbuild_types::csp::{sha256_base64, CspDirective, CspHeaderBuilder, CSP_HEADER};
use kitbuild_types::{validate_config_json, ErrorCode, KitConfig, WarningCode};

const STRICT_CONFIG: &str = r#"{
    "csp": {
        "mode": "auto",
        "directives": {
            "default-src": ["self"],
            "script-src": ["self", "strict-dynamic"],
            "img-src": ["self", "data:", "https://images.example.com"],
            "frame-ancestors": ["none"],
            "upgrade-insecure-requests": true
        },
        "report_only": {
            "script-src": ["self"],
            "report-uri": ["/csp-violations"]
        }
    }
}"#;

// ============================================================================
// Config Files
// ============================================================================

#[test]
fn test_strict_config_validates() {
    let project = ProjectFixture::new();
    let path = project.write_config(STRICT_CONFIG);

    let output = validate_output(path.to_str().unwrap());
    assert!(output.success, "errors: {:?}", output.errors);
    let result = output.result.unwrap();
    assert_eq!(result.csp_directives, 5);
    assert_eq!(result.csp_report_only_directives, 2);
}

#[test]
fn test_every_bad_token_is_reported() {
    let (config, result) = validate_config_json(
        r#"{
            "csp": {
                "directives": {
                    "script-src": ["self", "'nonce-'", "sha1-deadbeef"],
                    "connect-src": ["wss://socket.example.com", "socket"],
                    "frame-src": ["strict-dynamic"],
                    "navigate-to": ["self"],
                    "plugin-src": ["none"]
                }
            }
        }"#,
    );
    assert!(config.is_none());

    let codes: Vec<(ErrorCode, Option<String>)> = result
        .errors
        .iter()
        .map(|e| (e.code, e.path.clone()))
        .collect();
    assert_eq!(
        codes,
        vec![
            (ErrorCode::InvalidCspSource, Some("csp.directives.connect-src".into())),
            (ErrorCode::InvalidCspSource, Some("csp.directives.frame-src".into())),
            (ErrorCode::UnknownCspDirective, Some("csp.directives.plugin-src".into())),
            (ErrorCode::InvalidCspSource, Some("csp.directives.script-src".into())),
        ]
    );
}

#[test]
fn test_deprecated_directives_warn() {
    let (config, result) = validate_config_json(
        r#"{"csp": {"directives": {"referrer": ["no-referrer"], "plugin-types": ["application/pdf"]}}}"#,
    );
    assert!(config.is_some());
    assert!(result.is_ok());
    let codes: Vec<WarningCode> = result.warnings.iter().map(|w| w.code).collect();
    assert_eq!(
        codes,
        vec![WarningCode::DeprecatedCspDirective, WarningCode::DeprecatedCspDirective]
    );
}

// ============================================================================
// Headers
// ============================================================================

#[test]
fn test_dynamic_response_headers() {
    let project = ProjectFixture::new();
    let config = project.write_config(STRICT_CONFIG);
    let script = project.write_file("inline/boot.js", "start()");

    let output = csp_output(
        config.to_str().unwrap(),
        false,
        &InlineContent {
            scripts: vec![script.to_str().unwrap().to_string()],
            styles: vec![],
        },
    );
    assert!(output.success);
    let nonce = output.nonce.clone().expect("nonce mode for dynamic pages");

    assert_eq!(output.headers.len(), 2);
    assert_eq!(output.headers[0].name, "content-security-policy");
    assert_eq!(
        output.headers[0].value,
        format!(
            "default-src 'self'; img-src 'self' data: https://images.example.com; \
             script-src 'self' 'strict-dynamic' 'nonce-{nonce}'; frame-ancestors 'none'; \
             upgrade-insecure-requests"
        )
    );
    assert_eq!(output.headers[1].name, "content-security-policy-report-only");
    assert_eq!(
        output.headers[1].value,
        format!("script-src 'self' 'nonce-{nonce}'; report-uri /csp-violations")
    );
}

#[test]
fn test_prerendered_page_headers() {
    let config = KitConfig::from_json(STRICT_CONFIG).unwrap();
    let mut builder = CspHeaderBuilder::new(&config.csp, true).unwrap();
    builder.add_script("start()");
    builder.add_style("main{}");

    let hash = sha256_base64("start()");
    let (name, value) = builder.header().unwrap();
    assert_eq!(name, CSP_HEADER);
    assert!(value.contains(&format!("script-src 'self' 'strict-dynamic' 'sha256-{}'", hash)));
    // style-src falls back to default-src
    assert!(value.contains(&format!(
        "style-src 'self' 'sha256-{}'",
        sha256_base64("main{}")
    )));

    let meta = builder.meta_content().unwrap();
    assert!(!meta.contains("frame-ancestors"));
    assert!(meta.contains("upgrade-insecure-requests"));
}

#[test]
fn test_directives_survive_config_round_trip() {
    let config = KitConfig::from_json(STRICT_CONFIG).unwrap();
    let again = KitConfig::from_json(&config.to_json_pretty().unwrap()).unwrap();
    assert_eq!(again, config);
    assert_eq!(
        again
            .csp
            .directives
            .sources(CspDirective::ImgSrc)
            .map(|s| s.len()),
        Some(3)
    );
}
