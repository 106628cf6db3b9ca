//! Build config validation.

mod path_safety;

#[cfg(test)]
mod tests;

use serde_json::Value;

use crate::config::KitConfig;
use crate::csp::{CspDirectives, CspError};
use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};

// Re-export path safety functions
pub use path_safety::{is_safe_relative_path, relative_path_errors};

use path_safety::validate_relative_path;

/// Directive maps inside the `csp` section.
const CSP_MAPS: &[&str] = &["directives", "report_only"];

/// Validates a parsed config.
///
/// # Example
/// ```
/// use kitbuild_types::config::KitConfig;
/// use kitbuild_types::validation::validate_config;
///
/// let config = KitConfig::from_json(r#"{"prerender": {"entries": ["/", "/blog"]}}"#).unwrap();
/// assert!(validate_config(&config).is_ok());
/// ```
pub fn validate_config(config: &KitConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    validate_csp(config, &mut result);
    validate_prerender(config, &mut result);
    validate_relative_path(&config.out_dir, "out_dir", &mut result);

    result
}

/// Parses and validates a JSON config, reporting every CSP problem at once.
///
/// Returns the config only when it could be deserialized.
pub fn validate_config_json(json: &str) -> (Option<KitConfig>, ValidationResult) {
    let mut result = ValidationResult::default();

    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            result.add_error(ValidationError::new(
                ErrorCode::MalformedConfig,
                format!("invalid JSON: {}", e),
            ));
            return (None, result);
        }
    };

    if !value.is_object() {
        result.add_error(ValidationError::new(
            ErrorCode::MalformedConfig,
            "config must be a JSON object",
        ));
        return (None, result);
    }

    check_raw_csp(&value, &mut result);
    if !result.is_ok() {
        return (None, result);
    }

    let config: KitConfig = match serde_json::from_value(value) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(ValidationError::new(ErrorCode::MalformedConfig, e.to_string()));
            return (None, result);
        }
    };

    result.merge(validate_config(&config));

    (Some(config), result)
}

/// Checks the untyped directive maps so that every bad token is reported,
/// not only the first one serde would stop at.
fn check_raw_csp(value: &Value, result: &mut ValidationResult) {
    let csp = match value.get("csp") {
        None | Some(Value::Null) => return,
        Some(Value::Object(csp)) => csp,
        Some(_) => {
            result.add_error(ValidationError::with_path(
                ErrorCode::MalformedConfig,
                "csp must be an object",
                "csp",
            ));
            return;
        }
    };

    for key in CSP_MAPS {
        let map = match csp.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(map)) => map,
            Some(_) => {
                result.add_error(ValidationError::with_path(
                    ErrorCode::MalformedConfig,
                    "directives must be an object",
                    format!("csp.{}", key),
                ));
                continue;
            }
        };

        let (_, errors) = CspDirectives::parse_map(map);
        for (name, error) in errors {
            let code = match error {
                CspError::UnknownDirective(_) => ErrorCode::UnknownCspDirective,
                _ => ErrorCode::InvalidCspSource,
            };
            result.add_error(ValidationError::with_path(
                code,
                error.to_string(),
                format!("csp.{}.{}", key, name),
            ));
        }
    }
}

fn validate_csp(config: &KitConfig, result: &mut ValidationResult) {
    let maps = [
        ("directives", &config.csp.directives),
        ("report_only", &config.csp.report_only),
    ];

    for (key, directives) in maps {
        for (directive, _) in directives.iter() {
            if directive.is_deprecated() {
                result.add_warning(ValidationWarning::with_path(
                    WarningCode::DeprecatedCspDirective,
                    format!("'{}' is deprecated and ignored by current browsers", directive),
                    format!("csp.{}.{}", key, directive),
                ));
            }
        }
    }

    if let Err(e) = config.csp.validate() {
        result.add_error(ValidationError::with_path(
            ErrorCode::MissingReportTarget,
            e.to_string(),
            "csp.report_only",
        ));
    }
}

fn validate_prerender(config: &KitConfig, result: &mut ValidationResult) {
    let prerender = &config.prerender;

    for (i, entry) in prerender.entries.iter().enumerate() {
        if entry != "*" && !entry.starts_with('/') {
            result.add_error(ValidationError::with_path(
                ErrorCode::InvalidPrerenderEntry,
                format!("entry '{}' must be '*' or start with '/'", entry),
                format!("prerender.entries[{}]", i),
            ));
        }
    }

    if prerender.entries.is_empty() && !prerender.crawl {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::NoPrerenderEntries,
            "no entries and crawling disabled; nothing will be prerendered",
            "prerender",
        ));
    }

    if prerender.concurrency == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::MalformedConfig,
            "concurrency must be at least 1",
            "prerender.concurrency",
        ));
    }

    if !prerender.origin.starts_with("http://") && !prerender.origin.starts_with("https://") {
        result.add_error(ValidationError::with_path(
            ErrorCode::MalformedConfig,
            format!("origin '{}' must start with http:// or https://", prerender.origin),
            "prerender.origin",
        ));
    }
}
