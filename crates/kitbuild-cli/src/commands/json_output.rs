//! JSON output types for machine-readable CLI output.
//!
//! Used by the `--json` flag of `validate` and `csp`.

use kitbuild_types::{Diagnostic, DiagnosticCode};
use serde::{Deserialize, Serialize};

/// Error codes for CLI operations.
///
/// Validation errors pass through with their own `E0xx` codes.
pub mod error_codes {
    /// Config file could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// CSP headers could not be built
    pub const CSP_BUILD: &str = "CLI_002";
    /// Inline content file could not be read
    pub const INLINE_READ: &str = "CLI_003";
}

/// One error or warning as it appears in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonDiagnostic {
    /// Stable code: `CLI_0xx` from this module, or a validation `E0xx`/`W0xx`
    pub code: String,
    pub message: String,
    /// Config key path, e.g. `csp.directives.script-src`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

pub type JsonError = JsonDiagnostic;
pub type JsonWarning = JsonDiagnostic;

impl JsonDiagnostic {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: None,
        }
    }
}

impl<C: DiagnosticCode> From<&Diagnostic<C>> for JsonDiagnostic {
    fn from(diagnostic: &Diagnostic<C>) -> Self {
        Self {
            code: diagnostic.code.code().to_string(),
            message: diagnostic.message.clone(),
            path: diagnostic.path.clone(),
        }
    }
}

/// Output of `validate --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ValidateResult>,
}

/// Summary of a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateResult {
    pub config_path: String,
    /// Number of enforced CSP directives
    pub csp_directives: usize,
    /// Number of report-only CSP directives
    pub csp_report_only_directives: usize,
    pub prerender_entries: Vec<String>,
}

impl ValidateOutput {
    pub fn success(result: ValidateResult, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings,
            result: Some(result),
        }
    }

    pub fn failure(errors: Vec<JsonError>, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: false,
            errors,
            warnings,
            result: None,
        }
    }
}

/// One rendered header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonHeader {
    pub name: String,
    pub value: String,
}

/// Output of `csp --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CspOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    pub headers: Vec<JsonHeader>,
    /// `<meta>` tag for prerendered pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// Nonce, when inline tags must carry one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl CspOutput {
    pub fn failure(errors: Vec<JsonError>, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: false,
            errors,
            warnings,
            headers: Vec::new(),
            meta: None,
            nonce: None,
        }
    }
}
