//! Error types for config validation and build-time contracts.

use thiserror::Error;

use crate::adapter::CompleteError;
use crate::csp::CspError;
use crate::prerender::PrerenderError;

/// A stable diagnostic code such as `E001` or `W002`.
pub trait DiagnosticCode: Copy + std::fmt::Debug {
    /// Returns the code string.
    fn code(&self) -> &'static str;
}

macro_rules! diagnostic_codes {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $code:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Returns the code string.
            pub fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl DiagnosticCode for $name {
            fn code(&self) -> &'static str {
                $name::code(self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

diagnostic_codes! {
    /// Error codes for build config validation.
    ErrorCode {
        /// A CSP source token does not match its directive grammar
        InvalidCspSource => "E001",
        /// Unknown CSP directive name
        UnknownCspDirective => "E002",
        /// Prerender entry is neither `*` nor an absolute path
        InvalidPrerenderEntry => "E003",
        /// Unsafe relative path (traversal, absolute, backslashes)
        UnsafePath => "E004",
        /// Config does not match the expected shape
        MalformedConfig => "E005",
        /// Report-only policy has neither `report-uri` nor `report-to`
        MissingReportTarget => "E006",
    }
}

diagnostic_codes! {
    /// Warning codes for build config validation.
    WarningCode {
        /// Nothing to prerender (no entries and crawling disabled)
        NoPrerenderEntries => "W001",
        /// Deprecated CSP directive
        DeprecatedCspDirective => "W002",
    }
}

/// A coded message, optionally pinned to a config key path
/// such as `csp.directives.script-src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic<C> {
    pub code: C,
    pub message: String,
    pub path: Option<String>,
}

/// A config problem that makes the config unusable.
pub type ValidationError = Diagnostic<ErrorCode>;

/// A config smell that does not block the build.
pub type ValidationWarning = Diagnostic<WarningCode>;

impl<C: DiagnosticCode> Diagnostic<C> {
    pub fn new(code: C, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Same as [`Diagnostic::new`], pinned to `path`.
    pub fn with_path(code: C, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(code, message)
        }
    }
}

impl<C: DiagnosticCode> std::fmt::Display for Diagnostic<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        match &self.path {
            Some(path) => write!(f, " (at {})", path),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Top-level error type for kitbuild operations.
#[derive(Debug, Error)]
pub enum KitError {
    /// Config validation failed with one or more errors.
    #[error("config validation failed with {0} error(s)")]
    ValidationFailed(usize),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Invalid CSP directive or source.
    #[error(transparent)]
    Csp(#[from] CspError),

    /// A prerender issue aborted the build.
    #[error(transparent)]
    Prerender(#[from] PrerenderError),

    /// An adapter entry failed to complete.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the entry collector.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// `complete` failed for an entry; the build must abort.
    #[error("adapter entry '{id}' failed to complete: {source}")]
    CompleteFailed {
        /// Id of the entry whose completion failed.
        id: String,
        /// Underlying failure.
        #[source]
        source: CompleteError,
    },
}

/// Everything `validate_config` found, errors and warnings kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// An empty result.
    pub fn success() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Appends another result's findings after this one's.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// True when no errors were found. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Splits into warnings on success or errors on failure.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        if self.is_ok() {
            Ok(self.warnings)
        } else {
            Err(self.errors)
        }
    }
}
