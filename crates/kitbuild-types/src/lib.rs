//! kitbuild build contracts
//!
//! This crate provides the contracts between a web framework's build step and
//! the adapters, security headers and prerenderer that consume it.
//!
//! # Overview
//!
//! - **Adapter entries**: routes are grouped into serving units by id, with
//!   optional fallback routes, and each unit is completed exactly once
//! - **CSP**: directive maps validated against each directive's grammar and
//!   serialized into `content-security-policy` headers
//! - **Prerender**: the manifest of prerendered pages, assets and redirects,
//!   and the policies applied to crawl errors
//!
//! # Example
//!
//! ```
//! use kitbuild_types::{validate_config, CspDirective, KitConfig};
//!
//! let mut config = KitConfig::default();
//! config
//!     .csp
//!     .directives
//!     .set(CspDirective::DefaultSrc, ["self"])
//!     .unwrap();
//!
//! let result = validate_config(&config);
//! assert!(result.is_ok());
//! assert_eq!(config.csp.directives.to_header_value(), "default-src 'self'");
//! ```
//!
//! # Modules
//!
//! - [`adapter`]: Entry protocol, route grouping and manifest generation
//! - [`config`]: Build configuration
//! - [`csp`]: CSP directives, sources and header building
//! - [`error`]: Error and warning types
//! - [`http`]: HTTP methods and trailing slash handling
//! - [`logger`]: Build logger trait and implementations
//! - [`prerender`]: Prerender output and error policies
//! - [`validation`]: Config validation

pub mod adapter;
pub mod config;
pub mod csp;
pub mod error;
pub mod http;
pub mod logger;
pub mod prerender;
pub mod validation;

// Re-export commonly used types at the crate root
pub use adapter::{
    AdapterEntry, BuildSummary, CompleteError, EntryCollector, EntryGroup, FnEntry, GroupedEntry,
    ManifestGenerator, ManifestOptions, RouteDefinition, RouteManifest,
};
pub use config::{KitConfig, PrerenderConfig};
pub use csp::{
    CspConfig, CspDirective, CspDirectives, CspError, CspHeaderBuilder, CspMode, Source,
};
pub use error::{
    AdapterError, Diagnostic, DiagnosticCode, ErrorCode, KitError, ValidationError,
    ValidationResult, ValidationWarning, WarningCode,
};
pub use http::{HttpMethod, TrailingSlash};
pub use logger::{ConsoleLogger, LogLevel, Logger, MemoryLogger, TracingLogger};
pub use prerender::{
    ErrorPolicy, HttpErrorDetails, HttpErrorPolicy, IssueReporter, MissingIdDetails,
    MissingIdPolicy, PrerenderError, PrerenderOption, Prerendered, ReferenceType,
};
pub use validation::{is_safe_relative_path, validate_config, validate_config_json};
