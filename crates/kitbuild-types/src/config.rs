//! Build configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::csp::CspConfig;
use crate::error::KitError;
use crate::http::TrailingSlash;
use crate::logger::Logger;
use crate::prerender::{HttpErrorPolicy, IssueReporter, MissingIdPolicy};

/// Default output directory, relative to the project root.
pub const DEFAULT_OUT_DIR: &str = ".kitbuild";

/// Origin used for `url.origin` while prerendering.
pub const DEFAULT_PRERENDER_ORIGIN: &str = "http://kitbuild-prerender";

/// Prerender settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrerenderConfig {
    /// Policy for non-success responses met while crawling.
    pub handle_http_error: HttpErrorPolicy,
    /// Policy for links to missing fragment ids.
    pub handle_missing_id: MissingIdPolicy,
    /// Pages to start from. `*` means every route without parameters.
    pub entries: Vec<String>,
    /// Follow links found on prerendered pages.
    pub crawl: bool,
    /// Number of pages rendered at once.
    pub concurrency: usize,
    /// Origin seen by pages during prerendering.
    pub origin: String,
}

impl Default for PrerenderConfig {
    fn default() -> Self {
        Self {
            handle_http_error: HttpErrorPolicy::Fail,
            handle_missing_id: MissingIdPolicy::Fail,
            entries: vec!["*".to_string()],
            crawl: true,
            concurrency: 1,
            origin: DEFAULT_PRERENDER_ORIGIN.to_string(),
        }
    }
}

impl PrerenderConfig {
    /// Creates an issue reporter applying this config's policies.
    pub fn reporter(&self, logger: Arc<dyn Logger>) -> IssueReporter {
        IssueReporter::new(
            self.handle_http_error.clone(),
            self.handle_missing_id.clone(),
            logger,
        )
    }
}

/// Top-level build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub csp: CspConfig,
    pub prerender: PrerenderConfig,
    pub trailing_slash: TrailingSlash,
    /// Build output directory, relative to the project root.
    pub out_dir: String,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            csp: CspConfig::default(),
            prerender: PrerenderConfig::default(),
            trailing_slash: TrailingSlash::default(),
            out_dir: DEFAULT_OUT_DIR.to_string(),
        }
    }
}

impl KitConfig {
    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, KitError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KitError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serializes the config as pretty-printed JSON.
    ///
    /// Fails when a prerender policy is a custom handler.
    pub fn to_json_pretty(&self) -> Result<String, KitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::CspMode;
    use crate::prerender::ErrorPolicy;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = KitConfig::from_json("{}").unwrap();
        assert_eq!(config, KitConfig::default());
        assert_eq!(config.prerender.entries, vec!["*"]);
        assert!(config.prerender.crawl);
        assert_eq!(config.prerender.concurrency, 1);
        assert_eq!(config.out_dir, ".kitbuild");
        assert_eq!(config.trailing_slash, TrailingSlash::Never);
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "csp": {
                "mode": "nonce",
                "directives": { "default-src": ["self"] }
            },
            "prerender": {
                "handle_http_error": "warn",
                "handle_missing_id": "ignore",
                "entries": ["/", "/about"],
                "crawl": false
            },
            "trailing_slash": "always",
            "out_dir": "build"
        }"#;
        let config = KitConfig::from_json(json).unwrap();
        assert_eq!(config.csp.mode, CspMode::Nonce);
        assert_eq!(config.prerender.handle_http_error, ErrorPolicy::Warn);
        assert_eq!(config.prerender.handle_missing_id, ErrorPolicy::Ignore);
        assert!(!config.prerender.crawl);
        assert_eq!(config.trailing_slash, TrailingSlash::Always);

        let again = KitConfig::from_json(&config.to_json_pretty().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let err = KitConfig::from_json(r#"{"prerender": {"handle_http_error": "explode"}}"#);
        assert!(matches!(err, Err(KitError::JsonParse(_))));
    }

    #[test]
    fn test_handler_policy_cannot_be_serialized() {
        let mut config = KitConfig::default();
        config.prerender.handle_missing_id = ErrorPolicy::handler(|_| Ok(()));
        assert!(config.to_json_pretty().is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = KitConfig::from_file("/definitely/not/here.json");
        assert!(matches!(err, Err(KitError::Io(_))));
    }
}
