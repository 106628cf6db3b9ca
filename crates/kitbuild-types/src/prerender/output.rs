//! Prerendered output manifest.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Prerender setting of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PrerenderOption {
    /// Always prerender (`true`).
    Enabled,
    /// Never prerender (`false`).
    #[default]
    Disabled,
    /// Prerender when reachable, but keep the route in the server build (`"auto"`).
    Auto,
}

impl PrerenderOption {
    /// Returns true if the route may be prerendered.
    pub fn may_prerender(&self) -> bool {
        !matches!(self, PrerenderOption::Disabled)
    }

    /// Returns true if the route still needs a serving unit.
    pub fn needs_server(&self) -> bool {
        !matches!(self, PrerenderOption::Enabled)
    }
}

impl Serialize for PrerenderOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PrerenderOption::Enabled => serializer.serialize_bool(true),
            PrerenderOption::Disabled => serializer.serialize_bool(false),
            PrerenderOption::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for PrerenderOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Word(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Ok(PrerenderOption::Enabled),
            Repr::Flag(false) => Ok(PrerenderOption::Disabled),
            Repr::Word(w) if w == "auto" => Ok(PrerenderOption::Auto),
            Repr::Word(w) => Err(serde::de::Error::custom(format!(
                "invalid prerender option '{}' (expected true, false or \"auto\")",
                w
            ))),
        }
    }
}

/// Prerender setting per route id.
pub type PrerenderMap = BTreeMap<String, PrerenderOption>;

/// A prerendered HTML page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerenderedPage {
    /// Location of the `.html` file, relative to the output directory.
    pub file: String,
}

/// A prerendered non-HTML asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerenderedAsset {
    /// MIME type of the asset.
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// A redirect encountered while prerendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerenderedRedirect {
    /// HTTP status (3xx).
    pub status: u16,
    /// Redirect target.
    pub location: String,
}

/// Everything produced by a prerender run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerendered {
    /// Path to page file, e.g. `/foo` to `foo.html`, `/bar/` to `bar/index.html`.
    #[serde(default)]
    pub pages: BTreeMap<String, PrerenderedPage>,
    /// Path to asset type.
    #[serde(default)]
    pub assets: BTreeMap<String, PrerenderedAsset>,
    /// Redirects encountered during prerendering.
    #[serde(default)]
    pub redirects: BTreeMap<String, PrerenderedRedirect>,
    /// Every prerendered path, trailing slash removed, in discovery order.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl Prerendered {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a prerendered page and returns its output file.
    pub fn add_page(&mut self, path: &str) -> String {
        let file = page_file(path);
        self.pages.insert(
            path.to_string(),
            PrerenderedPage { file: file.clone() },
        );
        self.push_path(path);
        file
    }

    /// Records a prerendered asset.
    pub fn add_asset(&mut self, path: &str, mime_type: impl Into<String>) {
        self.assets.insert(
            path.to_string(),
            PrerenderedAsset {
                mime_type: mime_type.into(),
            },
        );
        self.push_path(path);
    }

    /// Records a redirect.
    pub fn add_redirect(&mut self, path: &str, status: u16, location: impl Into<String>) {
        self.redirects.insert(
            path.to_string(),
            PrerenderedRedirect {
                status,
                location: location.into(),
            },
        );
        self.push_path(path);
    }

    /// Returns true if `path` was prerendered, ignoring a trailing slash.
    pub fn contains_path(&self, path: &str) -> bool {
        let normalized = strip_trailing_slash(path);
        self.paths.iter().any(|p| *p == normalized)
    }

    fn push_path(&mut self, path: &str) {
        let normalized = strip_trailing_slash(path);
        if !self.paths.contains(&normalized) {
            self.paths.push(normalized);
        }
    }
}

fn strip_trailing_slash(path: &str) -> String {
    match path.trim_end_matches('/') {
        "" if path.starts_with('/') => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Maps a page path to its `.html` file.
pub fn page_file(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        "index.html".to_string()
    } else if let Some(dir) = trimmed.strip_suffix('/') {
        format!("{}/index.html", dir)
    } else {
        format!("{}.html", trimmed)
    }
}
