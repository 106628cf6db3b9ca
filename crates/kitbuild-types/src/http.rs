//! HTTP method and trailing-slash policy types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// HTTP methods a route can export handlers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl HttpMethod {
    /// Returns the method as its canonical upper-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Returns all methods.
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Head,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
            HttpMethod::Options,
        ]
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Parses a method name. Matching is case-sensitive, as in request lines.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown HTTP method: '{}'", s))
    }
}

/// How trailing slashes on page paths are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    /// `/about/` is served as `/about`.
    #[default]
    Never,
    /// `/about` is served as `/about/`.
    Always,
    /// Paths are left untouched.
    Ignore,
}

impl TrailingSlash {
    /// Applies the policy to a path. The root path `/` is never changed.
    pub fn normalize(&self, path: &str) -> String {
        if path == "/" || path.is_empty() {
            return "/".to_string();
        }
        match self {
            TrailingSlash::Never => path.trim_end_matches('/').to_string(),
            TrailingSlash::Always => {
                if path.ends_with('/') {
                    path.to_string()
                } else {
                    format!("{}/", path)
                }
            }
            TrailingSlash::Ignore => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_and_display() {
        for method in HttpMethod::all() {
            assert_eq!(method.as_str().parse::<HttpMethod>().unwrap(), *method);
            assert_eq!(method.to_string(), method.as_str());
        }
        assert!("get".parse::<HttpMethod>().is_err());
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_serde() {
        let json = serde_json::to_string(&HttpMethod::Options).unwrap();
        assert_eq!(json, "\"OPTIONS\"");
        let parsed: HttpMethod = serde_json::from_str("\"PATCH\"").unwrap();
        assert_eq!(parsed, HttpMethod::Patch);
    }

    #[test]
    fn test_trailing_slash_normalize() {
        assert_eq!(TrailingSlash::Never.normalize("/about/"), "/about");
        assert_eq!(TrailingSlash::Never.normalize("/about"), "/about");
        assert_eq!(TrailingSlash::Always.normalize("/about"), "/about/");
        assert_eq!(TrailingSlash::Always.normalize("/about/"), "/about/");
        assert_eq!(TrailingSlash::Ignore.normalize("/about/"), "/about/");
        assert_eq!(TrailingSlash::Never.normalize("/"), "/");
        assert_eq!(TrailingSlash::Always.normalize("/"), "/");
    }

    #[test]
    fn test_trailing_slash_default_and_serde() {
        assert_eq!(TrailingSlash::default(), TrailingSlash::Never);
        let parsed: TrailingSlash = serde_json::from_str("\"always\"").unwrap();
        assert_eq!(parsed, TrailingSlash::Always);
    }
}
