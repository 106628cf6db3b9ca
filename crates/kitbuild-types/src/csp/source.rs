//! CSP source expressions.

use regex::Regex;
use std::sync::OnceLock;

/// Host source: optional `scheme://`, a dotted host or `localhost`, optional
/// `:port` or `:*`.
const HOST_SOURCE_PATTERN: &str = concat!(
    r"^(?:([A-Za-z][A-Za-z0-9+.\-]*)://)?",
    r"((?:\*\.)?[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+|localhost)",
    r"(?::([0-9]{1,5}|\*))?$",
);

/// Base64 or base64url value of a nonce or hash.
const CRYPTO_VALUE_PATTERN: &str = r"^[A-Za-z0-9+/_\-]+={0,2}$";

static HOST_SOURCE_REGEX: OnceLock<Regex> = OnceLock::new();
static CRYPTO_VALUE_REGEX: OnceLock<Regex> = OnceLock::new();

fn host_source_regex() -> &'static Regex {
    HOST_SOURCE_REGEX
        .get_or_init(|| Regex::new(HOST_SOURCE_PATTERN).expect("invalid regex pattern"))
}

fn crypto_value_regex() -> &'static Regex {
    CRYPTO_VALUE_REGEX
        .get_or_init(|| Regex::new(CRYPTO_VALUE_PATTERN).expect("invalid regex pattern"))
}

/// Returns true if `value` may follow `nonce-` or `sha*-`.
pub(crate) fn is_crypto_value(value: &str) -> bool {
    crypto_value_regex().is_match(value)
}

/// Keyword sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `'self'`
    SelfOrigin,
    /// `'unsafe-eval'`
    UnsafeEval,
    /// `'unsafe-hashes'`
    UnsafeHashes,
    /// `'unsafe-inline'`
    UnsafeInline,
    /// `'wasm-unsafe-eval'`
    WasmUnsafeEval,
    /// `'none'`
    None,
}

impl Keyword {
    /// Returns the unquoted keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::SelfOrigin => "self",
            Keyword::UnsafeEval => "unsafe-eval",
            Keyword::UnsafeHashes => "unsafe-hashes",
            Keyword::UnsafeInline => "unsafe-inline",
            Keyword::WasmUnsafeEval => "wasm-unsafe-eval",
            Keyword::None => "none",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "self" => Keyword::SelfOrigin,
            "unsafe-eval" => Keyword::UnsafeEval,
            "unsafe-hashes" => Keyword::UnsafeHashes,
            "unsafe-inline" => Keyword::UnsafeInline,
            "wasm-unsafe-eval" => Keyword::WasmUnsafeEval,
            "none" => Keyword::None,
            _ => return None,
        })
    }
}

/// Action sources, only allowed on script/style/default-like directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionSource {
    /// `'strict-dynamic'`
    StrictDynamic,
    /// `'report-sample'`
    ReportSample,
}

impl ActionSource {
    /// Returns the unquoted keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionSource::StrictDynamic => "strict-dynamic",
            ActionSource::ReportSample => "report-sample",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "strict-dynamic" => Some(ActionSource::StrictDynamic),
            "report-sample" => Some(ActionSource::ReportSample),
            _ => None,
        }
    }
}

/// Scheme sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeSource {
    Http,
    Https,
    Data,
    MediaStream,
    Blob,
    Filesystem,
}

impl SchemeSource {
    /// Returns the scheme with its trailing colon.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeSource::Http => "http:",
            SchemeSource::Https => "https:",
            SchemeSource::Data => "data:",
            SchemeSource::MediaStream => "mediastream:",
            SchemeSource::Blob => "blob:",
            SchemeSource::Filesystem => "filesystem:",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "http:" => SchemeSource::Http,
            "https:" => SchemeSource::Https,
            "data:" => SchemeSource::Data,
            "mediastream:" => SchemeSource::MediaStream,
            "blob:" => SchemeSource::Blob,
            "filesystem:" => SchemeSource::Filesystem,
            _ => return None,
        })
    }
}

/// Hash algorithms accepted in hash sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Returns the algorithm prefix, e.g. `sha256`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

/// Nonce and hash sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CryptoSource {
    /// `'nonce-<value>'`
    Nonce(String),
    /// `'sha256-<value>'` and friends.
    Hash(HashAlgorithm, String),
}

impl CryptoSource {
    fn parse(s: &str) -> Option<Result<Self, String>> {
        let (kind, value) = s.split_once('-')?;
        let build: fn(String) -> CryptoSource = match kind {
            "nonce" => CryptoSource::Nonce,
            "sha256" => |v| CryptoSource::Hash(HashAlgorithm::Sha256, v),
            "sha384" => |v| CryptoSource::Hash(HashAlgorithm::Sha384, v),
            "sha512" => |v| CryptoSource::Hash(HashAlgorithm::Sha512, v),
            _ => return None,
        };
        if !is_crypto_value(value) {
            return Some(Err(format!("'{}-' must be followed by a base64 value", kind)));
        }
        Some(Ok(build(value.to_string())))
    }
}

impl std::fmt::Display for CryptoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoSource::Nonce(v) => write!(f, "nonce-{}", v),
            CryptoSource::Hash(alg, v) => write!(f, "{}-{}", alg.as_str(), v),
        }
    }
}

/// Port part of a host source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    /// `:<number>`
    Number(u16),
    /// `:*`
    Any,
}

/// Host source such as `https://*.example.com:443`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostSource {
    /// Scheme before `://`, if given.
    pub scheme: Option<String>,
    /// Host name.
    pub host: String,
    /// Port, if given.
    pub port: Option<Port>,
}

impl HostSource {
    fn parse(s: &str) -> Option<Result<Self, String>> {
        let caps = host_source_regex().captures(s)?;
        let port = match caps.get(3).map(|m| m.as_str()) {
            None => None,
            Some("*") => Some(Port::Any),
            Some(n) => match n.parse::<u16>() {
                Ok(n) => Some(Port::Number(n)),
                Err(_) => return Some(Err(format!("port out of range in '{}'", s))),
            },
        };
        Some(Ok(HostSource {
            scheme: caps.get(1).map(|m| m.as_str().to_string()),
            host: caps[2].to_string(),
            port,
        }))
    }
}

impl std::fmt::Display for HostSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{}://", scheme)?;
        }
        write!(f, "{}", self.host)?;
        match self.port {
            Some(Port::Number(n)) => write!(f, ":{}", n),
            Some(Port::Any) => write!(f, ":*"),
            None => Ok(()),
        }
    }
}

/// One source expression in a source list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Keyword(Keyword),
    Action(ActionSource),
    Scheme(SchemeSource),
    Crypto(CryptoSource),
    Host(HostSource),
}

impl Source {
    /// Parses a source token.
    ///
    /// Keywords and crypto sources may be written with or without their
    /// single quotes (`self` or `'self'`); scheme and host sources must not be
    /// quoted.
    pub fn parse(token: &str) -> Result<Self, String> {
        let (bare, quoted) = match token
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
        {
            Some(inner) => (inner, true),
            None => (token, false),
        };

        if bare.is_empty() {
            return Err("empty source".to_string());
        }
        if let Some(k) = Keyword::parse(bare) {
            return Ok(Source::Keyword(k));
        }
        if let Some(a) = ActionSource::parse(bare) {
            return Ok(Source::Action(a));
        }
        let crypto_err = match CryptoSource::parse(bare) {
            Some(Ok(c)) => return Ok(Source::Crypto(c)),
            Some(Err(e)) => Some(e),
            None => None,
        };
        if quoted {
            return Err(crypto_err.unwrap_or_else(|| {
                format!("'{}' is not a keyword, nonce or hash source", bare)
            }));
        }
        if let Some(s) = SchemeSource::parse(bare) {
            return Ok(Source::Scheme(s));
        }
        // `nonce-cdn.example.com` is a host, not a malformed nonce
        match (HostSource::parse(bare), crypto_err) {
            (Some(Ok(h)), _) => Ok(Source::Host(h)),
            (_, Some(e)) | (Some(Err(e)), None) => Err(e),
            (None, None) => Err(format!("'{}' is not a valid source expression", bare)),
        }
    }

    /// Returns true if the source is written in single quotes in a header.
    pub fn is_quoted(&self) -> bool {
        matches!(
            self,
            Source::Keyword(_) | Source::Action(_) | Source::Crypto(_)
        )
    }

    /// Returns the unquoted token.
    pub fn token(&self) -> String {
        match self {
            Source::Keyword(k) => k.as_str().to_string(),
            Source::Action(a) => a.as_str().to_string(),
            Source::Scheme(s) => s.as_str().to_string(),
            Source::Crypto(c) => c.to_string(),
            Source::Host(h) => h.to_string(),
        }
    }
}

impl std::fmt::Display for Source {
    /// Formats the source as it appears in a header.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_quoted() {
            write!(f, "'{}'", self.token())
        } else {
            f.write_str(&self.token())
        }
    }
}
