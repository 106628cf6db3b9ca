//! Per-response CSP headers with nonces or hashes for inline content.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::directive::CspDirective;
use super::policy::{CspDirectives, CspError};
use super::source::{is_crypto_value, CryptoSource, HashAlgorithm, Keyword, Source};

/// Name of the enforcing header.
pub const CSP_HEADER: &str = "content-security-policy";

/// Name of the report-only header.
pub const CSP_REPORT_ONLY_HEADER: &str = "content-security-policy-report-only";

/// How inline scripts and styles are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CspMode {
    /// Hash every inline block.
    Hash,
    /// Add one nonce per response.
    Nonce,
    /// Hashes for prerendered pages, nonces otherwise.
    #[default]
    Auto,
}

impl CspMode {
    /// Returns true if inline content is allowed by hash.
    pub fn use_hashes(&self, prerender: bool) -> bool {
        match self {
            CspMode::Hash => true,
            CspMode::Nonce => false,
            CspMode::Auto => prerender,
        }
    }
}

/// CSP settings of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CspConfig {
    pub mode: CspMode,
    /// Enforced policy.
    pub directives: CspDirectives,
    /// Policy sent in the report-only header.
    pub report_only: CspDirectives,
}

impl CspConfig {
    /// Checks that a non-empty report-only policy names a report target.
    pub fn validate(&self) -> Result<(), CspError> {
        if !self.report_only.is_empty() && !self.report_only.has_report_target() {
            return Err(CspError::ReportOnlyWithoutTarget);
        }
        Ok(())
    }
}

/// Returns a fresh random nonce (24 bytes, base64).
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Returns the base64 SHA-256 digest of `content`.
pub fn sha256_base64(content: &str) -> String {
    STANDARD.encode(Sha256::digest(content.as_bytes()))
}

struct Provider {
    use_hashes: bool,
    directives: CspDirectives,
    script_needs_csp: bool,
    style_needs_csp: bool,
    script_src: Vec<Source>,
    style_src: Vec<Source>,
}

impl Provider {
    fn new(use_hashes: bool, directives: &CspDirectives) -> Self {
        Self {
            use_hashes,
            script_needs_csp: needs_csp(directives, CspDirective::ScriptSrc),
            style_needs_csp: needs_csp(directives, CspDirective::StyleSrc),
            directives: directives.clone(),
            script_src: Vec::new(),
            style_src: Vec::new(),
        }
    }

    fn add(use_hashes: bool, needed: bool, list: &mut Vec<Source>, nonce: &str, content: &str) {
        if !needed {
            return;
        }
        let source = if use_hashes {
            Source::Crypto(CryptoSource::Hash(
                HashAlgorithm::Sha256,
                sha256_base64(content),
            ))
        } else if list.is_empty() {
            Source::Crypto(CryptoSource::Nonce(nonce.to_string()))
        } else {
            return;
        };
        if !list.contains(&source) {
            list.push(source);
        }
    }

    fn render(&self, skip: impl Fn(CspDirective) -> bool) -> String {
        let mut directives = self.directives.clone();
        extend_effective(&mut directives, CspDirective::StyleSrc, &self.style_src);
        extend_effective(&mut directives, CspDirective::ScriptSrc, &self.script_src);
        directives.format_filtered(skip)
    }
}

fn effective_sources(directives: &CspDirectives, directive: CspDirective) -> Option<&[Source]> {
    directives
        .sources(directive)
        .or_else(|| directives.sources(CspDirective::DefaultSrc))
}

/// Inline content only needs a nonce or hash when the effective directive
/// restricts something beyond `'unsafe-inline'`.
fn needs_csp(directives: &CspDirectives, directive: CspDirective) -> bool {
    effective_sources(directives, directive).map_or(false, |sources| {
        sources
            .iter()
            .any(|s| *s != Source::Keyword(Keyword::UnsafeInline))
    })
}

fn extend_effective(directives: &mut CspDirectives, directive: CspDirective, extra: &[Source]) {
    if extra.is_empty() {
        return;
    }
    let mut sources = effective_sources(directives, directive)
        .map(<[Source]>::to_vec)
        .unwrap_or_default();
    sources.extend_from_slice(extra);
    directives.insert_sources(directive, sources);
}

/// Builds the CSP headers of one response.
///
/// ```
/// use kitbuild_types::csp::{CspConfig, CspDirective, CspHeaderBuilder, CspMode};
///
/// let mut config = CspConfig { mode: CspMode::Nonce, ..Default::default() };
/// config.directives.set(CspDirective::ScriptSrc, ["self"]).unwrap();
///
/// let mut builder = CspHeaderBuilder::with_nonce(&config, false, "abc").unwrap();
/// builder.add_script("console.log(1)");
/// let (name, value) = builder.header().unwrap();
/// assert_eq!(name, "content-security-policy");
/// assert_eq!(value, "script-src 'self' 'nonce-abc'");
/// ```
pub struct CspHeaderBuilder {
    nonce: String,
    csp: Provider,
    report_only: Provider,
}

impl CspHeaderBuilder {
    /// Creates a builder with a random nonce.
    pub fn new(config: &CspConfig, prerender: bool) -> Result<Self, CspError> {
        Self::with_nonce(config, prerender, generate_nonce())
    }

    /// Creates a builder with the given nonce.
    pub fn with_nonce(
        config: &CspConfig,
        prerender: bool,
        nonce: impl Into<String>,
    ) -> Result<Self, CspError> {
        config.validate()?;
        let nonce = nonce.into();
        if !is_crypto_value(&nonce) {
            return Err(CspError::InvalidNonce(nonce));
        }
        let use_hashes = config.mode.use_hashes(prerender);
        Ok(Self {
            nonce,
            csp: Provider::new(use_hashes, &config.directives),
            report_only: Provider::new(use_hashes, &config.report_only),
        })
    }

    /// Returns the response nonce.
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Returns true if inline `<script>` tags must carry the nonce.
    pub fn script_needs_nonce(&self) -> bool {
        self.csp.script_needs_csp && !self.csp.use_hashes
    }

    /// Returns true if inline `<style>` tags must carry the nonce.
    pub fn style_needs_nonce(&self) -> bool {
        self.csp.style_needs_csp && !self.csp.use_hashes
    }

    /// Registers an inline script.
    pub fn add_script(&mut self, content: &str) {
        for p in [&mut self.csp, &mut self.report_only] {
            Provider::add(
                p.use_hashes,
                p.script_needs_csp,
                &mut p.script_src,
                &self.nonce,
                content,
            );
        }
    }

    /// Registers an inline style.
    pub fn add_style(&mut self, content: &str) {
        for p in [&mut self.csp, &mut self.report_only] {
            Provider::add(p.use_hashes, p.style_needs_csp, &mut p.style_src, &self.nonce, content);
        }
    }

    /// Returns the enforcing header, if the policy is not empty.
    pub fn header(&self) -> Option<(&'static str, String)> {
        non_empty(self.csp.render(|_| false)).map(|v| (CSP_HEADER, v))
    }

    /// Returns the report-only header, if a report-only policy is configured.
    pub fn report_only_header(&self) -> Option<(&'static str, String)> {
        non_empty(self.report_only.render(|_| false)).map(|v| (CSP_REPORT_ONLY_HEADER, v))
    }

    /// Returns the enforcing policy for a `<meta http-equiv>` tag.
    pub fn meta_content(&self) -> Option<String> {
        non_empty(self.csp.render(|d| d.is_header_only()))
    }

    /// Returns a `<meta>` tag carrying [`Self::meta_content`], attribute-escaped.
    pub fn meta_tag(&self) -> Option<String> {
        self.meta_content().map(|content| {
            format!(
                "<meta http-equiv=\"{}\" content=\"{}\">",
                CSP_HEADER,
                escape_attribute(&content)
            )
        })
    }
}

impl std::fmt::Debug for CspHeaderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CspHeaderBuilder")
            .field("nonce", &self.nonce)
            .field("use_hashes", &self.csp.use_hashes)
            .finish_non_exhaustive()
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute("default-src 'self'"), "default-src 'self'");
        assert_eq!(
            escape_attribute("a\"><b & c"),
            "a&quot;&gt;&lt;b &amp; c"
        );
    }
}
