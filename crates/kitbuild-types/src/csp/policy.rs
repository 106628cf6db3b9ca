//! Validated directive maps and their header serialization.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

use super::directive::{CspDirective, Grammar};
use super::source::{Keyword, Source};

const SANDBOX_TOKENS: &[&str] = &[
    "allow-downloads-without-user-activation",
    "allow-forms",
    "allow-modals",
    "allow-orientation-lock",
    "allow-pointer-lock",
    "allow-popups",
    "allow-popups-to-escape-sandbox",
    "allow-presentation",
    "allow-same-origin",
    "allow-scripts",
    "allow-storage-access-by-user-activation",
    "allow-top-navigation",
    "allow-top-navigation-by-user-activation",
];

const REFERRER_TOKENS: &[&str] = &[
    "no-referrer",
    "no-referrer-when-downgrade",
    "origin",
    "origin-when-cross-origin",
    "same-origin",
    "strict-origin",
    "strict-origin-when-cross-origin",
    "unsafe-url",
    "none",
];

/// Trusted Types policy names.
const POLICY_NAME_PATTERN: &str = r"^[A-Za-z0-9\-#=_/@.%]+$";

/// `type/subtype`
const MIME_TYPE_PATTERN: &str = r"^[A-Za-z0-9!#$&^_.+\-]+/[A-Za-z0-9!#$&^_.+\-]+$";

/// Reporting endpoint group names.
const GROUP_NAME_PATTERN: &str = r"^[A-Za-z0-9_\-.]+$";

static POLICY_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static MIME_TYPE_REGEX: OnceLock<Regex> = OnceLock::new();
static GROUP_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn policy_name_regex() -> &'static Regex {
    POLICY_NAME_REGEX
        .get_or_init(|| Regex::new(POLICY_NAME_PATTERN).expect("invalid regex pattern"))
}

fn mime_type_regex() -> &'static Regex {
    MIME_TYPE_REGEX.get_or_init(|| Regex::new(MIME_TYPE_PATTERN).expect("invalid regex pattern"))
}

fn group_name_regex() -> &'static Regex {
    GROUP_NAME_REGEX.get_or_init(|| Regex::new(GROUP_NAME_PATTERN).expect("invalid regex pattern"))
}

/// Errors raised while building a CSP.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CspError {
    /// The directive name is not recognised.
    #[error("unknown CSP directive '{0}'")]
    UnknownDirective(String),

    /// A value does not match the directive's grammar.
    #[error("invalid value '{token}' for {directive}: {reason}")]
    InvalidSource {
        directive: CspDirective,
        token: String,
        reason: String,
    },

    /// A list was given to a boolean directive.
    #[error("{0} is a flag and takes true or false")]
    ExpectedFlag(CspDirective),

    /// A boolean or other non-list value was given to a list directive.
    #[error("{0} takes a list of values")]
    ExpectedList(CspDirective),

    /// A caller-supplied nonce that is not base64.
    #[error("nonce '{0}' is not a base64 value")]
    InvalidNonce(String),

    /// A report-only policy that cannot report anywhere.
    #[error("`content-security-policy-report-only` must be specified with either the `report-to` or `report-uri` directives, or both")]
    ReportOnlyWithoutTarget,
}

impl CspError {
    fn invalid(directive: CspDirective, token: &str, reason: impl Into<String>) -> Self {
        CspError::InvalidSource {
            directive,
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// Validated value of one directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    /// Source list (fetch directives, `base-uri`, `frame-ancestors`, ...).
    Sources(Vec<Source>),
    /// Any other token list, stored unquoted.
    Tokens(Vec<String>),
    /// `upgrade-insecure-requests` and `block-all-mixed-content`.
    Flag(bool),
}

impl DirectiveValue {
    fn to_json(&self) -> Value {
        match self {
            DirectiveValue::Sources(sources) => {
                Value::Array(sources.iter().map(|s| Value::String(s.token())).collect())
            }
            DirectiveValue::Tokens(tokens) => {
                Value::Array(tokens.iter().cloned().map(Value::String).collect())
            }
            DirectiveValue::Flag(b) => Value::Bool(*b),
        }
    }
}

/// Directive map, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspDirectives {
    entries: BTreeMap<CspDirective, DirectiveValue>,
}

impl CspDirectives {
    /// Creates an empty directive map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a list directive, replacing any previous value.
    ///
    /// Values may be written with or without single quotes.
    pub fn set<I, S>(&mut self, directive: CspDirective, values: I) -> Result<&mut Self, CspError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let grammar = directive.grammar();
        let value = if grammar == Grammar::Flag {
            return Err(CspError::ExpectedFlag(directive));
        } else if grammar.is_source_list() {
            let mut sources = Vec::new();
            for v in values {
                sources.push(parse_source(directive, grammar, v.as_ref())?);
            }
            DirectiveValue::Sources(sources)
        } else {
            let mut tokens = Vec::new();
            for v in values {
                parse_tokens(directive, grammar, v.as_ref(), &mut tokens)?;
            }
            DirectiveValue::Tokens(tokens)
        };

        self.entries.insert(directive, value);
        Ok(self)
    }

    /// Sets a boolean directive.
    pub fn enable(&mut self, directive: CspDirective, on: bool) -> Result<&mut Self, CspError> {
        if directive.grammar() != Grammar::Flag {
            return Err(CspError::ExpectedList(directive));
        }
        self.entries.insert(directive, DirectiveValue::Flag(on));
        Ok(self)
    }

    /// Parses a JSON object of directive name to value, stopping at the first error.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, CspError> {
        let mut directives = Self::new();
        for (name, value) in map {
            directives.insert_json(name, value)?;
        }
        Ok(directives)
    }

    /// Parses a JSON object, keeping every valid directive and collecting
    /// the errors of the rest, keyed by directive name.
    pub fn parse_map(map: &Map<String, Value>) -> (Self, Vec<(String, CspError)>) {
        let mut directives = Self::new();
        let mut errors = Vec::new();
        for (name, value) in map {
            if let Err(e) = directives.insert_json(name, value) {
                errors.push((name.clone(), e));
            }
        }
        (directives, errors)
    }

    fn insert_json(&mut self, name: &str, value: &Value) -> Result<(), CspError> {
        let directive: CspDirective = name
            .parse()
            .map_err(|_| CspError::UnknownDirective(name.to_string()))?;

        match value {
            Value::Null => Ok(()),
            Value::Bool(b) => self.enable(directive, *b).map(|_| ()),
            Value::String(s) => self.set(directive, [s.as_str()]).map(|_| ()),
            Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => values.push(s.as_str()),
                        other => {
                            return Err(CspError::invalid(
                                directive,
                                &other.to_string(),
                                "expected a string",
                            ))
                        }
                    }
                }
                self.set(directive, values).map(|_| ())
            }
            _ if directive.grammar() == Grammar::Flag => Err(CspError::ExpectedFlag(directive)),
            _ => Err(CspError::ExpectedList(directive)),
        }
    }

    /// Returns the value of a directive.
    pub fn get(&self, directive: CspDirective) -> Option<&DirectiveValue> {
        self.entries.get(&directive)
    }

    /// Returns the sources of a source-list directive.
    pub fn sources(&self, directive: CspDirective) -> Option<&[Source]> {
        match self.entries.get(&directive) {
            Some(DirectiveValue::Sources(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns true if the directive is set.
    pub fn contains(&self, directive: CspDirective) -> bool {
        self.entries.contains_key(&directive)
    }

    /// Removes a directive.
    pub fn remove(&mut self, directive: CspDirective) -> Option<DirectiveValue> {
        self.entries.remove(&directive)
    }

    /// Iterates directives in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (CspDirective, &DirectiveValue)> {
        self.entries.iter().map(|(d, v)| (*d, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if violations can be reported (`report-uri` or `report-to` set).
    pub fn has_report_target(&self) -> bool {
        [CspDirective::ReportUri, CspDirective::ReportTo]
            .iter()
            .any(|d| {
                matches!(self.entries.get(d), Some(DirectiveValue::Tokens(t)) if !t.is_empty())
            })
    }

    pub(crate) fn insert_sources(&mut self, directive: CspDirective, sources: Vec<Source>) {
        self.entries.insert(directive, DirectiveValue::Sources(sources));
    }

    /// Serializes to a header value, e.g. `default-src 'self'; upgrade-insecure-requests`.
    pub fn to_header_value(&self) -> String {
        self.format_filtered(|_| false)
    }

    pub(crate) fn format_filtered(&self, skip: impl Fn(CspDirective) -> bool) -> String {
        let mut parts = Vec::new();

        for (directive, value) in &self.entries {
            if skip(*directive) {
                continue;
            }
            let mut part = directive.as_str().to_string();
            match value {
                DirectiveValue::Flag(false) => continue,
                DirectiveValue::Flag(true) => {}
                DirectiveValue::Sources(sources) => {
                    if sources.is_empty() {
                        continue;
                    }
                    for source in sources {
                        part.push(' ');
                        part.push_str(&source.to_string());
                    }
                }
                DirectiveValue::Tokens(tokens) => {
                    if tokens.is_empty() {
                        continue;
                    }
                    let grammar = directive.grammar();
                    for token in tokens {
                        part.push(' ');
                        if is_quoted_token(grammar, token) {
                            part.push('\'');
                            part.push_str(token);
                            part.push('\'');
                        } else {
                            part.push_str(token);
                        }
                    }
                }
            }
            parts.push(part);
        }

        parts.join("; ")
    }

    /// Converts back to the JSON object form.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(d, v)| (d.as_str().to_string(), v.to_json()))
            .collect()
    }
}

impl Serialize for CspDirectives {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(d, v)| (d.as_str(), v.to_json())))
    }
}

impl<'de> Deserialize<'de> for CspDirectives {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        CspDirectives::from_map(&map).map_err(serde::de::Error::custom)
    }
}

fn strip_quotes(token: &str) -> &str {
    token
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(token)
}

fn parse_source(
    directive: CspDirective,
    grammar: Grammar,
    token: &str,
) -> Result<Source, CspError> {
    let source =
        Source::parse(token).map_err(|reason| CspError::invalid(directive, token, reason))?;

    match (grammar, &source) {
        (Grammar::Sources, Source::Action(a)) => Err(CspError::invalid(
            directive,
            token,
            format!(
                "'{}' is only allowed in default-src, script-src, style-src, base-uri, form-action and navigate-to",
                a.as_str()
            ),
        )),
        (Grammar::FrameAncestors, Source::Host(_))
        | (Grammar::FrameAncestors, Source::Scheme(_))
        | (Grammar::FrameAncestors, Source::Keyword(Keyword::SelfOrigin))
        | (Grammar::FrameAncestors, Source::Keyword(Keyword::None)) => Ok(source),
        (Grammar::FrameAncestors, other) => Err(CspError::invalid(
            directive,
            token,
            format!("'{}' is not allowed in frame-ancestors", other.token()),
        )),
        _ => Ok(source),
    }
}

fn has_separator(s: &str) -> bool {
    s.chars().any(|c| c.is_whitespace() || c == ';' || c == ',')
}

fn parse_tokens(
    directive: CspDirective,
    grammar: Grammar,
    raw: &str,
    out: &mut Vec<String>,
) -> Result<(), CspError> {
    let token = strip_quotes(raw);
    let reject = |reason: &str| -> Result<(), CspError> {
        Err(CspError::invalid(directive, raw, reason))
    };

    match grammar {
        Grammar::Sandbox if !SANDBOX_TOKENS.contains(&token) => {
            return reject("not a sandbox keyword");
        }
        Grammar::UriPaths
            if !token.starts_with(['/', '?', '#', '\\']) || has_separator(token) =>
        {
            return reject("report paths must start with '/', '?', '#' or '\\'");
        }
        Grammar::ReportTo if !group_name_regex().is_match(token) => {
            return reject("expected a reporting group name");
        }
        Grammar::TrustedTypesFor if token != "script" => {
            return reject("only 'script' is supported");
        }
        Grammar::TrustedTypes
            if !matches!(token, "none" | "allow-duplicates" | "*")
                && !policy_name_regex().is_match(token) =>
        {
            return reject("expected 'none', 'allow-duplicates', '*' or a policy name");
        }
        Grammar::RequireSriFor => {
            let parts: Vec<&str> = token.split_whitespace().collect();
            if parts.is_empty() || parts.iter().any(|p| !matches!(*p, "script" | "style")) {
                return reject("expected 'script', 'style' or 'script style'");
            }
            out.extend(parts.into_iter().map(String::from));
            return Ok(());
        }
        Grammar::PluginTypes if token != "none" && !mime_type_regex().is_match(token) => {
            return reject("expected a MIME type such as application/pdf");
        }
        Grammar::Referrer if !REFERRER_TOKENS.contains(&token) => {
            return reject("not a referrer policy");
        }
        _ => {}
    }

    out.push(token.to_string());
    Ok(())
}

fn is_quoted_token(grammar: Grammar, token: &str) -> bool {
    match grammar {
        Grammar::TrustedTypesFor => true,
        Grammar::TrustedTypes => matches!(token, "none" | "allow-duplicates"),
        Grammar::PluginTypes | Grammar::Referrer => token == "none",
        _ => false,
    }
}
