//! Route definitions as seen by adapters.

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;
use crate::prerender::PrerenderOption;

/// One `/`-separated piece of a route id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Raw segment text, e.g. `a-[b]` or `[...rest]`.
    pub content: String,
    /// Whether the segment contains a parameter.
    pub dynamic: bool,
    /// Whether the segment is a rest parameter (`[...name]`).
    pub rest: bool,
}

impl RouteSegment {
    /// Creates a segment, deriving `dynamic` and `rest` from its content.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let dynamic = content.contains('[');
        let rest = content.contains("[...");
        Self {
            content,
            dynamic,
            rest,
        }
    }

    /// Splits a route id into segments.
    ///
    /// Empty segments and layout groups such as `(marketing)` are dropped, so
    /// `/(app)/foo/[bar]` yields `foo` and `[bar]`.
    pub fn parse_id(id: &str) -> Vec<RouteSegment> {
        id.split('/')
            .filter(|s| !s.is_empty() && !is_group(s))
            .map(RouteSegment::new)
            .collect()
    }
}

fn is_group(segment: &str) -> bool {
    segment.starts_with('(') && segment.ends_with(')')
}

/// A route known to the build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Route id, e.g. `/blog/[slug]`.
    pub id: String,
    /// Regular-expression source matching request paths for this route.
    pub pattern: String,
    /// Segments derived from the id.
    pub segments: Vec<RouteSegment>,
    /// Methods the route exports handlers for.
    #[serde(default)]
    pub methods: Vec<HttpMethod>,
    /// Prerender setting for the route.
    #[serde(default)]
    pub prerender: PrerenderOption,
    /// Adapter-specific route config.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl RouteDefinition {
    /// Creates a route from its id. Segments and pattern are derived; the
    /// route serves `GET` and is not prerendered.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let segments = RouteSegment::parse_id(&id);
        let pattern = route_pattern(&segments);
        Self {
            id,
            pattern,
            segments,
            methods: vec![HttpMethod::Get],
            prerender: PrerenderOption::Disabled,
            config: serde_json::Map::new(),
        }
    }

    /// Replaces the method list.
    pub fn methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Sets the prerender option.
    pub fn prerender(mut self, prerender: PrerenderOption) -> Self {
        self.prerender = prerender;
        self
    }

    /// Sets one adapter config key.
    pub fn config_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Returns true if any segment is dynamic.
    pub fn is_dynamic(&self) -> bool {
        self.segments.iter().any(|s| s.dynamic)
    }

    /// Returns true if the route ends in a rest parameter.
    pub fn is_catchall(&self) -> bool {
        self.segments.last().is_some_and(|s| s.rest)
    }
}

/// Builds a regex source for a list of segments.
fn route_pattern(segments: &[RouteSegment]) -> String {
    if segments.is_empty() {
        return "^/$".to_string();
    }

    let mut pattern = String::from("^");
    for segment in segments {
        // optional `[[name]]` and rest `[...name]` may match nothing
        if is_optional(&segment.content) {
            pattern.push_str("(?:/([^/]+))?");
        } else if segment.rest
            && segment.content.starts_with("[...")
            && segment.content.ends_with(']')
        {
            pattern.push_str("(/.*)?");
        } else {
            pattern.push('/');
            pattern.push_str(&segment_pattern(&segment.content));
        }
    }
    pattern.push_str("/?$");
    pattern
}

fn is_optional(content: &str) -> bool {
    content.starts_with("[[") && content.ends_with("]]")
}

fn segment_pattern(content: &str) -> String {
    let mut out = String::new();
    let mut rest = content;
    while let Some(start) = rest.find('[') {
        out.push_str(&regex::escape(&rest[..start]));
        let Some(len) = rest[start..].find(']') else {
            out.push_str(&regex::escape(&rest[start..]));
            return out;
        };
        let param = &rest[start + 1..start + len];
        if param.starts_with("...") {
            out.push_str("(.*?)");
        } else {
            out.push_str("([^/]+?)");
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(&regex::escape(rest));
    out
}
