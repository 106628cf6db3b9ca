//! CSP directive names and the value grammar each accepts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value grammar accepted by a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// Keyword, scheme, host and crypto sources.
    Sources,
    /// [`Grammar::Sources`] plus `'strict-dynamic'` and `'report-sample'`.
    SourcesWithActions,
    /// Host and scheme sources, `'self'` and `'none'`.
    FrameAncestors,
    /// `allow-*` sandbox tokens.
    Sandbox,
    /// Relative report paths starting with `/`, `?`, `#` or `\`.
    UriPaths,
    /// A single reporting group name.
    ReportTo,
    /// Only `script`.
    TrustedTypesFor,
    /// `none`, `allow-duplicates`, `*` or policy names.
    TrustedTypes,
    /// `script`, `style` or both.
    RequireSriFor,
    /// MIME types or `none`.
    PluginTypes,
    /// Referrer policy tokens.
    Referrer,
    /// Boolean flag with no value.
    Flag,
}

impl Grammar {
    /// Returns true if the directive takes a source list.
    pub fn is_source_list(&self) -> bool {
        matches!(
            self,
            Grammar::Sources | Grammar::SourcesWithActions | Grammar::FrameAncestors
        )
    }
}

/// Every known CSP directive, in declaration order.
///
/// Ordering of the enum is the order directives are written in a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CspDirective {
    ChildSrc,
    DefaultSrc,
    FrameSrc,
    WorkerSrc,
    ConnectSrc,
    FontSrc,
    ImgSrc,
    ManifestSrc,
    MediaSrc,
    ObjectSrc,
    PrefetchSrc,
    ScriptSrc,
    ScriptSrcElem,
    ScriptSrcAttr,
    StyleSrc,
    StyleSrcElem,
    StyleSrcAttr,
    BaseUri,
    Sandbox,
    FormAction,
    FrameAncestors,
    NavigateTo,
    ReportUri,
    ReportTo,
    RequireTrustedTypesFor,
    TrustedTypes,
    UpgradeInsecureRequests,
    RequireSriFor,
    BlockAllMixedContent,
    PluginTypes,
    Referrer,
}

impl CspDirective {
    /// Returns all directives in declaration order.
    pub fn all() -> &'static [CspDirective] {
        use CspDirective::*;
        &[
            ChildSrc,
            DefaultSrc,
            FrameSrc,
            WorkerSrc,
            ConnectSrc,
            FontSrc,
            ImgSrc,
            ManifestSrc,
            MediaSrc,
            ObjectSrc,
            PrefetchSrc,
            ScriptSrc,
            ScriptSrcElem,
            ScriptSrcAttr,
            StyleSrc,
            StyleSrcElem,
            StyleSrcAttr,
            BaseUri,
            Sandbox,
            FormAction,
            FrameAncestors,
            NavigateTo,
            ReportUri,
            ReportTo,
            RequireTrustedTypesFor,
            TrustedTypes,
            UpgradeInsecureRequests,
            RequireSriFor,
            BlockAllMixedContent,
            PluginTypes,
            Referrer,
        ]
    }

    /// Returns the directive name as written in a header.
    pub fn as_str(&self) -> &'static str {
        match self {
            CspDirective::ChildSrc => "child-src",
            CspDirective::DefaultSrc => "default-src",
            CspDirective::FrameSrc => "frame-src",
            CspDirective::WorkerSrc => "worker-src",
            CspDirective::ConnectSrc => "connect-src",
            CspDirective::FontSrc => "font-src",
            CspDirective::ImgSrc => "img-src",
            CspDirective::ManifestSrc => "manifest-src",
            CspDirective::MediaSrc => "media-src",
            CspDirective::ObjectSrc => "object-src",
            CspDirective::PrefetchSrc => "prefetch-src",
            CspDirective::ScriptSrc => "script-src",
            CspDirective::ScriptSrcElem => "script-src-elem",
            CspDirective::ScriptSrcAttr => "script-src-attr",
            CspDirective::StyleSrc => "style-src",
            CspDirective::StyleSrcElem => "style-src-elem",
            CspDirective::StyleSrcAttr => "style-src-attr",
            CspDirective::BaseUri => "base-uri",
            CspDirective::Sandbox => "sandbox",
            CspDirective::FormAction => "form-action",
            CspDirective::FrameAncestors => "frame-ancestors",
            CspDirective::NavigateTo => "navigate-to",
            CspDirective::ReportUri => "report-uri",
            CspDirective::ReportTo => "report-to",
            CspDirective::RequireTrustedTypesFor => "require-trusted-types-for",
            CspDirective::TrustedTypes => "trusted-types",
            CspDirective::UpgradeInsecureRequests => "upgrade-insecure-requests",
            CspDirective::RequireSriFor => "require-sri-for",
            CspDirective::BlockAllMixedContent => "block-all-mixed-content",
            CspDirective::PluginTypes => "plugin-types",
            CspDirective::Referrer => "referrer",
        }
    }

    /// Returns the value grammar of the directive.
    pub fn grammar(&self) -> Grammar {
        use CspDirective::*;
        match self {
            DefaultSrc | ScriptSrc | StyleSrc | BaseUri | FormAction | NavigateTo => {
                Grammar::SourcesWithActions
            }
            ChildSrc | FrameSrc | WorkerSrc | ConnectSrc | FontSrc | ImgSrc | ManifestSrc
            | MediaSrc | ObjectSrc | PrefetchSrc | ScriptSrcElem | ScriptSrcAttr
            | StyleSrcElem | StyleSrcAttr => Grammar::Sources,
            FrameAncestors => Grammar::FrameAncestors,
            Sandbox => Grammar::Sandbox,
            ReportUri => Grammar::UriPaths,
            ReportTo => Grammar::ReportTo,
            RequireTrustedTypesFor => Grammar::TrustedTypesFor,
            TrustedTypes => Grammar::TrustedTypes,
            RequireSriFor => Grammar::RequireSriFor,
            PluginTypes => Grammar::PluginTypes,
            Referrer => Grammar::Referrer,
            UpgradeInsecureRequests | BlockAllMixedContent => Grammar::Flag,
        }
    }

    /// Returns true for directives browsers no longer support.
    pub fn is_deprecated(&self) -> bool {
        matches!(
            self,
            CspDirective::RequireSriFor
                | CspDirective::BlockAllMixedContent
                | CspDirective::PluginTypes
                | CspDirective::Referrer
        )
    }

    /// Returns true if the directive is ignored when delivered in a `<meta>` tag.
    pub fn is_header_only(&self) -> bool {
        matches!(
            self,
            CspDirective::FrameAncestors | CspDirective::ReportUri | CspDirective::Sandbox
        )
    }
}

impl std::fmt::Display for CspDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CspDirective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CspDirective::all()
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown CSP directive '{}'", s))
    }
}

impl Serialize for CspDirective {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CspDirective {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
