//! Content-Security-Policy directives and header serialization.
//!
//! [`CspDirectives`] only holds recognised directives whose values match the
//! grammar of that directive; anything else is rejected with [`CspError`]
//! when it is set. Serialization quotes keyword, action and crypto sources,
//! writes boolean directives as a bare name and keeps declaration order.
//!
//! [`CspHeaderBuilder`] adds per-response nonces or hashes for inline
//! `<script>` and `<style>` content according to [`CspMode`].

mod directive;
mod header;
mod policy;
mod source;

pub use directive::{CspDirective, Grammar};
pub use header::{
    generate_nonce, sha256_base64, CspConfig, CspHeaderBuilder, CspMode, CSP_HEADER,
    CSP_REPORT_ONLY_HEADER,
};
pub use policy::{CspDirectives, CspError, DirectiveValue};
pub use source::{
    ActionSource, CryptoSource, HashAlgorithm, HostSource, Keyword, Port, SchemeSource, Source,
};
