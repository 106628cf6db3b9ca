//! Prerendering contracts.
//!
//! The crawler itself lives outside this crate. What it shares with adapters
//! is the [`Prerendered`] manifest of pages, assets and redirects it wrote,
//! plus the policies that decide what happens when a crawl hits an HTTP error
//! or a link to a fragment id that does not exist:
//!
//! | policy | effect |
//! |--------|--------|
//! | `fail` | abort the build with the formatted message |
//! | `warn` | log the message, record it, continue |
//! | `ignore` | continue silently |
//! | handler | call a custom function with the full details |

mod output;
mod policy;

pub use output::{
    page_file, PrerenderMap, PrerenderOption, Prerendered, PrerenderedAsset, PrerenderedPage,
    PrerenderedRedirect,
};
pub use policy::{
    ErrorPolicy, HttpErrorDetails, HttpErrorPolicy, IssueHandler, IssueReporter,
    MissingIdDetails, MissingIdPolicy, PrerenderError, ReferenceType, ReportedIssue,
};

#[cfg(test)]
mod tests;
