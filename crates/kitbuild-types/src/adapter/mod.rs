//! Adapter entry protocol.
//!
//! An adapter turns the routes of a build into deployable serving units
//! (for example one serverless function per group of routes). It does so by
//! returning an [`AdapterEntry`] for each route:
//!
//! 1. **Identify**: `id()` names the serving unit; equal ids are one unit
//! 2. **Group**: the first entry for an id decides, through `filter()`, which
//!    lower-priority routes fall back to it
//! 3. **Complete**: once grouping is final, `complete()` runs exactly once per
//!    unit and receives a [`ManifestGenerator`] for writing routing manifests
//!
//! # Example
//!
//! ```
//! use kitbuild_types::adapter::{AdapterEntry, EntryCollector, FnEntry, RouteDefinition};
//!
//! let routes = vec![
//!     RouteDefinition::new("/foo/a-[b]"),
//!     RouteDefinition::new("/foo/[c]"),
//!     RouteDefinition::new("/[...catchall]"),
//! ];
//!
//! // Every route under /foo shares one function; the catch-all gets its own.
//! let collector = EntryCollector::new();
//! let grouped = collector.group(&routes, |route| {
//!     let id = if route.id.starts_with("/foo") { "fn:foo" } else { "fn:catchall" };
//!     Box::new(FnEntry::new(id, |_| false)) as Box<dyn AdapterEntry>
//! });
//!
//! assert_eq!(grouped.len(), 2);
//! assert_eq!(grouped[0].group.route_ids(), vec!["/foo/a-[b]", "/foo/[c]"]);
//! ```

mod collector;
mod entry;
mod manifest;
mod route;

pub use collector::{BuildSummary, EntryCollector, GroupedEntry};
pub use entry::{AdapterEntry, CompleteError, FnEntry, ManifestGenerator, ManifestOptions};
pub use manifest::{EntryGroup, ManifestRoute, RouteManifest, MANIFEST_VERSION};
pub use route::{RouteDefinition, RouteSegment};
