//! The adapter entry contract.

use futures_util::future::BoxFuture;
use thiserror::Error;

use super::route::RouteDefinition;
use crate::validation::relative_path_errors;

/// Options for [`ManifestGenerator::generate_manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestOptions {
    relative_path: String,
}

impl ManifestOptions {
    /// Creates options for a manifest rooted at `relative_path`.
    ///
    /// The path is resolved against the serving unit's output directory, so it
    /// must be relative and must not escape it.
    pub fn new(relative_path: impl Into<String>) -> Result<Self, CompleteError> {
        let relative_path = relative_path.into();
        let errors = relative_path_errors(&relative_path);
        if !errors.is_empty() {
            return Err(CompleteError::InvalidPath(errors.join("; ")));
        }
        Ok(Self { relative_path })
    }

    /// Returns the relative path.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }
}

/// Capability handed to [`AdapterEntry::complete`].
///
/// Implementations must be pure with respect to `opts`: the same options
/// always yield the same manifest, so an adapter may call this once per
/// physical location of the same serving unit.
pub trait ManifestGenerator: Send + Sync {
    /// Renders the routing manifest for the serving unit.
    fn generate_manifest(&self, opts: &ManifestOptions) -> String;
}

/// Errors an entry may return from `complete`.
#[derive(Debug, Error)]
pub enum CompleteError {
    /// Writing the serving unit failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The relative manifest path is unsafe.
    #[error("invalid manifest path: {0}")]
    InvalidPath(String),

    /// Adapter-defined failure.
    #[error("{0}")]
    Message(String),
}

/// One deployable serving unit described by an adapter.
pub trait AdapterEntry: Send + Sync {
    /// Identifies the serving unit. Entries with equal ids are the same
    /// deployable target.
    fn id(&self) -> &str;

    /// Returns true if `route` should be folded into this entry as a fallback.
    ///
    /// Must be deterministic and side-effect free: it is called once for every
    /// lower-priority route of the build.
    fn filter(&self, route: &RouteDefinition) -> bool;

    /// Writes the serving unit. Called exactly once per surviving entry, after
    /// grouping has finished.
    fn complete<'a>(
        &'a self,
        generator: &'a dyn ManifestGenerator,
    ) -> BoxFuture<'a, Result<(), CompleteError>>;
}

type FilterFn = Box<dyn Fn(&RouteDefinition) -> bool + Send + Sync>;
type CompleteFuture<'a> = BoxFuture<'a, Result<(), CompleteError>>;
type CompleteFn =
    Box<dyn for<'a> Fn(&'a dyn ManifestGenerator) -> CompleteFuture<'a> + Send + Sync>;

/// An [`AdapterEntry`] assembled from closures.
pub struct FnEntry {
    id: String,
    filter: FilterFn,
    complete: CompleteFn,
}

impl FnEntry {
    /// Creates an entry whose `complete` does nothing.
    pub fn new(
        id: impl Into<String>,
        filter: impl Fn(&RouteDefinition) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            filter: Box::new(filter),
            complete: Box::new(complete_noop),
        }
    }

    /// Sets the completion callback.
    pub fn on_complete(
        mut self,
        complete: impl for<'a> Fn(&'a dyn ManifestGenerator) -> CompleteFuture<'a>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.complete = Box::new(complete);
        self
    }
}

fn complete_noop(_: &dyn ManifestGenerator) -> BoxFuture<'_, Result<(), CompleteError>> {
    Box::pin(async { Ok(()) })
}

impl std::fmt::Debug for FnEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEntry").field("id", &self.id).finish_non_exhaustive()
    }
}

impl AdapterEntry for FnEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn filter(&self, route: &RouteDefinition) -> bool {
        (self.filter)(route)
    }

    fn complete<'a>(
        &'a self,
        generator: &'a dyn ManifestGenerator,
    ) -> BoxFuture<'a, Result<(), CompleteError>> {
        (self.complete)(generator)
    }
}
