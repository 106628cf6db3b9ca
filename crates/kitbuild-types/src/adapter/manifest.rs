//! Routing manifests for grouped serving units.

use serde::{Deserialize, Serialize};

use super::entry::{ManifestGenerator, ManifestOptions};
use super::route::{RouteDefinition, RouteSegment};
use crate::http::HttpMethod;

/// Current manifest schema version.
pub const MANIFEST_VERSION: u32 = 1;

/// Routing manifest written next to a serving unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteManifest {
    /// Schema version for the manifest (currently 1).
    pub manifest_version: u32,
    /// Id of the serving unit.
    pub entry: String,
    /// Path of the manifest relative to the unit's output directory.
    pub relative_path: String,
    /// Routes served by this unit, seed route first.
    pub routes: Vec<ManifestRoute>,
}

/// One route entry in a [`RouteManifest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRoute {
    /// Route id.
    pub id: String,
    /// Regex source matching request paths.
    pub pattern: String,
    /// Parsed segments.
    pub segments: Vec<RouteSegment>,
    /// Exported methods.
    pub methods: Vec<HttpMethod>,
}

impl From<&RouteDefinition> for ManifestRoute {
    fn from(route: &RouteDefinition) -> Self {
        Self {
            id: route.id.clone(),
            pattern: route.pattern.clone(),
            segments: route.segments.clone(),
            methods: route.methods.clone(),
        }
    }
}

/// A serving unit after deduplication: one id, one or more routes.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryGroup {
    /// Id shared by every entry folded into this group.
    pub id: String,
    /// Routes in the group. The first is the seed route; the rest are fallbacks
    /// or routes of later entries with the same id.
    pub routes: Vec<RouteDefinition>,
}

impl EntryGroup {
    /// Creates a group seeded with one route.
    pub fn new(id: impl Into<String>, seed: RouteDefinition) -> Self {
        Self {
            id: id.into(),
            routes: vec![seed],
        }
    }

    /// Adds a route unless a route with the same id is already present.
    /// Returns true if the route was added.
    pub fn absorb(&mut self, route: &RouteDefinition) -> bool {
        if self.contains(&route.id) {
            return false;
        }
        self.routes.push(route.clone());
        true
    }

    /// Returns true if the group serves the route with `route_id`.
    pub fn contains(&self, route_id: &str) -> bool {
        self.routes.iter().any(|r| r.id == route_id)
    }

    /// Returns the route ids in group order.
    pub fn route_ids(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.id.as_str()).collect()
    }

    /// Builds the manifest for this group.
    pub fn manifest(&self, opts: &ManifestOptions) -> RouteManifest {
        RouteManifest {
            manifest_version: MANIFEST_VERSION,
            entry: self.id.clone(),
            relative_path: opts.relative_path().to_string(),
            routes: self.routes.iter().map(ManifestRoute::from).collect(),
        }
    }
}

impl ManifestGenerator for EntryGroup {
    fn generate_manifest(&self, opts: &ManifestOptions) -> String {
        // Serializing plain strings, vecs and enums cannot fail.
        serde_json::to_string_pretty(&self.manifest(opts)).unwrap_or_default()
    }
}
