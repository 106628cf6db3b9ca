//! Test fixtures: temporary projects and a file-writing adapter entry.

use futures_util::future::BoxFuture;
use kitbuild_types::adapter::{
    AdapterEntry, CompleteError, ManifestGenerator, ManifestOptions, RouteDefinition,
};
use kitbuild_types::http::HttpMethod;
use kitbuild_types::prerender::PrerenderOption;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project with an output directory.
pub struct ProjectFixture {
    pub root: TempDir,
    pub out_dir: PathBuf,
}

impl ProjectFixture {
    /// Create a new empty project.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let out_dir = root.path().join("build");
        fs::create_dir_all(&out_dir).expect("Failed to create build dir");
        Self { root, out_dir }
    }

    /// Get the project root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write `kitbuild.json` and return its path.
    pub fn write_config(&self, content: &str) -> PathBuf {
        self.write_file("kitbuild.json", content)
    }

    /// Write a file relative to the project root.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Lists manifest files written under the output directory, sorted.
    pub fn written_manifests(&self) -> Vec<PathBuf> {
        let functions = self.out_dir.join("functions");
        let mut found = Vec::new();
        if let Ok(dirs) = fs::read_dir(&functions) {
            for dir in dirs.flatten() {
                let manifest = dir.path().join("manifest.json");
                if manifest.exists() {
                    found.push(manifest);
                }
            }
        }
        found.sort();
        found
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// An adapter entry that writes `functions/<name>/manifest.json`.
#[derive(Debug, Clone)]
pub struct FileWritingEntry {
    id: String,
    out_dir: PathBuf,
    fallback_prefix: Option<String>,
}

impl FileWritingEntry {
    pub fn new(id: impl Into<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            out_dir: out_dir.into(),
            fallback_prefix: None,
        }
    }

    /// Absorb later routes whose id starts with `prefix`.
    pub fn with_fallbacks(mut self, prefix: impl Into<String>) -> Self {
        self.fallback_prefix = Some(prefix.into());
        self
    }

    /// Directory name derived from the id.
    pub fn dir_name(&self) -> String {
        self.id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}

impl AdapterEntry for FileWritingEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn filter(&self, route: &RouteDefinition) -> bool {
        self.fallback_prefix
            .as_deref()
            .map_or(false, |prefix| route.id.starts_with(prefix))
    }

    fn complete<'a>(
        &'a self,
        generator: &'a dyn ManifestGenerator,
    ) -> BoxFuture<'a, Result<(), CompleteError>> {
        Box::pin(async move {
            let opts =
                ManifestOptions::new(format!("functions/{}/manifest.json", self.dir_name()))?;
            let manifest = generator.generate_manifest(&opts);
            let path = self.out_dir.join(opts.relative_path());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, manifest)?;
            Ok(())
        })
    }
}

/// A small app: static pages, a blog with a dynamic post route, an API
/// endpoint and a catch-all.
pub fn sample_routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::new("/").prerender(PrerenderOption::Enabled),
        RouteDefinition::new("/about").prerender(PrerenderOption::Enabled),
        RouteDefinition::new("/blog").prerender(PrerenderOption::Auto),
        RouteDefinition::new("/blog/[slug]"),
        RouteDefinition::new("/api/items")
            .methods([HttpMethod::Get, HttpMethod::Post]),
        RouteDefinition::new("/(marketing)/pricing"),
        RouteDefinition::new("/[...rest]"),
    ]
}
