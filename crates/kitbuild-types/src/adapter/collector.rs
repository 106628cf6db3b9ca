//! Entry collection: deduplication, fallback grouping, completion.

use std::collections::HashMap;
use std::sync::Arc;

use super::entry::AdapterEntry;
use super::manifest::EntryGroup;
use super::route::RouteDefinition;
use crate::error::AdapterError;
use crate::logger::Logger;
use crate::prerender::PrerenderOption;

/// A surviving entry together with the routes it serves.
pub struct GroupedEntry {
    /// The grouped routes.
    pub group: EntryGroup,
    entry: Box<dyn AdapterEntry>,
}

impl GroupedEntry {
    /// Returns the group id.
    pub fn id(&self) -> &str {
        &self.group.id
    }

    /// Returns the representative (first-registered) entry.
    pub fn entry(&self) -> &dyn AdapterEntry {
        self.entry.as_ref()
    }
}

impl std::fmt::Debug for GroupedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupedEntry")
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful [`EntryCollector::create_entries`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Ids of completed entries, in completion order.
    pub completed: Vec<String>,
}

/// Collects adapter entries for a build.
#[derive(Default)]
pub struct EntryCollector {
    logger: Option<Arc<dyn Logger>>,
}

impl EntryCollector {
    /// Creates a collector without a logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports completed entries to `logger`.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Groups routes into serving units.
    ///
    /// `factory` is called once per route that is not fully prerendered, in
    /// route order. The first entry seen for an id is the representative: its
    /// `filter` decides which later routes fold into the group. Later entries
    /// sharing the id only contribute their seed route.
    pub fn group<F>(&self, routes: &[RouteDefinition], mut factory: F) -> Vec<GroupedEntry>
    where
        F: FnMut(&RouteDefinition) -> Box<dyn AdapterEntry>,
    {
        let mut grouped: Vec<GroupedEntry> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for (i, route) in routes.iter().enumerate() {
            if route.prerender == PrerenderOption::Enabled {
                tracing::debug!(route = %route.id, "skipping prerendered route");
                continue;
            }

            let entry = factory(route);
            let id = entry.id().to_string();

            if let Some(&slot) = by_id.get(&id) {
                let added = grouped[slot].group.absorb(route);
                tracing::debug!(
                    route = %route.id,
                    entry = %id,
                    added,
                    "merged into existing entry"
                );
                continue;
            }

            let mut group = EntryGroup::new(id.clone(), route.clone());
            for candidate in &routes[i + 1..] {
                if candidate.prerender == PrerenderOption::Enabled {
                    continue;
                }
                if entry.filter(candidate) && group.absorb(candidate) {
                    tracing::debug!(route = %candidate.id, entry = %id, "absorbed as fallback");
                }
            }

            by_id.insert(id, grouped.len());
            grouped.push(GroupedEntry { group, entry });
        }

        grouped
    }

    /// Calls `complete` once per grouped entry, in order.
    ///
    /// Stops at the first failure; entries after it are never completed.
    pub async fn complete_all(
        &self,
        grouped: Vec<GroupedEntry>,
    ) -> Result<BuildSummary, AdapterError> {
        let mut summary = BuildSummary::default();

        for item in grouped {
            let id = item.group.id.clone();
            if let Err(source) = item.entry.complete(&item.group).await {
                if let Some(logger) = &self.logger {
                    logger.error(&format!("Failed to complete entry {}: {}", id, source));
                }
                return Err(AdapterError::CompleteFailed { id, source });
            }

            if let Some(logger) = &self.logger {
                logger.minor(&format!(
                    "Completed entry {} ({} route(s))",
                    id,
                    item.group.routes.len()
                ));
            }
            summary.completed.push(id);
        }

        Ok(summary)
    }

    /// Groups `routes` with `factory`, then completes every surviving entry.
    pub async fn create_entries<F>(
        &self,
        routes: &[RouteDefinition],
        factory: F,
    ) -> Result<BuildSummary, AdapterError>
    where
        F: FnMut(&RouteDefinition) -> Box<dyn AdapterEntry>,
    {
        let grouped = self.group(routes, factory);
        self.complete_all(grouped).await
    }
}

impl std::fmt::Debug for EntryCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryCollector")
            .field("logger", &self.logger.is_some())
            .finish()
    }
}
