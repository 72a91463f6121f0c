//! Memoized per-group aggregate metrics.
//!
//! ## Usage
//!
//! The cell resolver asks [`GroupStatsCache::resolve`] for stats the first
//! time a group key scrolls into view; every later lookup for the same key
//! returns the identical cached value.
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::source::ItemGroup;

/// Aggregate metrics derived from one group's members.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupStats {
    /// Number of member items.
    pub episode_count: usize,
    /// Distinct source names across members, sorted.
    pub source_names: Vec<String>,
    /// Canonical catalog id, taken from the first member.
    pub catalog_id: String,
}

impl GroupStats {
    fn derive(group: &ItemGroup) -> Self {
        let mut source_names: Vec<String> = group
            .items
            .iter()
            .map(|item| item.source_name.clone())
            .collect();
        source_names.sort_unstable();
        source_names.dedup();

        Self {
            episode_count: group.items.len(),
            source_names,
            catalog_id: group
                .items
                .first()
                .map(|item| item.id.clone())
                .unwrap_or_default(),
        }
    }
}

/// Append-only cache of [`GroupStats`] keyed by group key.
///
/// Entries are computed at most once per key and never recomputed, even if
/// the underlying group's contents would yield a different result:
/// consumers hold imperative handles to rendered cards, so referential
/// stability wins over freshness. The cache is cleared wholesale when the
/// source identity changes.
#[derive(Default)]
pub struct GroupStatsCache {
    entries: FxHashMap<String, Arc<GroupStats>>,
}

impl GroupStatsCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached stats for `group.key`, computing them on first
    /// sight of the key.
    pub fn resolve(&mut self, group: &ItemGroup) -> Arc<GroupStats> {
        if let Some(stats) = self.entries.get(&group.key) {
            return stats.clone();
        }
        let stats = Arc::new(GroupStats::derive(group));
        self.entries.insert(group.key.clone(), stats.clone());
        stats
    }

    /// Drops every entry. Run this when the source identity changes.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
