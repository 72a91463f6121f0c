//! Cell resolution: mapping a (row, column) window coordinate to the card
//! request the presentation layer renders, or to an empty placeholder.
//!
//! ## Usage
//!
//! The windowing primitive invokes the [`CellRenderer`] for each visible
//! coordinate. The renderer is constructed once per grid and captures no
//! data; it reads the current [`GridSnapshot`] through its stable handle
//! at call time.
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    source::CatalogSource,
    stable::{GridSnapshot, SnapshotHandle},
    stats::{GroupStats, GroupStatsCache},
};

/// Presentation variant for a group card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardKind {
    /// Single-episode group.
    Movie,
    /// Multi-episode group.
    Series,
}

/// Card request for one flat item.
#[derive(Clone, Debug, PartialEq)]
pub struct CardRequest {
    /// Upstream item id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Poster reference.
    pub poster: Option<String>,
    /// Release year.
    pub year: Option<u16>,
    /// Aggregate rating.
    pub rating: Option<f32>,
}

/// Card request for one group, with derived statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupCardRequest {
    /// The group key.
    pub key: String,
    /// Title taken from the first member.
    pub title: String,
    /// Poster taken from the first member.
    pub poster: Option<String>,
    /// Year taken from the first member.
    pub year: Option<u16>,
    /// Movie or series, from the episode count.
    pub kind: CardKind,
    /// Cached aggregate metrics for the group.
    pub stats: Arc<GroupStats>,
    /// Search text the card should highlight, if any.
    pub highlight_query: Option<String>,
}

/// What one window coordinate resolves to.
///
/// Placeholders keep the grid rectangle fully tiled on partially filled
/// last rows and in buffer rows.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContent {
    /// Empty slot occupying the cell geometry.
    Placeholder,
    /// A flat item's card.
    Single(CardRequest),
    /// A group's card.
    Group(GroupCardRequest),
}

/// Resolves window coordinates against the current snapshot.
///
/// Owns the group-stats cache; the first resolution of an unseen group
/// key computes and caches its stats.
#[derive(Default)]
pub struct CellResolver {
    stats: GroupStatsCache,
}

impl CellResolver {
    /// Creates a resolver with an empty stats cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops cached group stats. Run on source identity changes.
    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    /// Resolves `(row, column)` to cell content.
    ///
    /// Indices beyond the exposure or beyond the actual data yield a
    /// placeholder; a malformed entry never fails the window.
    pub fn resolve(&mut self, snapshot: &GridSnapshot, row: usize, column: usize) -> CellContent {
        if snapshot.column_count == 0 || column >= snapshot.column_count {
            return CellContent::Placeholder;
        }
        let index = row * snapshot.column_count + column;
        if index >= snapshot.exposed_count {
            return CellContent::Placeholder;
        }

        match &snapshot.source {
            CatalogSource::Flat(items) => match items.get(index) {
                Some(item) => CellContent::Single(CardRequest {
                    id: item.id.clone(),
                    title: item.title.clone(),
                    poster: item.poster.clone(),
                    year: item.year,
                    rating: item.rating,
                }),
                None => CellContent::Placeholder,
            },
            CatalogSource::Grouped(groups) => {
                let Some(group) = groups.get(index) else {
                    return CellContent::Placeholder;
                };
                let Some(first) = group.items.first() else {
                    return CellContent::Placeholder;
                };
                let stats = self.stats.resolve(group);
                let kind = if stats.episode_count == 1 {
                    CardKind::Movie
                } else {
                    CardKind::Series
                };
                CellContent::Group(GroupCardRequest {
                    key: group.key.clone(),
                    title: first.title.clone(),
                    poster: first.poster.clone(),
                    year: first.year,
                    kind,
                    stats,
                    highlight_query: highlight_for(snapshot.search_query.as_deref(), &first.title),
                })
            }
        }
    }
}

/// The query a card should highlight. A query equal to the title verbatim
/// would highlight the whole card, so it is suppressed.
fn highlight_for(query: Option<&str>, title: &str) -> Option<String> {
    match query {
        Some(q) if !q.is_empty() && q != title => Some(q.to_string()),
        _ => None,
    }
}

/// The cell-rendering callback handed to the windowing primitive.
///
/// Built once per grid with no captured data; equality is pointer
/// identity so the primitive's memoization survives data mutations.
#[derive(Clone)]
pub struct CellRenderer {
    snapshot: SnapshotHandle,
    resolver: Arc<Mutex<CellResolver>>,
}

impl CellRenderer {
    pub(crate) fn new(snapshot: SnapshotHandle, resolver: Arc<Mutex<CellResolver>>) -> Self {
        Self { snapshot, resolver }
    }

    /// Resolves one visible coordinate against the current snapshot.
    pub fn render(&self, row: usize, column: usize) -> CellContent {
        self.snapshot
            .with(|snapshot| self.resolver.lock().resolve(snapshot, row, column))
    }
}

impl PartialEq for CellRenderer {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot == other.snapshot && Arc::ptr_eq(&self.resolver, &other.resolver)
    }
}
