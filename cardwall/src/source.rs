//! Catalog data as consumed by the grid: items, groups, and the source
//! sequence the exposure window draws from.
//!
//! ## Usage
//!
//! Build a [`CatalogSource`] from a fetched page of results and hand it to
//! the grid. Replacing the source with a logically different one (new
//! search, new filter, new view mode) is an identity change; appending a
//! page to the same logical result set is not.
use std::sync::Arc;

/// A single catalog entry as delivered by an upstream source.
///
/// Immutable once received. Optional fields tolerate sparse upstream
/// payloads; missing data degrades to placeholder presentation, never to a
/// failure.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogItem {
    /// Upstream identifier, unique within one source snapshot.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Poster image reference, if the source provided one.
    pub poster: Option<String>,
    /// Release year.
    pub year: Option<u16>,
    /// Aggregate rating.
    pub rating: Option<f32>,
    /// Name of the source that produced this entry.
    pub source_name: String,
}

/// An ordered run of items sharing one logical key.
///
/// Membership is fixed once the group is constructed; a group key uniquely
/// identifies a group within one source snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemGroup {
    /// The logical key the members share (e.g. a canonical title).
    pub key: String,
    /// Members in upstream order. The first member drives card
    /// presentation.
    pub items: Vec<CatalogItem>,
}

/// The sequence a grid draws from: flat items or grouped titles.
///
/// Exactly one variant is current at a time; switching view mode replaces
/// the source wholesale and counts as an identity change.
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogSource {
    /// A flat ordered sequence of items.
    Flat(Arc<Vec<CatalogItem>>),
    /// An ordered sequence of groups.
    Grouped(Arc<Vec<ItemGroup>>),
}

impl CatalogSource {
    /// Creates an empty flat source.
    pub fn empty() -> Self {
        Self::Flat(Arc::new(Vec::new()))
    }

    /// Number of logical entries (items or groups).
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(items) => items.len(),
            Self::Grouped(groups) => groups.len(),
        }
    }

    /// Returns `true` when the source holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two sources are the same underlying sequence.
    ///
    /// Identity is the backing allocation, not content equality: a
    /// re-fetch that produces a new but content-equal sequence is a new
    /// identity and resets the reveal window.
    pub fn same_identity(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Flat(a), Self::Flat(b)) => Arc::ptr_eq(a, b),
            (Self::Grouped(a), Self::Grouped(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self::empty()
    }
}

/// Token minted on every source identity change.
///
/// A remote fetch captures the generation current at dispatch time; a
/// completion carrying a stale generation must not touch exposure state
/// belonging to the new identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceGeneration(pub(crate) u64);

/// Pagination flags supplied by the remote collaborator.
///
/// The grid does not own these when backed by a remote source; it only
/// owns the local-reveal half of the algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemoteState {
    /// Whether the remote source reports further pages.
    pub has_more: bool,
    /// Whether a page fetch is currently in flight upstream.
    pub loading: bool,
}
