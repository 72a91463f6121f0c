//! Render-stability adapter: a long-lived mutable cell that decouples
//! frequently-changing grid data from the identity of what the windowing
//! primitive memoizes.
//!
//! ## Usage
//!
//! The grid writes a fresh [`GridSnapshot`] into its [`SnapshotCell`] on
//! every data change; the once-built cell renderer reads through a
//! [`SnapshotHandle`] whose identity never changes for the grid's
//! lifetime. The write emits no change signal of its own, so the only
//! legitimate trigger for a new render pass remains the primitive's own
//! scroll/resize detection.
//!
//! Discipline: the cell has exactly one writer (the grid's data-change
//! handler) and one reader (the cell renderer). Updates happen
//! synchronously within one pass of the event loop, so a reader never
//! observes a torn snapshot.
use std::sync::Arc;

use parking_lot::RwLock;

use crate::source::CatalogSource;

/// Everything a cell render needs, captured at the last data change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridSnapshot {
    /// The current source sequence.
    pub source: CatalogSource,
    /// Entries the rendering window may draw from.
    pub exposed_count: usize,
    /// Current column count, for (row, column) to index mapping.
    pub column_count: usize,
    /// Active search query, for card highlighting.
    pub search_query: Option<String>,
}

/// Owner side of the mutable cell. Held by the grid.
pub struct SnapshotCell {
    inner: Arc<RwLock<GridSnapshot>>,
}

impl SnapshotCell {
    /// Creates a cell holding `initial`.
    pub fn new(initial: GridSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Replaces the cell contents in place. Identity is unaffected.
    pub fn store(&self, snapshot: GridSnapshot) {
        *self.inner.write() = snapshot;
    }

    /// Returns the permanently-stable read handle.
    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle {
            inner: self.inner.clone(),
        }
    }
}

/// Reader side of the mutable cell.
///
/// Clones share identity; equality is pointer equality, so a memoizing
/// consumer sees the handle as unchanged across data ticks.
#[derive(Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<GridSnapshot>>,
}

impl SnapshotHandle {
    /// Reads the current snapshot contents.
    pub fn with<R>(&self, f: impl FnOnce(&GridSnapshot) -> R) -> R {
        f(&self.inner.read())
    }
}

impl PartialEq for SnapshotHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
