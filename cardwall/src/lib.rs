//! Progressive virtualized grid logic for large, possibly still-arriving
//! catalog collections.
//!
//! The crate decides which window of a logical item sequence is realized
//! as renderable cells, drains a locally buffered batch before asking a
//! remote paginated source for more, debounces near-end scroll events
//! into load-more requests, and keeps the cell renderer's identity stable
//! across data mutations so a memoizing windowing primitive never
//! re-renders the whole window on a data tick.
//!
//! The windowing primitive itself, the responsive layout provider, and
//! the card presentation component are external collaborators: the grid
//! consumes a [`GridLayoutInfo`] measurement, emits
//! [`VirtualGridProps`] for the primitive, and resolves each visible
//! coordinate to a [`CellContent`] for the presentation layer.
//!
//! # Example
//!
//! ```
//! use std::{sync::Arc, time::Instant};
//!
//! use cardwall::{
//!     CardGrid, CardGridArgs, CatalogItem, CatalogSource, GridContent, GridLayoutInfo,
//!     RemoteState, VisibleRange,
//! };
//!
//! let mut grid = CardGrid::new(CardGridArgs::default());
//! let page: Vec<CatalogItem> = (0..40)
//!     .map(|i| CatalogItem {
//!         id: format!("item-{i}"),
//!         title: format!("Title {i}"),
//!         poster: None,
//!         year: Some(2024),
//!         rating: None,
//!         source_name: "demo".to_string(),
//!     })
//!     .collect();
//! grid.set_source(
//!     CatalogSource::Flat(Arc::new(page)),
//!     RemoteState { has_more: true, loading: false },
//! );
//!
//! let layout = GridLayoutInfo {
//!     column_count: 4,
//!     item_width: 120.0,
//!     item_height: 180.0,
//!     container_width: 960.0,
//! };
//! let GridContent::Ready(props) = grid.window_props(&layout) else {
//!     panic!("layout is measured");
//! };
//! assert!(props.has_next_page);
//!
//! // Wire the primitive's notifications back in, then poll from the
//! // event loop.
//! grid.handle_visible_range(VisibleRange { first_row: 0, last_row: 5 }, Instant::now());
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod cell;
pub mod geometry;
pub mod grid;
pub mod reveal;
pub mod source;
pub mod stable;
pub mod stats;
pub mod trigger;

pub use cell::{CardKind, CardRequest, CellContent, CellRenderer, CellResolver, GroupCardRequest};
pub use geometry::{GeometryError, GridLayoutInfo, RowPolicy, WindowGeometry, window_geometry};
pub use grid::{CardGrid, CardGridArgs, GridContent, GridRequest, VirtualGridProps};
pub use reveal::{Exposure, RequestOutcome, RevealConfig, RevealController};
pub use source::{CatalogItem, CatalogSource, ItemGroup, RemoteState, SourceGeneration};
pub use stable::{GridSnapshot, SnapshotCell, SnapshotHandle};
pub use stats::{GroupStats, GroupStatsCache};
pub use trigger::{ScrollProximityTrigger, VisibleRange};
