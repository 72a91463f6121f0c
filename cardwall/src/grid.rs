//! The progressive virtualized grid: one parameterized component that
//! wires exposure, geometry, cell resolution, and the scroll-proximity
//! trigger together for any catalog view.
//!
//! ## Usage
//!
//! Construct a [`CardGrid`], hand it a [`CatalogSource`], and on every
//! layout pass ask [`CardGrid::window_props`] for what to give the
//! windowing primitive. Forward the primitive's visible-range
//! notifications into [`CardGrid::handle_visible_range`] and poll
//! [`CardGrid::tick`] from the event loop; a returned
//! [`GridRequest::FetchNextPage`] tells the host to dispatch a remote
//! page fetch and later report completion with the echoed generation.
//!
//! The grid is single-threaded in spirit: every method runs on the UI
//! event loop, and remote completions re-enter as later events.
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use derive_setters::Setters;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    cell::{CellRenderer, CellResolver},
    geometry::{GridLayoutInfo, RowPolicy, WindowGeometry, window_geometry},
    reveal::{Exposure, RequestOutcome, RevealConfig, RevealController},
    source::{CatalogSource, RemoteState, SourceGeneration},
    stable::{GridSnapshot, SnapshotCell},
    trigger::{
        DEFAULT_DEBOUNCE_WINDOW, DEFAULT_THRESHOLD_ROWS, ScrollProximityTrigger, VisibleRange,
    },
};

/// Configuration for a [`CardGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Setters)]
pub struct CardGridArgs {
    /// Reveal batch sizes.
    pub reveal: RevealConfig,
    /// Row-count policy for the rendered window.
    pub row_policy: RowPolicy,
    /// Distance from the window's end, in rows, that arms the trigger.
    pub threshold_rows: usize,
    /// Quiet interval before an armed trigger fires.
    pub debounce_window: Duration,
}

impl Default for CardGridArgs {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            row_policy: RowPolicy::default(),
            threshold_rows: DEFAULT_THRESHOLD_ROWS,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
        }
    }
}

/// What the windowing primitive should be driven with.
#[derive(Clone, PartialEq)]
pub enum GridContent {
    /// The container is not usably measured yet; render a deterministic
    /// initializing placeholder instead of invoking the primitive.
    Initializing,
    /// Valid geometry and a stable cell renderer.
    Ready(VirtualGridProps),
}

/// Props for the windowing primitive.
///
/// The renderer's identity is stable for the grid's lifetime, so the
/// primitive's internal memoization survives data mutations.
#[derive(Clone, PartialEq)]
pub struct VirtualGridProps {
    /// Window rectangle and cell extents.
    pub geometry: WindowGeometry,
    /// The once-built cell-rendering callback.
    pub cell_renderer: CellRenderer,
    /// Whether more content exists beyond the current exposure.
    pub has_next_page: bool,
}

/// An action the host must perform on the grid's behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridRequest {
    /// Dispatch a remote page fetch; report completion via
    /// [`CardGrid::extend_source`] or [`CardGrid::remote_load_failed`]
    /// with this generation.
    FetchNextPage {
        /// Token identifying the source identity the fetch belongs to.
        generation: SourceGeneration,
    },
}

/// Progressive virtualized grid state for one catalog view.
pub struct CardGrid {
    source: CatalogSource,
    remote: RemoteState,
    search_query: Option<String>,
    reveal: RevealController,
    trigger: ScrollProximityTrigger,
    row_policy: RowPolicy,
    snapshot: SnapshotCell,
    resolver: Arc<Mutex<CellResolver>>,
    renderer: CellRenderer,
    columns: usize,
    row_count: usize,
}

impl CardGrid {
    /// Creates an empty grid. The cell renderer is built here, once, and
    /// keeps its identity until the grid is dropped.
    pub fn new(args: CardGridArgs) -> Self {
        let snapshot = SnapshotCell::new(GridSnapshot::default());
        let resolver = Arc::new(Mutex::new(CellResolver::new()));
        let renderer = CellRenderer::new(snapshot.handle(), resolver.clone());
        Self {
            source: CatalogSource::empty(),
            remote: RemoteState::default(),
            search_query: None,
            reveal: RevealController::new(args.reveal),
            trigger: ScrollProximityTrigger::new(args.debounce_window, args.threshold_rows),
            row_policy: args.row_policy,
            snapshot,
            resolver,
            renderer,
            columns: 0,
            row_count: 0,
        }
    }

    /// Replaces the source sequence.
    ///
    /// A new identity (new search, new filter, new view mode) resets the
    /// reveal window, clears the group-stats cache, and discards any
    /// pending trigger; the renderer's identity is unaffected. Identity
    /// is the backing allocation, so a content-equal re-fetch also
    /// resets.
    pub fn set_source(&mut self, source: CatalogSource, remote: RemoteState) {
        if !self.source.same_identity(&source) {
            let generation = self.reveal.reset_on_source_change();
            self.resolver.lock().clear_stats();
            self.trigger.cancel();
            debug!(?generation, len = source.len(), "source identity changed");
        }
        self.source = source;
        self.remote = remote;
        self.sync_snapshot();
    }

    /// Applies a resolved page fetch: the extended sequence is the same
    /// logical identity, so the reveal window is preserved.
    ///
    /// Returns `false` for completions whose generation predates a source
    /// change; those must not mutate the new identity's state.
    pub fn extend_source(
        &mut self,
        source: CatalogSource,
        remote: RemoteState,
        generation: SourceGeneration,
    ) -> bool {
        if !self.reveal.finish_remote_load(generation) {
            return false;
        }
        self.source = source;
        self.remote = remote;
        self.sync_snapshot();
        true
    }

    /// Reports a failed page fetch. Clears the in-flight flag so the
    /// trigger can fire again on the next scroll-proximity event; an
    /// in-flight flag left set forever would be a liveness bug.
    pub fn remote_load_failed(&mut self, generation: SourceGeneration) {
        self.reveal.finish_remote_load(generation);
    }

    /// Updates the externally-owned pagination flags.
    pub fn set_remote(&mut self, remote: RemoteState) {
        self.remote = remote;
    }

    /// Sets the active search query used for card highlighting.
    pub fn set_search_query(&mut self, query: Option<String>) {
        self.search_query = query;
        self.sync_snapshot();
    }

    /// Computes what to drive the windowing primitive with for the
    /// current layout measurement.
    ///
    /// Degenerate layout reports an [`GridContent::Initializing`]
    /// placeholder rather than corrupting the row formula.
    pub fn window_props(&mut self, layout: &GridLayoutInfo) -> GridContent {
        let exposure = self.exposure();
        match window_geometry(layout, exposure.exposed_count, self.row_policy) {
            Ok(geometry) => {
                self.columns = geometry.column_count;
                self.row_count = geometry.row_count;
                self.sync_snapshot();
                GridContent::Ready(VirtualGridProps {
                    geometry,
                    cell_renderer: self.renderer.clone(),
                    has_next_page: exposure.has_next_page,
                })
            }
            Err(error) => {
                debug!(%error, "layout not ready, rendering initializing state");
                GridContent::Initializing
            }
        }
    }

    /// Forwards a visible-range notification from the windowing
    /// primitive into the proximity trigger.
    pub fn handle_visible_range(&mut self, range: VisibleRange, now: Instant) {
        let exposure = self.exposure();
        self.trigger.notify_visible_range(
            range,
            self.row_count,
            exposure.has_next_page,
            self.loading(),
            now,
        );
    }

    /// Advances the debounce machine.
    ///
    /// A fired trigger prefers a free local reveal; only a drained local
    /// buffer produces a [`GridRequest::FetchNextPage`] for the host.
    pub fn tick(&mut self, now: Instant) -> Option<GridRequest> {
        let exposure = self.exposure();
        if !self
            .trigger
            .poll(now, exposure.has_next_page, self.loading())
        {
            return None;
        }

        let mut request = None;
        let outcome = self
            .reveal
            .request_more(self.source.len(), self.remote, |generation| {
                request = Some(GridRequest::FetchNextPage { generation });
            });
        if matches!(outcome, RequestOutcome::RevealedLocally { .. }) {
            self.sync_snapshot();
        }
        request
    }

    /// The current exposure, recomputed from live state.
    pub fn exposure(&self) -> Exposure {
        self.reveal
            .compute_exposure(self.source.len(), self.remote.has_more)
    }

    /// The token identifying the current source identity.
    pub fn generation(&self) -> SourceGeneration {
        self.reveal.generation()
    }

    /// Whether any load, local-controller-owned or external, is pending.
    pub fn loading(&self) -> bool {
        self.reveal.remote_load_in_flight() || self.remote.loading
    }

    fn sync_snapshot(&self) {
        // Single writer: every mutation funnels through here, in place,
        // with no identity change visible to the renderer.
        self.snapshot.store(GridSnapshot {
            source: self.source.clone(),
            exposed_count: self.exposure().exposed_count,
            column_count: self.columns,
            search_query: self.search_query.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellContent;
    use crate::source::CatalogItem;

    fn items(count: usize) -> Arc<Vec<CatalogItem>> {
        Arc::new(
            (0..count)
                .map(|i| CatalogItem {
                    id: format!("i{i}"),
                    title: format!("Title {i}"),
                    poster: None,
                    year: Some(2020),
                    rating: None,
                    source_name: "alpha".to_string(),
                })
                .collect(),
        )
    }

    fn layout(columns: usize) -> GridLayoutInfo {
        GridLayoutInfo {
            column_count: columns,
            item_width: 120.0,
            item_height: 180.0,
            container_width: 960.0,
        }
    }

    fn grid() -> CardGrid {
        CardGrid::new(
            CardGridArgs::default()
                .row_policy(RowPolicy::Exact)
                .debounce_window(Duration::from_millis(100)),
        )
    }

    fn ready(content: GridContent) -> VirtualGridProps {
        match content {
            GridContent::Ready(props) => props,
            GridContent::Initializing => panic!("expected ready grid content"),
        }
    }

    #[test]
    fn test_unmeasured_layout_is_initializing() {
        let mut g = grid();
        g.set_source(CatalogSource::Flat(items(40)), RemoteState::default());

        let mut unmeasured = layout(4);
        unmeasured.container_width = 0.0;
        assert!(matches!(
            g.window_props(&unmeasured),
            GridContent::Initializing
        ));
        assert!(matches!(g.window_props(&layout(4)), GridContent::Ready(_)));
    }

    #[test]
    fn test_scroll_session_reveals_locally_then_fetches() {
        let mut g = grid();
        g.set_source(
            CatalogSource::Flat(items(40)),
            RemoteState {
                has_more: true,
                loading: false,
            },
        );
        let now = Instant::now();

        let props = ready(g.window_props(&layout(4)));
        assert_eq!(props.geometry.row_count, 4);
        assert_eq!(g.exposure().exposed_count, 16);
        assert!(props.has_next_page);

        // Scroll near the end; the debounced reveal is local and free.
        g.handle_visible_range(
            VisibleRange {
                first_row: 1,
                last_row: 3,
            },
            now,
        );
        assert_eq!(g.tick(now + Duration::from_millis(100)), None);
        assert_eq!(g.exposure().exposed_count, 32);
        assert_eq!(ready(g.window_props(&layout(4))).geometry.row_count, 8);

        // Second reveal caps at the source length.
        g.handle_visible_range(
            VisibleRange {
                first_row: 5,
                last_row: 7,
            },
            now + Duration::from_millis(200),
        );
        assert_eq!(g.tick(now + Duration::from_millis(300)), None);
        assert_eq!(g.exposure().exposed_count, 40);

        // Local buffer drained: the next trigger goes remote.
        ready(g.window_props(&layout(4)));
        g.handle_visible_range(
            VisibleRange {
                first_row: 8,
                last_row: 9,
            },
            now + Duration::from_millis(400),
        );
        let request = g.tick(now + Duration::from_millis(500));
        let Some(GridRequest::FetchNextPage { generation }) = request else {
            panic!("expected a fetch request");
        };
        assert!(g.loading());

        // Page resolves: same identity, reveal window preserved.
        assert!(g.extend_source(
            CatalogSource::Flat(items(80)),
            RemoteState {
                has_more: false,
                loading: false,
            },
            generation,
        ));
        assert!(!g.loading());
        assert_eq!(g.exposure().exposed_count, 40);
        assert!(g.exposure().has_next_page);
    }

    #[test]
    fn test_trigger_ignored_while_loading() {
        let mut g = grid();
        g.set_source(
            CatalogSource::Flat(items(16)),
            RemoteState {
                has_more: true,
                loading: false,
            },
        );
        let now = Instant::now();
        ready(g.window_props(&layout(4)));

        g.handle_visible_range(
            VisibleRange {
                first_row: 2,
                last_row: 3,
            },
            now,
        );
        let first = g.tick(now + Duration::from_millis(100));
        assert!(matches!(first, Some(GridRequest::FetchNextPage { .. })));

        // In flight: nothing schedules, nothing fires.
        g.handle_visible_range(
            VisibleRange {
                first_row: 2,
                last_row: 3,
            },
            now + Duration::from_millis(200),
        );
        assert_eq!(g.tick(now + Duration::from_millis(400)), None);
    }

    #[test]
    fn test_source_change_resets_reveal_and_keeps_renderer() {
        let mut g = grid();
        g.set_source(CatalogSource::Flat(items(40)), RemoteState::default());
        let now = Instant::now();
        let before = ready(g.window_props(&layout(4)));

        g.handle_visible_range(
            VisibleRange {
                first_row: 1,
                last_row: 3,
            },
            now,
        );
        g.tick(now + Duration::from_millis(100));
        assert_eq!(g.exposure().exposed_count, 32);

        // New identity: reveal snaps back, renderer identity survives.
        g.set_source(CatalogSource::Flat(items(40)), RemoteState::default());
        assert_eq!(g.exposure().exposed_count, 16);
        let after = ready(g.window_props(&layout(4)));
        assert!(before.cell_renderer == after.cell_renderer);
    }

    #[test]
    fn test_stale_fetch_cannot_mutate_new_identity() {
        let mut g = grid();
        g.set_source(
            CatalogSource::Flat(items(16)),
            RemoteState {
                has_more: true,
                loading: false,
            },
        );
        let now = Instant::now();
        ready(g.window_props(&layout(4)));

        g.handle_visible_range(
            VisibleRange {
                first_row: 2,
                last_row: 3,
            },
            now,
        );
        let Some(GridRequest::FetchNextPage { generation: stale }) =
            g.tick(now + Duration::from_millis(100))
        else {
            panic!("expected a fetch request");
        };

        // Identity changes while the fetch is in flight.
        g.set_source(CatalogSource::Flat(items(8)), RemoteState::default());
        assert!(!g.loading());

        // The stale resolution must not land.
        assert!(!g.extend_source(
            CatalogSource::Flat(items(48)),
            RemoteState {
                has_more: true,
                loading: false,
            },
            stale,
        ));
        assert_eq!(g.exposure().exposed_count, 8);
        assert!(!g.exposure().has_next_page);
    }

    #[test]
    fn test_failed_fetch_restores_liveness() {
        let mut g = grid();
        g.set_source(
            CatalogSource::Flat(items(16)),
            RemoteState {
                has_more: true,
                loading: false,
            },
        );
        let now = Instant::now();
        ready(g.window_props(&layout(4)));

        g.handle_visible_range(
            VisibleRange {
                first_row: 2,
                last_row: 3,
            },
            now,
        );
        let Some(GridRequest::FetchNextPage { generation }) =
            g.tick(now + Duration::from_millis(100))
        else {
            panic!("expected a fetch request");
        };
        g.remote_load_failed(generation);
        assert!(!g.loading());

        // Next proximity event can trigger again.
        g.handle_visible_range(
            VisibleRange {
                first_row: 2,
                last_row: 3,
            },
            now + Duration::from_millis(200),
        );
        assert!(matches!(
            g.tick(now + Duration::from_millis(300)),
            Some(GridRequest::FetchNextPage { .. })
        ));
    }

    #[test]
    fn test_renderer_reads_through_to_latest_exposure() {
        let mut g = grid();
        g.set_source(CatalogSource::Flat(items(40)), RemoteState::default());
        let now = Instant::now();
        let props = ready(g.window_props(&layout(4)));

        // Row 4 is beyond the initial 16-item exposure.
        assert!(matches!(
            props.cell_renderer.render(4, 0),
            CellContent::Placeholder
        ));

        g.handle_visible_range(
            VisibleRange {
                first_row: 1,
                last_row: 3,
            },
            now,
        );
        g.tick(now + Duration::from_millis(100));

        // Same renderer, fresh data.
        let CellContent::Single(card) = props.cell_renderer.render(4, 0) else {
            panic!("expected a card after the reveal");
        };
        assert_eq!(card.id, "i16");
    }
}
