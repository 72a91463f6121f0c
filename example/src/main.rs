//! Simulated scroll session: an in-memory paginated catalog, a stub
//! windowing primitive, and a grid progressively revealing and fetching
//! as the viewport moves toward the end.
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use cardwall::{
    CardGrid, CardGridArgs, CatalogItem, CatalogSource, CellContent, GridContent, GridLayoutInfo,
    GridRequest, RemoteState, SourceGeneration, VirtualGridProps, VisibleRange,
};
use tracing::info;

const PAGE_SIZE: usize = 24;
const TOTAL_ITEMS: usize = 96;
const VIEWPORT_ROWS: usize = 4;
const FETCH_LATENCY_STEPS: usize = 3;
const STEP: Duration = Duration::from_millis(60);

/// In-memory stand-in for the remote paginated source.
struct PagedCatalog {
    loaded: Vec<CatalogItem>,
}

impl PagedCatalog {
    fn new() -> Self {
        let mut catalog = Self { loaded: Vec::new() };
        catalog.load_next_page();
        catalog
    }

    fn load_next_page(&mut self) {
        let start = self.loaded.len();
        let end = (start + PAGE_SIZE).min(TOTAL_ITEMS);
        self.loaded.extend((start..end).map(|i| CatalogItem {
            id: format!("item-{i}"),
            title: format!("Catalog Entry {i}"),
            poster: Some(format!("posters/{i}.jpg")),
            year: Some(2000 + (i % 25) as u16),
            rating: Some(5.0 + (i % 50) as f32 / 10.0),
            source_name: if i % 3 == 0 { "alpha" } else { "beta" }.to_string(),
        }));
    }

    fn source(&self) -> CatalogSource {
        CatalogSource::Flat(Arc::new(self.loaded.clone()))
    }

    fn remote(&self) -> RemoteState {
        RemoteState {
            has_more: self.loaded.len() < TOTAL_ITEMS,
            loading: false,
        }
    }
}

/// Stub windowing primitive: renders the rows under the viewport and
/// reports the visible range back.
fn render_window(props: &VirtualGridProps, first_row: usize) -> (VisibleRange, usize) {
    let last_row = (first_row + VIEWPORT_ROWS - 1).min(props.geometry.row_count - 1);
    let mut cards = 0;
    for row in first_row..=last_row {
        for column in 0..props.geometry.column_count {
            if !matches!(
                props.cell_renderer.render(row, column),
                CellContent::Placeholder
            ) {
                cards += 1;
            }
        }
    }
    (
        VisibleRange {
            first_row,
            last_row,
        },
        cards,
    )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cardwall=debug".into()),
        )
        .init();

    let layout = GridLayoutInfo {
        column_count: 4,
        item_width: 120.0,
        item_height: 180.0,
        container_width: 960.0,
    };

    let mut catalog = PagedCatalog::new();
    let mut grid = CardGrid::new(CardGridArgs::default());
    grid.set_source(catalog.source(), catalog.remote());

    let mut first_row = 0usize;
    let mut pending_fetch: Option<(SourceGeneration, usize)> = None;
    let mut now = Instant::now();

    for step in 0..80 {
        now += STEP;

        // Resolve an outstanding fetch after a simulated latency.
        if let Some((generation, due)) = pending_fetch
            && step >= due
        {
            catalog.load_next_page();
            let accepted = grid.extend_source(catalog.source(), catalog.remote(), generation);
            info!(
                step,
                loaded = catalog.loaded.len(),
                accepted,
                "page fetch resolved"
            );
            pending_fetch = None;
        }

        let GridContent::Ready(props) = grid.window_props(&layout) else {
            info!(step, "grid initializing");
            continue;
        };

        // Scroll one row per step until the rendered window ends.
        if first_row + VIEWPORT_ROWS < props.geometry.row_count {
            first_row += 1;
        }
        let (range, cards) = render_window(&props, first_row);
        grid.handle_visible_range(range, now);

        if let Some(GridRequest::FetchNextPage { generation }) = grid.tick(now + STEP * 3) {
            info!(step, ?generation, "dispatching page fetch");
            pending_fetch = Some((generation, step + FETCH_LATENCY_STEPS));
        }

        if step % 10 == 0 {
            let exposure = grid.exposure();
            info!(
                step,
                rows = props.geometry.row_count,
                exposed = exposure.exposed_count,
                visible_cards = cards,
                has_next = exposure.has_next_page,
                "viewport"
            );
        }
    }

    let exposure = grid.exposure();
    info!(
        exposed = exposure.exposed_count,
        loaded = catalog.loaded.len(),
        has_next = exposure.has_next_page,
        "session finished"
    );
}
