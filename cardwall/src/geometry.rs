//! Window geometry: turning an exposed-entry count and the measured layout
//! into the row/column rectangle handed to the windowing primitive.
//!
//! ## Usage
//!
//! Feed the latest [`GridLayoutInfo`] from the layout provider into
//! [`window_geometry`]. A degenerate layout (unmeasured container, zero
//! columns) comes back as an error the grid maps to an initializing
//! placeholder instead of driving the primitive with invalid geometry.
use thiserror::Error;

/// Containers narrower than this are treated as not yet measured.
pub const MIN_CONTAINER_WIDTH: f32 = 1.0;
/// Default stabilizing buffer, in items, for [`RowPolicy::Buffered`].
pub const DEFAULT_BUFFER_ITEMS: usize = 8;

/// Measurements reported by the responsive layout provider.
///
/// Re-evaluated whenever the observed container resizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayoutInfo {
    /// Number of grid columns.
    pub column_count: usize,
    /// Width of one cell.
    pub item_width: f32,
    /// Height of one cell.
    pub item_height: f32,
    /// Width of the observed container.
    pub container_width: f32,
}

impl GridLayoutInfo {
    /// Whether the provider has produced a usable measurement.
    pub fn is_ready(&self) -> bool {
        self.column_count >= 1
            && self.container_width >= MIN_CONTAINER_WIDTH
            && self.item_width > 0.0
            && self.item_height > 0.0
    }
}

/// How the row count follows the exposed-entry count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowPolicy {
    /// Exactly the rows the exposed entries need.
    Exact,
    /// Extra placeholder rows appended to damp row-count churn while the
    /// reveal window grows in small steps.
    Buffered {
        /// Buffer size in items; converted to whole rows.
        buffer_items: usize,
    },
}

impl RowPolicy {
    /// The preferred default: buffered with [`DEFAULT_BUFFER_ITEMS`].
    pub fn buffered() -> Self {
        Self::Buffered {
            buffer_items: DEFAULT_BUFFER_ITEMS,
        }
    }
}

impl Default for RowPolicy {
    fn default() -> Self {
        Self::buffered()
    }
}

/// The rectangle handed to the windowing primitive. Derived, never
/// authoritative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowGeometry {
    /// Number of columns.
    pub column_count: usize,
    /// Number of rows, including any buffer rows.
    pub row_count: usize,
    /// Width of one cell.
    pub cell_width: f32,
    /// Height of one cell.
    pub cell_height: f32,
}

/// Why a geometry could not be computed.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// The container has not produced a usable measurement yet.
    #[error("container not measured: width {container_width}")]
    NotMeasured {
        /// The reported container width.
        container_width: f32,
    },
    /// The provider reported a column count the row formula cannot use.
    #[error("degenerate column count {column_count}")]
    DegenerateColumns {
        /// The reported column count.
        column_count: usize,
    },
}

/// Computes the window rectangle for the current exposure.
///
/// `row_count = max(1, ceil(exposed / columns))`, plus
/// `ceil(buffer / columns)` whole buffer rows under
/// [`RowPolicy::Buffered`]. Buffer rows render only placeholders; they
/// exist to keep the primitive's layout stable between successive small
/// reveal increments.
pub fn window_geometry(
    layout: &GridLayoutInfo,
    exposed_count: usize,
    policy: RowPolicy,
) -> Result<WindowGeometry, GeometryError> {
    if layout.column_count == 0 {
        return Err(GeometryError::DegenerateColumns {
            column_count: layout.column_count,
        });
    }
    if !layout.is_ready() {
        return Err(GeometryError::NotMeasured {
            container_width: layout.container_width,
        });
    }

    let columns = layout.column_count;
    let mut row_count = exposed_count.div_ceil(columns).max(1);
    if let RowPolicy::Buffered { buffer_items } = policy {
        row_count += buffer_items.div_ceil(columns);
    }

    Ok(WindowGeometry {
        column_count: columns,
        row_count,
        cell_width: layout.item_width,
        cell_height: layout.item_height,
    })
}
