//! FILENAME: core/report-engine/src/view.rs
//! Report View - windowed access to a (possibly huge) ordered row list.
//!
//! This module contains:
//! - `compute_window`: pure O(1) arithmetic from scroll/viewport inputs to the
//!   visible + overscan row range
//! - `Viewport`: the read model a scrolling surface keeps between events
//! - `VirtualRows`: a borrowed slice over just the materialized rows
//! - `paginate`: the non-virtualized fallback for small lists

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Row height substituted for a zero, negative or non-finite one, in pixels.
const FALLBACK_ROW_HEIGHT: f64 = 1.0;

// ============================================================================
// WINDOW
// ============================================================================

/// The row range to render for one scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportWindow {
    pub first_index: usize,
    pub last_index: usize,
    pub overscan_first: usize,
    pub overscan_last: usize,

    /// Rows that fit in the viewport (`ceil(height / row_height)`).
    pub visible_count: usize,

    /// Logical row count the window was computed for.
    pub row_count: usize,

    /// Full scrollable height (`row_count * row_height`). The scrollbar is
    /// sized from this, never from the materialized subset.
    pub total_height: f64,

    /// Pixel offset of the first materialized row.
    pub offset_top: f64,
}

impl ViewportWindow {
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Half-open range of rows to materialize (visible + overscan).
    pub fn materialized_range(&self) -> Range<usize> {
        if self.is_empty() {
            0..0
        } else {
            self.overscan_first..self.overscan_last + 1
        }
    }

    pub fn materialized_count(&self) -> usize {
        self.materialized_range().len()
    }
}

/// Computes the visible and overscan range for a scroll position.
///
/// `first_index` is clamped to `[0, row_count - visible_count]` so the last
/// page of rows stays fully populated when scrolled past the end.
pub fn compute_window(
    scroll_top: f64,
    viewport_height: f64,
    row_height: f64,
    row_count: usize,
    overscan: usize,
) -> ViewportWindow {
    let row_height = if row_height.is_finite() && row_height > 0.0 {
        row_height
    } else {
        FALLBACK_ROW_HEIGHT
    };
    let total_height = row_count as f64 * row_height;

    if row_count == 0 {
        return ViewportWindow { total_height, ..Default::default() };
    }

    let visible_count = if viewport_height > 0.0 {
        (viewport_height / row_height).ceil() as usize
    } else {
        0
    };

    let max_first = row_count.saturating_sub(visible_count);
    // `as` saturates: negative or NaN scroll positions land on 0
    let first_index = ((scroll_top / row_height).floor() as usize).min(max_first);
    let last_index = first_index
        .saturating_add(visible_count.saturating_sub(1))
        .min(row_count - 1);

    // An unbounded viewport saturates `visible_count` at usize::MAX
    let overscan_first = first_index.saturating_sub(overscan);
    let overscan_last = first_index
        .saturating_add(visible_count)
        .saturating_add(overscan)
        .min(row_count - 1);

    ViewportWindow {
        first_index,
        last_index,
        overscan_first,
        overscan_last,
        visible_count,
        row_count,
        total_height,
        offset_top: overscan_first as f64 * row_height,
    }
}

// ============================================================================
// VIEWPORT READ MODEL
// ============================================================================

/// Scroll/resize state of one scrolling surface. Every mutator recomputes the
/// window in constant time; nothing here touches the rows themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    viewport_height: f64,
    row_height: f64,
    overscan: usize,
    scroll_top: f64,
    row_count: usize,
    window: ViewportWindow,
}

impl Viewport {
    pub fn new(viewport_height: f64, row_height: f64, overscan: usize) -> Self {
        let mut viewport = Viewport {
            viewport_height,
            row_height,
            overscan,
            scroll_top: 0.0,
            row_count: 0,
            window: ViewportWindow::default(),
        };
        viewport.recompute();
        viewport
    }

    fn recompute(&mut self) {
        self.window = compute_window(
            self.scroll_top,
            self.viewport_height,
            self.row_height,
            self.row_count,
            self.overscan,
        );
    }

    pub fn on_scroll(&mut self, scroll_top: f64) -> ViewportWindow {
        self.scroll_top = scroll_top;
        self.recompute();
        self.window
    }

    pub fn on_resize(&mut self, viewport_height: f64) -> ViewportWindow {
        self.viewport_height = viewport_height;
        self.recompute();
        self.window
    }

    pub fn set_row_height(&mut self, row_height: f64) -> ViewportWindow {
        self.row_height = row_height;
        self.recompute();
        self.window
    }

    pub fn set_overscan(&mut self, overscan: usize) -> ViewportWindow {
        self.overscan = overscan;
        self.recompute();
        self.window
    }

    /// Called when a new result replaces the row list.
    pub fn set_row_count(&mut self, row_count: usize) -> ViewportWindow {
        self.row_count = row_count;
        self.recompute();
        self.window
    }

    pub fn window(&self) -> ViewportWindow {
        self.window
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// The materialized rows of `rows` for the current window.
    pub fn rows<'a, T>(&self, rows: &'a [T]) -> VirtualRows<'a, T> {
        VirtualRows::new(rows, &self.window)
    }
}

/// Borrowed view over the materialized rows of a window.
#[derive(Debug, Clone, Copy)]
pub struct VirtualRows<'a, T> {
    rows: &'a [T],
    start: usize,
}

impl<'a, T> VirtualRows<'a, T> {
    /// The window is clamped to `rows`, so a window computed for a longer list
    /// never indexes out of bounds.
    pub fn new(all_rows: &'a [T], window: &ViewportWindow) -> Self {
        let range = window.materialized_range();
        let start = range.start.min(all_rows.len());
        let end = range.end.min(all_rows.len());
        VirtualRows {
            rows: &all_rows[start..end],
            start,
        }
    }

    /// (absolute row index, row) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a T)> + '_ {
        let start = self.start;
        self.rows.iter().enumerate().map(move |(i, row)| (start + i, row))
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.rows
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// PAGINATION
// ============================================================================

/// One page of rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    /// Requested index clamped into `[0, total_pages - 1]`.
    pub page_index: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

/// Slices `rows` into pages of `page_size` (at least 1) and returns the page
/// at `page_index`, clamped to the last page.
pub fn paginate<T>(rows: &[T], page_size: usize, page_index: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = rows.len().div_ceil(page_size);
    let page_index = page_index.min(total_pages.saturating_sub(1));
    let start = (page_index * page_size).min(rows.len());
    let end = (start + page_size).min(rows.len());

    Page {
        rows: &rows[start..end],
        page_index,
        page_size,
        total_pages,
        total_rows: rows.len(),
    }
}

/// How a result list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Virtualized,
    Paged,
}

/// Lists longer than `threshold` are virtualized, unless virtualization is off.
pub fn display_mode(row_count: usize, threshold: usize, virtualization_enabled: bool) -> DisplayMode {
    if virtualization_enabled && row_count > threshold {
        DisplayMode::Virtualized
    } else {
        DisplayMode::Paged
    }
}
