//! Virtualized row window.
//!
//! Maps a scroll position and viewport height to the bounded range of rows
//! that must actually be materialized, with an overscan margin so fast
//! scrolling doesn't flash blank rows. The window is pure arithmetic over
//! the current inputs — recomputing on every scroll event, row-count
//! change or sort/filter change is just calling [`RowWindow::visible_range`]
//! again; there is no retained state to invalidate.

use crate::constants::{LOAD_MORE_MARGIN, OVERSCAN_ROWS, ROW_HEIGHT};
use std::ops::Range;

/// Scroll state and window arithmetic for a virtualized table.
#[derive(Clone, Debug)]
pub struct RowWindow {
    /// Current scroll offset (Y) in pixels
    pub scroll_y: f32,
    /// Visible height of the table viewport
    pub viewport_height: f32,
    row_height: f32,
    overscan: usize,
    load_more_margin: usize,
}

impl RowWindow {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            scroll_y: 0.0,
            viewport_height,
            row_height: ROW_HEIGHT,
            overscan: OVERSCAN_ROWS,
            load_more_margin: LOAD_MORE_MARGIN,
        }
    }

    /// Override the overscan row count (extra rows above/below).
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Override the load-more trigger margin.
    pub fn with_load_more_margin(mut self, margin: usize) -> Self {
        self.load_more_margin = margin;
        self
    }

    /// Update viewport height (e.g. when the panel is resized).
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
    }

    /// Update scroll position, clamping to the valid range.
    pub fn scroll_to(&mut self, y: f32, visible_count: usize) {
        let max_scroll =
            (visible_count as f32 * self.row_height - self.viewport_height).max(0.0);
        self.scroll_y = y.clamp(0.0, max_scroll);
    }

    /// Scroll by a delta amount.
    pub fn scroll_by(&mut self, delta_y: f32, visible_count: usize) {
        self.scroll_to(self.scroll_y + delta_y, visible_count);
    }

    /// The index range of rows to materialize, including overscan.
    ///
    /// `visible_count` is the size of the current filtered+sorted row set.
    pub fn visible_range(&self, visible_count: usize) -> Range<usize> {
        let first_visible = (self.scroll_y / self.row_height).floor() as usize;
        let rows_in_view = (self.viewport_height / self.row_height).ceil() as usize + 1;

        let start = first_visible.saturating_sub(self.overscan);
        let end = (first_visible + rows_in_view + self.overscan).min(visible_count);

        start.min(end)..end
    }

    /// True when the materialized window is close enough to the end of the
    /// loaded set that the next chunk should be requested.
    ///
    /// The comparison is against the loaded (not total) row count: with a
    /// filter active the renderable set is smaller than the buffer, and the
    /// trigger fires when the window nears the end of what can currently be
    /// shown while more rows remain unloaded.
    pub fn should_load_more(
        &self,
        visible_count: usize,
        loaded_rows: usize,
        total_rows: usize,
    ) -> bool {
        if loaded_rows >= total_rows {
            return false;
        }
        let end = self.visible_range(visible_count).end;
        end + self.load_more_margin >= visible_count
    }

    /// Y offset of the first materialized row (for positioning).
    pub fn first_row_offset(&self, visible_count: usize) -> f32 {
        self.visible_range(visible_count).start as f32 * self.row_height
    }

    /// Total content height for the scrollbar.
    pub fn total_content_height(&self, visible_count: usize) -> f32 {
        visible_count as f32 * self.row_height
    }

    /// Scrollbar thumb position (0.0 to 1.0).
    pub fn scrollbar_position(&self, visible_count: usize) -> f32 {
        let total = self.total_content_height(visible_count);
        if total <= self.viewport_height {
            return 0.0;
        }
        self.scroll_y / (total - self.viewport_height)
    }

    /// Scrollbar thumb size as a fraction of the track (0.0 to 1.0).
    pub fn scrollbar_thumb_size(&self, visible_count: usize) -> f32 {
        let total = self.total_content_height(visible_count);
        if total <= 0.0 {
            return 1.0;
        }
        (self.viewport_height / total).min(1.0)
    }
}

/// Format row count for display (e.g. "1.2M rows")
pub fn format_row_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M rows", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K rows", count as f64 / 1_000.0)
    } else {
        format!("{} rows", count)
    }
}

/// Format the current position for the progress readout
/// (e.g. "Rows 1-50 of 1.2K").
pub fn format_position(start: usize, end: usize, total: usize) -> String {
    let display_start = start + 1; // 1-indexed for users
    let display_end = end.min(total);

    if total >= 1_000_000 {
        format!(
            "{}-{} of {:.1}M",
            display_start,
            display_end,
            total as f64 / 1_000_000.0
        )
    } else if total >= 1_000 {
        format!(
            "{}-{} of {:.1}K",
            display_start,
            display_end,
            total as f64 / 1_000.0
        )
    } else {
        format!("{}-{} of {}", display_start, display_end, total)
    }
}
