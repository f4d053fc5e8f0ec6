//! Crate-wide constants.
//!
//! Centralizes the loading and display tunables to make the codebase
//! more maintainable and self-documenting. The loader constants are the
//! defaults for [`LoaderConfig`](crate::loader::LoaderConfig); call sites
//! that need different pacing override them there rather than here.

// ============================================================================
// Progressive Loading
// ============================================================================

/// Rows fetched before the table is considered ready for interaction
pub const INITIAL_ROW_CAP: usize = 500;

/// Rows per sub-chunk during the initial load; the loader yields to the
/// scheduler between sub-chunks so the renderer can paint
pub const SUB_CHUNK_ROWS: usize = 50;

/// Rows fetched per "load more" request triggered by scrolling
pub const LOAD_MORE_ROWS: usize = 200;

/// Distance (in rows) from the end of the loaded set at which scrolling
/// triggers the next "load more" request
pub const LOAD_MORE_MARGIN: usize = 10;

// ============================================================================
// Range Cache
// ============================================================================

/// Maximum byte ranges kept by a RangeReadBuffer before eviction
pub const MAX_CACHED_RANGES: usize = 50;

// ============================================================================
// Virtual Window
// ============================================================================

/// Row height in pixels for virtual scrolling calculations
pub const ROW_HEIGHT: f32 = 28.0;

/// Rows rendered above/below the visible area to avoid blank flashes
pub const OVERSCAN_ROWS: usize = 12;

// ============================================================================
// Type Inference (delimited text)
// ============================================================================

/// Data rows sampled per column when inferring delimited-text column types
pub const TYPE_INFER_SAMPLE_ROWS: usize = 10;

/// Lines inspected when auto-detecting the delimiter
pub const DELIMITER_SNIFF_LINES: usize = 5;

// ============================================================================
// Display
// ============================================================================

/// Characters after which cell text and nested-value summaries are truncated
pub const DISPLAY_TRUNCATE_LEN: usize = 120;

/// Decimal places kept when displaying non-integer floats
pub const DISPLAY_FLOAT_DECIMALS: usize = 4;

/// Placeholder token for values that cannot be structurally serialized
pub const OPAQUE_PLACEHOLDER: &str = "[unsupported]";
