//! Format providers and the paging contract they share.
//!
//! Every tabular backend (Parquet, delimited text, workbooks, ORC) hides
//! behind [`DataProvider`]: metadata once, then rows by `(offset, limit)`.
//! The loader and view model never see a format-specific type.
//!
//! ## Contract
//!
//! - `load_metadata` is idempotent: after the first success, repeated calls
//!   return the cached snapshot without re-parsing. A failure leaves the
//!   provider exactly as fresh as a new instance.
//! - `load_data` clamps its request to the table bounds and returns an
//!   empty vec, never an error, for a request past the end. It is safe to
//!   call before `load_metadata`; providers ensure metadata internally.
//! - `switch_sheet` exists only for workbook formats; everyone else
//!   reports `UnsupportedOperation`.

mod columnar;
mod delimited;
mod factory;
mod orc;
mod parquet;
mod workbook;

pub use delimited::*;
pub use factory::*;
pub use orc::*;
pub use parquet::*;
pub use workbook::*;

use crate::error::{DataError, DataResult};
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// One loaded row: column name → value, in column order.
pub type Row = IndexMap<String, Value>;

/// Column description within a metadata snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct ColumnMeta {
    /// Column name, unique within the snapshot
    pub name: String,
    /// Engine-native type tag (e.g. "Int64", "Utf8", "number", "boolean")
    pub type_tag: String,
    /// Engine logical type, where the format records one
    pub logical: Option<String>,
}

/// Immutable description of one (file, sheet) combination.
///
/// Replaced wholesale on sheet switch; never mutated in place.
#[derive(Clone, Debug, Serialize)]
pub struct TableMetadata {
    pub num_rows: usize,
    pub num_columns: usize,
    pub columns: Vec<ColumnMeta>,
    pub file_size: u64,
    /// Sheet names, for workbook formats only
    pub sheets: Option<Vec<String>>,
}

/// Uniform paging contract over a tabular file format.
pub trait DataProvider: Send + Sync {
    /// Short format name used in error messages and progress output.
    fn format_name(&self) -> &'static str;

    /// Parse (once) and return the table description.
    fn load_metadata(&self) -> DataResult<Arc<TableMetadata>>;

    /// Return up to `limit` rows starting at `offset`, clamped to the
    /// table bounds.
    fn load_data(&self, offset: usize, limit: usize) -> DataResult<Vec<Row>>;

    /// Switch the active sheet (workbook formats only). After this
    /// resolves, the next `load_metadata` reflects the new sheet.
    fn switch_sheet(&self, index: usize) -> DataResult<()> {
        let _ = index;
        Err(DataError::UnsupportedOperation("switch_sheet"))
    }
}

/// Clamp an `(offset, limit)` request to `total` rows.
///
/// Returns the clamped offset and the effective count. The subtraction
/// cannot underflow because the offset is clamped first; the debug assert
/// documents that invariant rather than enforcing it at runtime.
pub(crate) fn clamp_request(offset: usize, limit: usize, total: usize) -> (usize, usize) {
    let offset = offset.min(total);
    debug_assert!(total >= offset);
    let count = limit.min(total - offset);
    (offset, count)
}

/// Make `raw` column names non-empty and unique, preserving order.
///
/// Empty names become `Column N`; duplicates get a numeric suffix so rows
/// keyed by name never collide.
pub(crate) fn dedupe_column_names(raw: Vec<String>) -> Vec<String> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Column {}", i + 1)
            } else {
                name.trim().to_string()
            };
            match seen.get_mut(&base) {
                None => {
                    seen.insert(base.clone(), 1);
                    base
                }
                Some(count) => {
                    *count += 1;
                    format!("{} ({})", base, count)
                }
            }
        })
        .collect()
}
