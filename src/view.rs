//! Row/column view model.
//!
//! Owns the growing row buffer and the per-table view state (sort, column
//! filters, visibility, global filter). The buffer is append-only between
//! resets and is never reordered; sorting and filtering project an index
//! list over it instead, so asynchronously arriving chunks can always be
//! appended at the end.
//!
//! Sorting and filtering see **loaded rows only** — nothing is pushed down
//! to the provider. With a partially loaded file, a sort or filter result
//! can change as more rows arrive. That matches the shipped viewer and is
//! kept deliberately; see DESIGN.md before "fixing" it.

use crate::provider::{Row, TableMetadata};
use crate::value::{cmp_values, Value};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Active sort, by column name.
#[derive(Clone, Debug, PartialEq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Substring filter on a single column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub text: String,
}

/// Cosmetic width class for a column, from name/type heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnWidth {
    Narrow,
    Medium,
    Wide,
    Default,
}

/// One displayable column, derived 1:1 from metadata.
#[derive(Clone, Debug)]
pub struct ColumnSpec {
    pub name: String,
    pub type_tag: String,
    pub logical: Option<String>,
    pub width: ColumnWidth,
}

/// Width heuristic: identifier-ish names stay narrow, prose-ish and
/// time-ish names go wide, floats get room for decimals.
pub fn column_width(name: &str, type_tag: &str) -> ColumnWidth {
    let name = name.to_lowercase();
    let tag = type_tag.to_lowercase();

    if name.contains("id") || name.contains("index") {
        return ColumnWidth::Narrow;
    }
    if name.contains("timestamp")
        || name.contains("date")
        || name.contains("name")
        || name.contains("title")
        || name.contains("description")
    {
        return ColumnWidth::Wide;
    }
    if tag.contains("bool") {
        return ColumnWidth::Narrow;
    }
    if tag.contains("float") || tag.contains("double") {
        return ColumnWidth::Medium;
    }
    ColumnWidth::Default
}

/// The row buffer plus derived view state for one load session.
#[derive(Default)]
pub struct TableViewModel {
    columns: Vec<ColumnSpec>,
    rows: Vec<Row>,
    total_rows: usize,
    active_sheet: usize,
    sorting: Option<SortSpec>,
    column_filters: Vec<ColumnFilter>,
    hidden_columns: HashSet<String>,
    global_filter: String,
}

impl TableViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Buffer lifecycle (driven by the progressive loader)
    // ------------------------------------------------------------------

    /// Install a fresh metadata snapshot, deriving the column list.
    pub fn install_metadata(&mut self, metadata: &TableMetadata, active_sheet: usize) {
        self.columns = metadata
            .columns
            .iter()
            .map(|c| ColumnSpec {
                name: c.name.clone(),
                type_tag: c.type_tag.clone(),
                logical: c.logical.clone(),
                width: column_width(&c.name, &c.type_tag),
            })
            .collect();
        self.total_rows = metadata.num_rows;
        self.active_sheet = active_sheet;
    }

    /// Append one fetched chunk. Chunks arrive in fetch order and are
    /// never reordered.
    pub fn append_rows(&mut self, rows: Vec<Row>) {
        self.rows.extend(rows);
        debug_assert!(self.rows.len() <= self.total_rows || self.total_rows == 0);
    }

    /// Discard the buffer and all view state (sheet switch, reload).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ------------------------------------------------------------------
    // Loaded-range state
    // ------------------------------------------------------------------

    pub fn loaded_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Columns currently shown, in metadata order.
    pub fn visible_columns(&self) -> Vec<&ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| !self.hidden_columns.contains(&c.name))
            .collect()
    }

    // ------------------------------------------------------------------
    // View state
    // ------------------------------------------------------------------

    /// Cycle sort on `column`: ascending → descending → off.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sorting = match &self.sorting {
            Some(s) if s.column == column => match s.direction {
                SortDirection::Ascending => Some(SortSpec {
                    column: column.to_string(),
                    direction: SortDirection::Descending,
                }),
                SortDirection::Descending => None,
            },
            _ => Some(SortSpec {
                column: column.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sorting = sort;
    }

    pub fn sorting(&self) -> Option<&SortSpec> {
        self.sorting.as_ref()
    }

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.global_filter = text.into();
    }

    /// Replace the filter on one column; empty text clears it.
    pub fn set_column_filter(&mut self, column: &str, text: &str) {
        self.column_filters.retain(|f| f.column != column);
        if !text.is_empty() {
            self.column_filters.push(ColumnFilter {
                column: column.to_string(),
                text: text.to_string(),
            });
        }
    }

    pub fn set_column_visible(&mut self, column: &str, visible: bool) {
        if visible {
            self.hidden_columns.remove(column);
        } else {
            self.hidden_columns.insert(column.to_string());
        }
    }

    // ------------------------------------------------------------------
    // Projection
    // ------------------------------------------------------------------

    /// Indices of the rows currently visible, filtered then sorted.
    ///
    /// Recomputed per call over the loaded buffer; the buffer itself is
    /// untouched.
    pub fn visible_rows(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&i| self.row_passes_filters(&self.rows[i]))
            .collect();

        if let Some(sort) = &self.sorting {
            let column = sort.column.clone();
            indices.sort_by(|&a, &b| {
                let va = self.rows[a].get(&column).unwrap_or(&Value::Null);
                let vb = self.rows[b].get(&column).unwrap_or(&Value::Null);
                let ordering = cmp_values(va, vb);
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        indices
    }

    /// Count of rows passing the current filters (loaded rows only).
    pub fn visible_row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| self.row_passes_filters(r))
            .count()
    }

    fn row_passes_filters(&self, row: &Row) -> bool {
        for filter in &self.column_filters {
            let value = row.get(&filter.column).unwrap_or(&Value::Null);
            if !value
                .to_text()
                .to_lowercase()
                .contains(&filter.text.to_lowercase())
            {
                return false;
            }
        }

        if self.global_filter.is_empty() {
            return true;
        }
        let needle = self.global_filter.to_lowercase();
        self.columns
            .iter()
            .filter(|c| !self.hidden_columns.contains(&c.name))
            .any(|c| {
                row.get(&c.name)
                    .map(|v| v.to_text().to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
    }
}
