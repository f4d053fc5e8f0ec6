//! Workbook (XLSX/ODS) provider with sheet switching.
//!
//! calamine needs the whole archive, so the file is read once and the
//! opened workbook is kept for the provider's lifetime; switching sheets
//! re-reads only the newly active sheet. The first row of a sheet is the
//! header row, matching how the delimited provider treats CSV files.
//!
//! Switching sheets invalidates the cached metadata and row buffer for the
//! previous sheet; the next `load_metadata` reflects the new sheet.

use crate::error::{DataError, DataResult};
use crate::provider::{
    clamp_request, dedupe_column_names, ColumnMeta, DataProvider, Row, TableMetadata,
};
use crate::source::ByteSource;
use crate::value::Value;
use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use parking_lot::RwLock;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const FORMAT: &str = "workbook";

struct SheetTable {
    metadata: Arc<TableMetadata>,
    rows: Vec<Row>,
}

#[derive(Default)]
struct WorkbookState {
    book: Option<Sheets<Cursor<Vec<u8>>>>,
    sheet_names: Vec<String>,
    active_sheet: usize,
    table: Option<SheetTable>,
}

/// Provider for spreadsheet workbooks (XLSX, ODS, legacy XLS).
pub struct WorkbookProvider {
    source: Arc<dyn ByteSource>,
    state: RwLock<WorkbookState>,
}

impl WorkbookProvider {
    /// Construct without touching the source; the archive is opened on
    /// first metadata access or sheet switch.
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        Self {
            source,
            state: RwLock::new(WorkbookState::default()),
        }
    }

    /// Names of all sheets in the workbook (opens the archive if needed).
    pub fn sheet_names(&self) -> DataResult<Vec<String>> {
        let mut state = self.state.write();
        self.ensure_open(&mut state)?;
        Ok(state.sheet_names.clone())
    }

    fn ensure_open(&self, state: &mut WorkbookState) -> DataResult<()> {
        if state.book.is_some() {
            return Ok(());
        }

        let start = Instant::now();
        let bytes = self.source.read_range(0, self.source.byte_length())?;
        let book = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| DataError::parse(FORMAT, e))?;
        let sheet_names = book.sheet_names();
        debug!(sheets = sheet_names.len(), "opened workbook in {:?}", start.elapsed());

        state.book = Some(book);
        state.sheet_names = sheet_names;
        Ok(())
    }

    fn ensure_sheet(&self, state: &mut WorkbookState) -> DataResult<()> {
        if state.table.is_some() {
            return Ok(());
        }
        self.ensure_open(state)?;

        let name = state
            .sheet_names
            .get(state.active_sheet)
            .cloned()
            .ok_or(DataError::SheetOutOfRange {
                index: state.active_sheet,
                count: state.sheet_names.len(),
            })?;

        let start = Instant::now();
        let range = state
            .book
            .as_mut()
            .unwrap()
            .worksheet_range(&name)
            .map_err(|e| DataError::parse(FORMAT, e))?;

        let mut sheet_rows = range.rows();
        let header: Vec<String> = sheet_rows
            .next()
            .map(|cells| cells.iter().map(cell_text).collect())
            .unwrap_or_default();
        let names = dedupe_column_names(header);

        let rows: Vec<Row> = sheet_rows
            .map(|cells| {
                names
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        let value = cells.get(i).map(cell_value).unwrap_or(Value::Null);
                        (col.clone(), value)
                    })
                    .collect()
            })
            .collect();

        let columns: Vec<ColumnMeta> = names
            .iter()
            .map(|col| ColumnMeta {
                name: col.clone(),
                type_tag: infer_sheet_column_type(&rows, col).to_string(),
                logical: None,
            })
            .collect();

        let metadata = Arc::new(TableMetadata {
            num_rows: rows.len(),
            num_columns: columns.len(),
            columns,
            file_size: self.source.byte_length(),
            sheets: Some(state.sheet_names.clone()),
        });

        debug!(
            sheet = %name,
            rows = metadata.num_rows,
            "read sheet in {:?}",
            start.elapsed()
        );

        state.table = Some(SheetTable { metadata, rows });
        Ok(())
    }
}

impl DataProvider for WorkbookProvider {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn load_metadata(&self) -> DataResult<Arc<TableMetadata>> {
        let mut state = self.state.write();
        self.ensure_sheet(&mut state)?;
        Ok(state.table.as_ref().map(|t| t.metadata.clone()).unwrap())
    }

    fn load_data(&self, offset: usize, limit: usize) -> DataResult<Vec<Row>> {
        let mut state = self.state.write();
        self.ensure_sheet(&mut state)?;
        let table = state.table.as_ref().unwrap();
        let (offset, count) = clamp_request(offset, limit, table.rows.len());
        Ok(table.rows[offset..offset + count].to_vec())
    }

    fn switch_sheet(&self, index: usize) -> DataResult<()> {
        let mut state = self.state.write();
        self.ensure_open(&mut state)?;
        if index >= state.sheet_names.len() {
            return Err(DataError::SheetOutOfRange {
                index,
                count: state.sheet_names.len(),
            });
        }
        state.active_sheet = index;
        // The old sheet's metadata and rows are gone the moment the switch
        // resolves; the next load re-derives everything.
        state.table = None;
        Ok(())
    }
}

/// Header-cell text; empty cells get a synthesized name later.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Map one sheet cell into the crate value domain.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Str(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::Date)
            .unwrap_or(Value::Float(dt.as_f64())),
        Data::DateTimeIso(s) => s
            .parse::<chrono::NaiveDateTime>()
            .map(Value::Date)
            .unwrap_or_else(|_| Value::Str(s.clone())),
        Data::DurationIso(s) => Value::Str(s.clone()),
        Data::Error(e) => Value::Opaque(format!("cell error: {:?}", e)),
    }
}

/// Tag a column from its first non-null loaded value.
fn infer_sheet_column_type(rows: &[Row], column: &str) -> &'static str {
    for row in rows {
        match row.get(column) {
            Some(Value::Null) | None => continue,
            Some(Value::Int(_)) | Some(Value::Float(_)) => return "number",
            Some(Value::Bool(_)) => return "boolean",
            Some(Value::Date(_)) => return "datetime",
            Some(_) => return "string",
        }
    }
    "string"
}
