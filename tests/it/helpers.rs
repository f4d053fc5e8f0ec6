//! Test helpers and fixtures for reducing boilerplate in tests.
//!
//! This module provides:
//! - `StubProvider` - scriptable provider with call counters and a gate
//!   for exercising loader races
//! - `CountingSource` - byte source wrapper that counts transport reads
//! - Fixture builders for Parquet (ArrowWriter) and XLSX (umya) files

use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use bytes::Bytes;
use parking_lot::Mutex;
use parquet::arrow::ArrowWriter;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use tableview::error::{DataError, DataResult};
use tableview::provider::{ColumnMeta, DataProvider, Row, TableMetadata};
use tableview::source::ByteSource;
use tableview::value::Value;

/// Initialize tracing for a test run; later calls are no-ops.
///
/// Run with `RUST_LOG=tableview=debug` to watch loader sessions.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// StubProvider - scriptable provider for loader tests
// ============================================================================

pub struct StubSheet {
    pub name: &'static str,
    pub rows: usize,
}

/// Provider serving synthetic rows with observable call counts.
///
/// Rows look like `{ idx: <i>, label: "row-<i>-s<sheet>" }` so tests can
/// tell which sheet and offset a row came from.
pub struct StubProvider {
    sheets: Vec<StubSheet>,
    active: AtomicUsize,
    pub metadata_calls: AtomicUsize,
    pub data_calls: AtomicUsize,
    fail_metadata: AtomicBool,
    /// When present, every load_data blocks on the gate until the test
    /// sends (or drops the sender).
    gate: Mutex<Option<mpsc::Receiver<()>>>,
}

impl StubProvider {
    pub fn with_rows(rows: usize) -> Self {
        Self::with_sheets(vec![StubSheet { name: "main", rows }])
    }

    pub fn with_sheets(sheets: Vec<StubSheet>) -> Self {
        Self {
            sheets,
            active: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
            data_calls: AtomicUsize::new(0),
            fail_metadata: AtomicBool::new(false),
            gate: Mutex::new(None),
        }
    }

    pub fn gated(self, gate: mpsc::Receiver<()>) -> Self {
        *self.gate.lock() = Some(gate);
        self
    }

    pub fn set_fail_metadata(&self, fail: bool) {
        self.fail_metadata.store(fail, Ordering::SeqCst);
    }

    fn active_sheet(&self) -> &StubSheet {
        &self.sheets[self.active.load(Ordering::SeqCst)]
    }
}

impl DataProvider for StubProvider {
    fn format_name(&self) -> &'static str {
        "stub"
    }

    fn load_metadata(&self) -> DataResult<Arc<TableMetadata>> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_metadata.load(Ordering::SeqCst) {
            return Err(DataError::parse("stub", "injected metadata failure"));
        }

        let sheet = self.active_sheet();
        Ok(Arc::new(TableMetadata {
            num_rows: sheet.rows,
            num_columns: 2,
            columns: vec![
                ColumnMeta {
                    name: "idx".to_string(),
                    type_tag: "Int64".to_string(),
                    logical: None,
                },
                ColumnMeta {
                    name: "label".to_string(),
                    type_tag: "string".to_string(),
                    logical: None,
                },
            ],
            file_size: 0,
            sheets: if self.sheets.len() > 1 {
                Some(self.sheets.iter().map(|s| s.name.to_string()).collect())
            } else {
                None
            },
        }))
    }

    fn load_data(&self, offset: usize, limit: usize) -> DataResult<Vec<Row>> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &*self.gate.lock() {
            // Block until the test releases this fetch.
            let _ = gate.recv();
        }

        let sheet_idx = self.active.load(Ordering::SeqCst);
        let total = self.active_sheet().rows;
        let offset = offset.min(total);
        let count = limit.min(total - offset);

        Ok((offset..offset + count)
            .map(|i| {
                [
                    ("idx".to_string(), Value::Int(i as i64)),
                    (
                        "label".to_string(),
                        Value::Str(format!("row-{}-s{}", i, sheet_idx)),
                    ),
                ]
                .into_iter()
                .collect()
            })
            .collect())
    }

    fn switch_sheet(&self, index: usize) -> DataResult<()> {
        if index >= self.sheets.len() {
            return Err(DataError::SheetOutOfRange {
                index,
                count: self.sheets.len(),
            });
        }
        self.active.store(index, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// CountingSource - transport read counter
// ============================================================================

/// Wraps a byte source and counts transport reads, for cache and
/// idempotency assertions.
pub struct CountingSource {
    inner: Arc<dyn ByteSource>,
    pub reads: AtomicUsize,
}

impl CountingSource {
    pub fn new(inner: Arc<dyn ByteSource>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reads: AtomicUsize::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ByteSource for CountingSource {
    fn byte_length(&self) -> u64 {
        self.inner.byte_length()
    }

    fn read_range(&self, start: u64, end: u64) -> DataResult<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_range(start, end)
    }
}

// ============================================================================
// Fixture builders
// ============================================================================

/// A small Parquet file in memory: columns (id: Int64, name: Utf8,
/// ratio: Float64), `rows` data rows, `id` counting up with `i64::MAX`
/// in row 0 to exercise integer fidelity.
pub fn parquet_fixture(rows: usize) -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("ratio", DataType::Float64, true),
    ]));

    let ids: Vec<i64> = (0..rows)
        .map(|i| if i == 0 { i64::MAX } else { i as i64 })
        .collect();
    let names: Vec<Option<String>> = (0..rows)
        .map(|i| {
            if i % 7 == 3 {
                None
            } else {
                Some(format!("name-{}", i))
            }
        })
        .collect();
    let ratios: Vec<f64> = (0..rows).map(|i| i as f64 / 4.0).collect();

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ids)),
            Arc::new(StringArray::from(names)),
            Arc::new(Float64Array::from(ratios)),
        ],
    )
    .unwrap();

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    buf
}

/// A two-sheet XLSX workbook on disk. Sheet1 has 3 data rows of
/// (name, age), Sheet2 has 2 data rows of (city, population).
pub fn workbook_fixture() -> tempfile::NamedTempFile {
    let mut book = umya_spreadsheet::new_file();

    {
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut("A1").set_value("name");
        sheet.get_cell_mut("B1").set_value("age");
        for (i, (name, age)) in [("alice", 30.0), ("bob", 25.0), ("carol", 41.0)]
            .iter()
            .enumerate()
        {
            let row = (i + 2).to_string();
            sheet.get_cell_mut(format!("A{}", row).as_str()).set_value(*name);
            sheet
                .get_cell_mut(format!("B{}", row).as_str())
                .set_value_number(*age);
        }
    }

    {
        let sheet = book.new_sheet("Sheet2").unwrap();
        sheet.get_cell_mut("A1").set_value("city");
        sheet.get_cell_mut("B1").set_value("population");
        for (i, (city, pop)) in [("berlin", 3_700_000.0), ("lyon", 520_000.0)]
            .iter()
            .enumerate()
        {
            let row = (i + 2).to_string();
            sheet.get_cell_mut(format!("A{}", row).as_str()).set_value(*city);
            sheet
                .get_cell_mut(format!("B{}", row).as_str())
                .set_value_number(*pop);
        }
    }

    let tmp = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    umya_spreadsheet::writer::xlsx::write(&book, tmp.path()).unwrap();
    tmp
}

/// Label cell of a stub row, for asserting which session a row came from.
pub fn row_label(row: &Row) -> &str {
    match row.get("label") {
        Some(Value::Str(s)) => s,
        other => panic!("missing label cell: {:?}", other),
    }
}
