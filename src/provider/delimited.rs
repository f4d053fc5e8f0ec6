//! Delimited-text (CSV/TSV) provider.
//!
//! Parses the file once, on first metadata access, and pages rows out of
//! the parsed buffer. The delimiter is auto-detected from content unless
//! the factory request pinned one (a `.tsv` tag pins tab).
//!
//! Column types are inferred, not declared: the first
//! [`TYPE_INFER_SAMPLE_ROWS`] data rows are sampled per column, and a
//! column is `number`/`boolean` only when every sampled non-empty value
//! parses as one. Cell coercion is independent of the inferred tag so a
//! stray value in a mostly-numeric column stays visible as text.

use crate::constants::{DELIMITER_SNIFF_LINES, TYPE_INFER_SAMPLE_ROWS};
use crate::error::{DataError, DataResult};
use crate::provider::{
    clamp_request, dedupe_column_names, ColumnMeta, DataProvider, Row, TableMetadata,
};
use crate::source::ByteSource;
use crate::value::Value;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const FORMAT: &str = "delimited";

struct ParsedTable {
    metadata: Arc<TableMetadata>,
    rows: Vec<Row>,
}

/// Provider for comma/tab/semicolon separated text with a header row.
pub struct DelimitedProvider {
    source: Arc<dyn ByteSource>,
    declared_delimiter: Option<u8>,
    state: RwLock<Option<ParsedTable>>,
}

impl DelimitedProvider {
    /// Construct without touching the source; parsing happens on first
    /// metadata access.
    pub fn new(source: Arc<dyn ByteSource>, delimiter: Option<u8>) -> Self {
        Self {
            source,
            declared_delimiter: delimiter,
            state: RwLock::new(None),
        }
    }

    fn ensure_parsed(&self) -> DataResult<()> {
        if self.state.read().is_some() {
            return Ok(());
        }

        let start = Instant::now();
        let file_size = self.source.byte_length();
        let bytes = self.source.read_range(0, file_size)?;
        let text = String::from_utf8_lossy(&bytes);

        let delimiter = self
            .declared_delimiter
            .unwrap_or_else(|| detect_delimiter(&text));

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_ref());

        let headers = reader
            .headers()
            .map_err(|e| DataError::parse(FORMAT, e))?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        if headers.is_empty() {
            return Err(DataError::parse(FORMAT, "no columns found"));
        }
        let names = dedupe_column_names(headers);

        let mut records: Vec<csv::StringRecord> = Vec::new();
        for record in reader.records() {
            records.push(record.map_err(|e| DataError::parse(FORMAT, e))?);
        }

        let columns: Vec<ColumnMeta> = names
            .iter()
            .enumerate()
            .map(|(i, name)| ColumnMeta {
                name: name.clone(),
                type_tag: infer_column_type(&records, i).to_string(),
                logical: None,
            })
            .collect();

        let rows: Vec<Row> = records
            .iter()
            .map(|record| {
                names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), coerce_cell(record.get(i).unwrap_or(""))))
                    .collect()
            })
            .collect();

        let metadata = Arc::new(TableMetadata {
            num_rows: rows.len(),
            num_columns: columns.len(),
            columns,
            file_size,
            sheets: None,
        });

        debug!(
            rows = metadata.num_rows,
            cols = metadata.num_columns,
            "parsed delimited file in {:?}",
            start.elapsed()
        );

        *self.state.write() = Some(ParsedTable { metadata, rows });
        Ok(())
    }
}

impl DataProvider for DelimitedProvider {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn load_metadata(&self) -> DataResult<Arc<TableMetadata>> {
        self.ensure_parsed()?;
        Ok(self.state.read().as_ref().map(|t| t.metadata.clone()).unwrap())
    }

    fn load_data(&self, offset: usize, limit: usize) -> DataResult<Vec<Row>> {
        self.ensure_parsed()?;
        let state = self.state.read();
        let table = state.as_ref().unwrap();
        let (offset, count) = clamp_request(offset, limit, table.rows.len());
        Ok(table.rows[offset..offset + count].to_vec())
    }
}

/// Pick the delimiter that appears most often in the first few lines.
///
/// Comma wins ties, matching what the original viewer shipped.
fn detect_delimiter(text: &str) -> u8 {
    let head: String = text
        .lines()
        .take(DELIMITER_SNIFF_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let comma_count = head.matches(',').count();
    let tab_count = head.matches('\t').count();
    let semicolon_count = head.matches(';').count();

    if tab_count > comma_count && tab_count > semicolon_count {
        b'\t'
    } else if semicolon_count > comma_count {
        b';'
    } else {
        b','
    }
}

/// Infer the type tag for a column by sampling leading data rows.
fn infer_column_type(records: &[csv::StringRecord], col_idx: usize) -> &'static str {
    let sample: Vec<&str> = records
        .iter()
        .take(TYPE_INFER_SAMPLE_ROWS)
        .filter_map(|r| r.get(col_idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sample.is_empty() {
        return "string";
    }
    if sample.iter().all(|s| s.parse::<f64>().is_ok()) {
        return "number";
    }
    if sample.iter().all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")) {
        return "boolean";
    }
    "string"
}

/// Coerce one raw field into a value.
///
/// Integer-parseable text becomes `Int` so 64-bit identifiers in CSV
/// exports keep their exact value.
fn coerce_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(trimmed.to_string())
}
