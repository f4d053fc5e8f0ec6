//! Parquet provider.
//!
//! Reads through a [`RangeReadBuffer`] so only the footer and the row
//! groups covering a request are fetched from the transport; re-reads of
//! the same ranges during scrolling come out of the range cache. The
//! parsed footer is kept so paging never re-parses metadata.

use crate::error::{DataError, DataResult};
use crate::provider::columnar::batch_to_rows;
use crate::provider::{clamp_request, ColumnMeta, DataProvider, Row, TableMetadata};
use crate::source::{ByteSource, RangeReadBuffer};
use bytes::{Buf, Bytes};
use parking_lot::RwLock;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use parquet::file::reader::{ChunkReader, Length};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const FORMAT: &str = "parquet";

/// Adapter presenting the range buffer as the parquet crate's reader, so
/// footer and row-group reads become cached range reads.
#[derive(Clone)]
pub(crate) struct RangeChunkReader {
    buffer: Arc<RangeReadBuffer>,
}

impl RangeChunkReader {
    pub(crate) fn new(buffer: Arc<RangeReadBuffer>) -> Self {
        Self { buffer }
    }
}

impl Length for RangeChunkReader {
    fn len(&self) -> u64 {
        self.buffer.byte_length()
    }
}

impl ChunkReader for RangeChunkReader {
    type T = bytes::buf::Reader<Bytes>;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        let bytes = self
            .buffer
            .slice(start, None)
            .map_err(|e| parquet::errors::ParquetError::External(Box::new(e)))?;
        Ok(bytes.reader())
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        self.buffer
            .slice(start, Some(start + length as u64))
            .map_err(|e| parquet::errors::ParquetError::External(Box::new(e)))
    }
}

struct ParquetState {
    metadata: Arc<TableMetadata>,
    /// Parsed footer, reused by every subsequent page read
    footer: ArrowReaderMetadata,
    column_names: Vec<String>,
}

/// Provider for Parquet files, range-read backed.
pub struct ParquetProvider {
    buffer: Arc<RangeReadBuffer>,
    state: RwLock<Option<ParquetState>>,
}

impl ParquetProvider {
    /// Construct without touching the source; the footer is fetched on
    /// first metadata access.
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        Self {
            buffer: Arc::new(RangeReadBuffer::new(source)),
            state: RwLock::new(None),
        }
    }

    /// The underlying range buffer (exposed for cache management).
    pub fn range_buffer(&self) -> &Arc<RangeReadBuffer> {
        &self.buffer
    }

    fn ensure_footer(&self) -> DataResult<()> {
        if self.state.read().is_some() {
            return Ok(());
        }

        let start = Instant::now();
        let reader = RangeChunkReader::new(self.buffer.clone());
        let footer = ArrowReaderMetadata::load(&reader, ArrowReaderOptions::new())
            .map_err(|e| DataError::parse(FORMAT, e))?;

        let num_rows = footer.metadata().file_metadata().num_rows().max(0) as usize;
        let root_fields = footer
            .metadata()
            .file_metadata()
            .schema_descr()
            .root_schema()
            .get_fields()
            .to_vec();

        let columns: Vec<ColumnMeta> = footer
            .schema()
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| ColumnMeta {
                name: field.name().clone(),
                type_tag: format!("{:?}", field.data_type()),
                logical: root_fields
                    .get(i)
                    .and_then(|t| t.get_basic_info().logical_type())
                    .map(|lt| format!("{:?}", lt)),
            })
            .collect();
        let column_names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();

        let metadata = Arc::new(TableMetadata {
            num_rows,
            num_columns: columns.len(),
            columns,
            file_size: self.buffer.byte_length(),
            sheets: None,
        });

        debug!(
            rows = num_rows,
            row_groups = footer.metadata().num_row_groups(),
            "parsed parquet footer in {:?}",
            start.elapsed()
        );

        *self.state.write() = Some(ParquetState {
            metadata,
            footer,
            column_names,
        });
        Ok(())
    }
}

impl DataProvider for ParquetProvider {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn load_metadata(&self) -> DataResult<Arc<TableMetadata>> {
        self.ensure_footer()?;
        Ok(self.state.read().as_ref().map(|s| s.metadata.clone()).unwrap())
    }

    fn load_data(&self, offset: usize, limit: usize) -> DataResult<Vec<Row>> {
        self.ensure_footer()?;
        let (footer, column_names, total) = {
            let state = self.state.read();
            let s = state.as_ref().unwrap();
            (s.footer.clone(), s.column_names.clone(), s.metadata.num_rows)
        };

        let (offset, count) = clamp_request(offset, limit, total);
        if count == 0 {
            return Ok(Vec::new());
        }

        let reader = RangeChunkReader::new(self.buffer.clone());
        let batch_reader = ParquetRecordBatchReaderBuilder::new_with_metadata(reader, footer)
            .with_offset(offset)
            .with_limit(count)
            .with_batch_size(count.min(1024))
            .build()
            .map_err(|e| DataError::parse(FORMAT, e))?;

        let mut rows = Vec::with_capacity(count);
        for batch in batch_reader {
            let batch = batch.map_err(|e| DataError::parse(FORMAT, e))?;
            rows.extend(batch_to_rows(&batch, &column_names));
        }
        Ok(rows)
    }
}
