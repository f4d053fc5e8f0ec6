//! ORC provider.
//!
//! ORC is the legacy columnar tier: orc-rust exposes batch iteration but
//! no offset addressing, so the provider decodes the file once at metadata
//! time and pages out of the decoded buffer. That puts the whole table in
//! memory for ORC inputs, which matches how the original viewer handled
//! the format.

use crate::error::{DataError, DataResult};
use crate::provider::columnar::batch_to_rows;
use crate::provider::{clamp_request, ColumnMeta, DataProvider, Row, TableMetadata};
use crate::source::ByteSource;
use arrow::array::RecordBatchReader;
use bytes::Bytes;
use orc_rust::ArrowReaderBuilder;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const FORMAT: &str = "orc";

const ORC_BATCH_ROWS: usize = 8192;

struct OrcTable {
    metadata: Arc<TableMetadata>,
    rows: Vec<Row>,
}

/// Provider for ORC files.
pub struct OrcProvider {
    source: Arc<dyn ByteSource>,
    state: RwLock<Option<OrcTable>>,
}

impl OrcProvider {
    /// Construct without touching the source; decoding happens on first
    /// metadata access.
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        Self {
            source,
            state: RwLock::new(None),
        }
    }

    fn ensure_decoded(&self) -> DataResult<()> {
        if self.state.read().is_some() {
            return Ok(());
        }

        let start = Instant::now();
        let file_size = self.source.byte_length();
        let bytes: Bytes = self.source.read_range(0, file_size)?;

        let reader = ArrowReaderBuilder::try_new(bytes)
            .map_err(|e| DataError::parse(FORMAT, e))?
            .with_batch_size(ORC_BATCH_ROWS)
            .build();

        let schema = reader.schema();
        let columns: Vec<ColumnMeta> = schema
            .fields()
            .iter()
            .map(|field| ColumnMeta {
                name: field.name().clone(),
                type_tag: format!("{:?}", field.data_type()),
                logical: None,
            })
            .collect();
        let column_names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| DataError::parse(FORMAT, e))?;
            rows.extend(batch_to_rows(&batch, &column_names));
        }

        let metadata = Arc::new(TableMetadata {
            num_rows: rows.len(),
            num_columns: columns.len(),
            columns,
            file_size,
            sheets: None,
        });

        debug!(
            rows = metadata.num_rows,
            "decoded orc file in {:?}",
            start.elapsed()
        );

        *self.state.write() = Some(OrcTable { metadata, rows });
        Ok(())
    }
}

impl DataProvider for OrcProvider {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn load_metadata(&self) -> DataResult<Arc<TableMetadata>> {
        self.ensure_decoded()?;
        Ok(self.state.read().as_ref().map(|t| t.metadata.clone()).unwrap())
    }

    fn load_data(&self, offset: usize, limit: usize) -> DataResult<Vec<Row>> {
        self.ensure_decoded()?;
        let state = self.state.read();
        let table = state.as_ref().unwrap();
        let (offset, count) = clamp_request(offset, limit, table.rows.len());
        Ok(table.rows[offset..offset + count].to_vec())
    }
}
