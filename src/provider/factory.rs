//! Format tag → provider construction.
//!
//! The single dispatch point for formats. The tag comes from the shell's
//! file-type detection (an external collaborator) and is never sniffed
//! from content here. Construction does no I/O, so an unrecognized tag
//! fails before anything touches the transport; adding a format means
//! adding a variant here and nowhere else.

use crate::error::{DataError, DataResult};
use crate::provider::{DataProvider, DelimitedProvider, OrcProvider, ParquetProvider, WorkbookProvider};
use crate::source::ByteSource;
use std::sync::Arc;

/// Closed set of table formats this build understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Parquet,
    /// CSV/TSV; `delimiter` pins the separator, `None` auto-detects
    Delimited { delimiter: Option<u8> },
    /// XLSX / ODS / legacy XLS
    Workbook,
    Orc,
}

impl TableFormat {
    /// Parse a declared format tag (usually the detected file extension).
    pub fn parse(tag: &str) -> DataResult<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "parquet" => Ok(TableFormat::Parquet),
            "csv" | "delimited" => Ok(TableFormat::Delimited { delimiter: None }),
            "tsv" => Ok(TableFormat::Delimited {
                delimiter: Some(b'\t'),
            }),
            "xlsx" | "ods" | "xls" | "xlsb" | "workbook" => Ok(TableFormat::Workbook),
            "orc" => Ok(TableFormat::Orc),
            other => Err(DataError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Build the provider for `format` over `source`. No I/O happens here;
/// each provider parses lazily on first access.
pub fn make_provider(format: TableFormat, source: Arc<dyn ByteSource>) -> Arc<dyn DataProvider> {
    match format {
        TableFormat::Parquet => Arc::new(ParquetProvider::new(source)),
        TableFormat::Delimited { delimiter } => {
            Arc::new(DelimitedProvider::new(source, delimiter))
        }
        TableFormat::Workbook => Arc::new(WorkbookProvider::new(source)),
        TableFormat::Orc => Arc::new(OrcProvider::new(source)),
    }
}

/// Convenience: parse the tag and build in one step.
pub fn provider_for_tag(
    tag: &str,
    source: Arc<dyn ByteSource>,
) -> DataResult<Arc<dyn DataProvider>> {
    Ok(make_provider(TableFormat::parse(tag)?, source))
}
