//! Error types for data operations
//!
//! Provides unified error handling for all byte-range, parsing and loading
//! operations. Transport failures keep their status and range so the caller
//! can decide whether a manual retry makes sense; parse failures carry the
//! format name so the viewer can show which backend rejected the file.

use thiserror::Error;

/// Errors that can occur during data operations
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A byte-range read failed at the transport level
    #[error("range read {start}-{end} failed with status {status}")]
    Range { status: u16, start: u64, end: u64 },

    /// A format backend rejected the bytes
    #[error("{format} parse error: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// JSON serialization error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The declared format tag is not one this build understands
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The provider does not implement this part of the contract
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// A requested sheet index does not exist in the workbook
    #[error("sheet index {index} out of range ({count} sheets)")]
    SheetOutOfRange { index: usize, count: usize },

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Wrap a backend failure with the owning format's name.
    pub fn parse(format: &'static str, err: impl std::fmt::Display) -> Self {
        DataError::Parse {
            format,
            message: err.to_string(),
        }
    }
}

impl From<String> for DataError {
    fn from(s: String) -> Self {
        DataError::Other(s)
    }
}

impl From<&str> for DataError {
    fn from(s: &str) -> Self {
        DataError::Other(s.to_string())
    }
}
