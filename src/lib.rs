//! Data-table engine for the file-viewer shell.
//!
//! Everything the tabular viewers (Parquet, CSV/TSV, XLSX/ODS, ORC) need
//! between "here is a file" and "rows on screen":
//!
//! - [`provider`] — per-format adapters behind one paging contract, plus
//!   the factory that picks one from a declared format tag
//! - [`source`] — byte-range access with a bounded range cache for
//!   remote/large files
//! - [`loader`] — progressive loading: metadata, then chunked row fetches
//!   published as they arrive, with load-more on scroll
//! - [`view`] — the row buffer plus sort/filter/visibility state
//! - [`window`] — virtualized row-window arithmetic
//! - [`normalize`] — display formatting and lossless copy/export
//!
//! The rendering shell stays on the other side of two seams: it reads the
//! view model and progress channel, and it drives scroll positions through
//! [`window::RowWindow`]. It never reaches into a provider.

pub mod constants;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod provider;
pub mod source;
pub mod value;
pub mod view;
pub mod window;

pub use error::{DataError, DataResult};
pub use loader::{LoadPhase, LoaderConfig, Progress, ProgressiveLoader};
pub use provider::{
    make_provider, provider_for_tag, ColumnMeta, DataProvider, Row, TableFormat, TableMetadata,
};
pub use source::{ByteSource, FileSource, MemorySource, RangeReadBuffer};
pub use value::Value;
pub use view::TableViewModel;
pub use window::RowWindow;
