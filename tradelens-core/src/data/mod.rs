//! Data ingestion, flattening and caching

pub mod cache;
pub mod error;
pub mod flatten;
pub mod raw;
pub mod source;
pub mod table;

pub use cache::{hash_file, CacheFreshness, CacheMeta, FlatCache};
pub use error::LoadError;
pub use flatten::{flatten, parse_history, FlattenOptions, FlattenReport, MalformedPolicy, SkippedRow};
pub use raw::{ColumnSummary, DatasetSummary, RawTable};
pub use source::{LoadedTable, SourceMode, TradeSource};
pub use table::FlatTable;
