//! TradeLens Core: trade-history ingestion and flattening.
//!
//! This crate owns the Loader stage of the pipeline:
//! - Domain types (account identifiers, typed trade records)
//! - Raw CSV reading with per-column inspection
//! - Flattening of the nested JSON trade log carried in each raw row
//! - The flattened-table CSV cache with its metadata sidecar
//! - An explicit two-variant input source (already flattened vs. raw)

pub mod data;
pub mod domain;
pub mod schema;

pub use data::{
    flatten, CacheFreshness, CacheMeta, ColumnSummary, DatasetSummary, FlatCache, FlatTable,
    FlattenOptions, FlattenReport, LoadError, LoadedTable, MalformedPolicy, RawTable,
    SkippedRow, SourceMode, TradeSource,
};
pub use domain::{AccountId, TradeRecord};
pub use schema::TradeColumns;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: loader output types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<AccountId>();
        require_sync::<AccountId>();
        require_send::<TradeRecord>();
        require_sync::<TradeRecord>();
        require_send::<FlatTable>();
        require_sync::<FlatTable>();
        require_send::<RawTable>();
        require_sync::<RawTable>();
        require_send::<TradeSource>();
        require_sync::<TradeSource>();
        require_send::<FlattenReport>();
        require_sync::<FlattenReport>();
        require_send::<LoadError>();
        require_sync::<LoadError>();
    }
}
