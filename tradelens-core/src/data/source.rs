//! Input source selection: an already-flattened table or the raw export.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::cache::{CacheFreshness, FlatCache};
use super::error::LoadError;
use super::flatten::{flatten, FlattenOptions, FlattenReport};
use super::raw::RawTable;
use super::table::FlatTable;

/// Which input the caller asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Cache when present, raw input otherwise.
    #[default]
    Auto,
    /// Always re-flatten the raw input.
    Raw,
    /// Require the cache.
    Flattened,
}

/// The resolved input. Downstream stages never touch the filesystem to
/// decide between the two.
#[derive(Debug, Clone)]
pub enum TradeSource {
    Flattened(FlatTable),
    Raw(RawTable),
}

/// A flat table ready for the metrics engine.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: FlatTable,
    pub report: FlattenReport,
    pub from_cache: bool,
}

impl TradeSource {
    pub fn resolve(mode: SourceMode, raw_path: &Path, cache: &FlatCache) -> Result<Self, LoadError> {
        match mode {
            SourceMode::Flattened => Ok(Self::Flattened(cache.load()?)),
            SourceMode::Raw => Ok(Self::Raw(RawTable::read_csv(raw_path)?)),
            SourceMode::Auto if cache.exists() => {
                if raw_path.exists() && cache.freshness(raw_path) == CacheFreshness::Stale {
                    warn!(
                        cache = %cache.path().display(),
                        raw = %raw_path.display(),
                        "raw input changed since the cache was written; pass --refresh to rebuild"
                    );
                }
                Ok(Self::Flattened(cache.load()?))
            }
            SourceMode::Auto => Ok(Self::Raw(RawTable::read_csv(raw_path)?)),
        }
    }

    pub fn is_flattened(&self) -> bool {
        matches!(self, Self::Flattened(_))
    }

    /// Flatten if needed.
    pub fn into_flat(self, opts: &FlattenOptions) -> Result<LoadedTable, LoadError> {
        match self {
            Self::Flattened(table) => {
                let report = FlattenReport {
                    input_rows: table.len(),
                    trade_rows: table.len(),
                    ..FlattenReport::default()
                };
                Ok(LoadedTable {
                    table,
                    report,
                    from_cache: true,
                })
            }
            Self::Raw(raw) => {
                let (table, report) = flatten(&raw, opts)?;
                Ok(LoadedTable {
                    table,
                    report,
                    from_cache: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::flatten::MalformedPolicy;
    use std::fs;

    const RAW: &str = "Port_IDs,Trade_History\n\
        A,\"[{\"\"realizedProfit\"\": 10, \"\"quantity\"\": 100}]\"\n";

    fn opts() -> FlattenOptions {
        FlattenOptions {
            account_column: "Port_IDs".into(),
            history_column: "Trade_History".into(),
            on_malformed: MalformedPolicy::Skip,
        }
    }

    #[test]
    fn auto_without_cache_reads_raw() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("trades.csv");
        fs::write(&raw, RAW).unwrap();
        let cache = FlatCache::new(dir.path().join("flat.csv"));

        let source = TradeSource::resolve(SourceMode::Auto, &raw, &cache).unwrap();
        assert!(!source.is_flattened());
        let loaded = source.into_flat(&opts()).unwrap();
        assert!(!loaded.from_cache);
        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.table.cell(0, "Port_IDs"), Some("A"));
    }

    #[test]
    fn auto_prefers_cache() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("trades.csv");
        fs::write(&raw, RAW).unwrap();
        let cache = FlatCache::new(dir.path().join("flat.csv"));
        let mut flat = FlatTable::new(vec!["realizedProfit".into(), "quantity".into(), "Port_IDs".into()]);
        flat.push_row(vec!["1".into(), "2".into(), "Z".into()]);
        cache.write(&flat, Some(&raw)).unwrap();

        let loaded = TradeSource::resolve(SourceMode::Auto, &raw, &cache)
            .unwrap()
            .into_flat(&opts())
            .unwrap();
        assert!(loaded.from_cache);
        assert_eq!(loaded.table.cell(0, "Port_IDs"), Some("Z"));
        assert_eq!(loaded.report.trade_rows, 1);
    }

    #[test]
    fn raw_mode_ignores_cache() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("trades.csv");
        fs::write(&raw, RAW).unwrap();
        let cache = FlatCache::new(dir.path().join("flat.csv"));
        cache.write(&FlatTable::new(vec!["x".into()]), None).unwrap();

        let source = TradeSource::resolve(SourceMode::Raw, &raw, &cache).unwrap();
        assert!(!source.is_flattened());
    }

    #[test]
    fn nothing_on_disk_names_raw_path() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("trades.csv");
        let cache = FlatCache::new(dir.path().join("flat.csv"));
        match TradeSource::resolve(SourceMode::Auto, &raw, &cache) {
            Err(LoadError::MissingInput { path }) => assert_eq!(path, raw),
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn flattened_mode_requires_cache() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("trades.csv");
        fs::write(&raw, RAW).unwrap();
        let cache = FlatCache::new(dir.path().join("flat.csv"));
        assert!(matches!(
            TradeSource::resolve(SourceMode::Flattened, &raw, &cache),
            Err(LoadError::MissingInput { .. })
        ));
    }
}
