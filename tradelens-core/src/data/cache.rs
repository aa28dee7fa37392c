//! Flattened-table cache: a CSV next to a JSON metadata sidecar.
//!
//! Layout: `{path}` holds the flat table, `{path}.meta.json` the sidecar
//! with the BLAKE3 hash of the raw input it was built from.
//!
//! Writes are atomic (write to `.tmp`, rename into place).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::LoadError;
use super::table::FlatTable;

/// Metadata sidecar for a cached flat table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// BLAKE3 hash of the raw CSV the cache was built from.
    pub source_hash: Option<String>,
    pub source_path: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub created_at: NaiveDateTime,
}

/// Whether a cache still reflects its raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFreshness {
    Fresh,
    /// The raw input hash differs from the one recorded at write time.
    Stale,
    /// No sidecar, no recorded hash, or no raw input to compare against.
    Unknown,
}

pub struct FlatCache {
    path: PathBuf,
}

impl FlatCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".meta.json");
        PathBuf::from(name)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<FlatTable, LoadError> {
        let table = FlatTable::read_csv(&self.path)?;
        info!(
            path = %self.path.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "loaded flattened trades from cache"
        );
        Ok(table)
    }

    /// Write the table and its sidecar.
    pub fn write(&self, table: &FlatTable, source: Option<&Path>) -> Result<CacheMeta, LoadError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LoadError::io(parent, e))?;
        }

        let source_hash = match source {
            Some(p) => Some(hash_file(p)?),
            None => None,
        };

        let mut tmp_name = self.path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        table.write_csv(&tmp_path)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            LoadError::Cache(format!("atomic rename failed: {e}"))
        })?;

        let meta = CacheMeta {
            source_hash,
            source_path: source.map(|p| p.display().to_string()),
            rows: table.len(),
            columns: table.columns().len(),
            created_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| LoadError::Cache(format!("meta serialization: {e}")))?;
        let meta_path = self.meta_path();
        fs::write(&meta_path, meta_json).map_err(|e| LoadError::io(&meta_path, e))?;

        info!(path = %self.path.display(), rows = meta.rows, "wrote flattened trade cache");
        Ok(meta)
    }

    pub fn meta(&self) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Compare the recorded source hash with the current raw input.
    pub fn freshness(&self, raw: &Path) -> CacheFreshness {
        let Some(recorded) = self.meta().and_then(|m| m.source_hash) else {
            return CacheFreshness::Unknown;
        };
        match hash_file(raw) {
            Ok(current) if current == recorded => CacheFreshness::Fresh,
            Ok(_) => CacheFreshness::Stale,
            Err(_) => CacheFreshness::Unknown,
        }
    }

    /// Remove the cache and its sidecar. Returns whether anything was removed.
    pub fn clear(&self) -> Result<bool, LoadError> {
        let mut removed = false;
        for path in [self.path.clone(), self.meta_path()] {
            match fs::remove_file(&path) {
                Ok(()) => removed = true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(LoadError::io(path, e)),
            }
        }
        if removed {
            warn!(path = %self.path.display(), "cleared flattened trade cache");
        }
        Ok(removed)
    }
}

/// BLAKE3 hash of a file's bytes, hex encoded.
pub fn hash_file(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|e| LoadError::io(path, e))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FlatTable {
        let mut t = FlatTable::new(vec!["realizedProfit".into(), "Port_IDs".into()]);
        t.push_row(vec!["1.5".into(), "A".into()]);
        t
    }

    #[test]
    fn meta_path_appends_suffix() {
        let cache = FlatCache::new("out/flattened_trades.csv");
        assert_eq!(
            cache.meta_path(),
            PathBuf::from("out/flattened_trades.csv.meta.json")
        );
    }

    #[test]
    fn write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("trades.csv");
        fs::write(&raw, "Port_IDs,Trade_History\nA,[]\n").unwrap();

        let cache = FlatCache::new(dir.path().join("flat.csv"));
        assert!(!cache.exists());
        let meta = cache.write(&table(), Some(&raw)).unwrap();
        assert!(cache.exists());
        assert_eq!(meta.rows, 1);
        assert_eq!(meta.columns, 2);
        assert_eq!(cache.meta().unwrap().source_hash, meta.source_hash);
        assert_eq!(cache.load().unwrap(), table());
        assert_eq!(cache.freshness(&raw), CacheFreshness::Fresh);
    }

    #[test]
    fn changed_raw_input_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("trades.csv");
        fs::write(&raw, "Port_IDs,Trade_History\nA,[]\n").unwrap();
        let cache = FlatCache::new(dir.path().join("flat.csv"));
        cache.write(&table(), Some(&raw)).unwrap();

        fs::write(&raw, "Port_IDs,Trade_History\nB,[]\n").unwrap();
        assert_eq!(cache.freshness(&raw), CacheFreshness::Stale);
    }

    #[test]
    fn no_sidecar_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FlatCache::new(dir.path().join("flat.csv"));
        cache.write(&table(), None).unwrap();
        assert_eq!(
            cache.freshness(&dir.path().join("trades.csv")),
            CacheFreshness::Unknown
        );
    }

    #[test]
    fn clear_removes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FlatCache::new(dir.path().join("flat.csv"));
        cache.write(&table(), None).unwrap();
        assert!(cache.clear().unwrap());
        assert!(!cache.exists());
        assert!(!cache.meta_path().exists());
        assert!(!cache.clear().unwrap());
    }

    #[test]
    fn load_missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FlatCache::new(dir.path().join("absent.csv"));
        assert!(matches!(cache.load(), Err(LoadError::MissingInput { .. })));
    }
}
