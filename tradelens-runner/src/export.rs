//! Output artifacts: ranking CSVs and the run manifest.
//!
//! The ranking CSV has the account identifier first (under the configured
//! account column name), then the metric columns in [`METRIC_COLUMNS`]
//! order. `PnL_Std` is empty for single-trade accounts.
//!
//! The manifest carries a `schema_version`; newer versions are rejected on
//! load.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tradelens_core::{AccountId, SkippedRow};

use crate::drawdown::DrawdownMode;
use crate::metrics::AccountMetrics;
use crate::score::DegenerateNormalization;

pub const SCHEMA_VERSION: u32 = 1;

pub const METRIC_COLUMNS: [&str; 15] = [
    "PnL",
    "Total_Investment",
    "PnL_Std",
    "Win_Positions",
    "Total_Positions",
    "ROI",
    "Sharpe_Ratio",
    "MDD",
    "Win_Rate",
    "Normalized_ROI",
    "Normalized_Sharpe",
    "Normalized_PnL",
    "Normalized_Win_Rate",
    "MDD_Score",
    "Score",
];

// ─── Ranking CSV ────────────────────────────────────────────────────

pub fn metrics_to_writer<W: Write>(
    entries: &[AccountMetrics],
    account_header: &str,
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(METRIC_COLUMNS.len() + 1);
    header.push(account_header);
    header.extend(METRIC_COLUMNS);
    wtr.write_record(&header)?;

    for m in entries {
        wtr.write_record([
            m.account.as_str().to_string(),
            m.pnl.to_string(),
            m.total_investment.to_string(),
            m.pnl_std.map(|s| s.to_string()).unwrap_or_default(),
            m.win_positions.to_string(),
            m.total_positions.to_string(),
            m.roi.to_string(),
            m.sharpe_ratio.to_string(),
            m.mdd.to_string(),
            m.win_rate.to_string(),
            m.normalized_roi.to_string(),
            m.normalized_sharpe.to_string(),
            m.normalized_pnl.to_string(),
            m.normalized_win_rate.to_string(),
            m.mdd_score.to_string(),
            m.score.to_string(),
        ])?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

pub fn write_metrics_csv(path: &Path, entries: &[AccountMetrics], account_header: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    metrics_to_writer(entries, account_header, file)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Read a ranking CSV back. The first column is taken as the account
/// identifier whatever its header.
pub fn read_metrics_csv(path: &Path) -> Result<Vec<AccountMetrics>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    metrics_from_reader(file).with_context(|| format!("failed to read {}", path.display()))
}

pub fn metrics_from_reader<R: Read>(reader: R) -> Result<Vec<AccountMetrics>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        bail!("metrics file has no header");
    }

    let mut idx = [0usize; 15];
    for (slot, name) in idx.iter_mut().zip(METRIC_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("missing column '{name}'"))?;
    }

    let mut out = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let float = |i: usize| -> Result<f64> {
            let cell = record.get(idx[i]).unwrap_or("").trim();
            cell.parse::<f64>()
                .with_context(|| format!("row {}: '{}' is not a number: {cell:?}", line + 1, METRIC_COLUMNS[i]))
        };
        let count = |i: usize| -> Result<u64> {
            let cell = record.get(idx[i]).unwrap_or("").trim();
            cell.parse::<u64>()
                .with_context(|| format!("row {}: '{}' is not a count: {cell:?}", line + 1, METRIC_COLUMNS[i]))
        };
        let std_cell = record.get(idx[2]).unwrap_or("").trim();

        out.push(AccountMetrics {
            account: AccountId::from(record.get(0).unwrap_or("")),
            pnl: float(0)?,
            total_investment: float(1)?,
            pnl_std: if std_cell.is_empty() { None } else { Some(float(2)?) },
            win_positions: count(3)?,
            total_positions: count(4)?,
            roi: float(5)?,
            sharpe_ratio: float(6)?,
            mdd: float(7)?,
            win_rate: float(8)?,
            normalized_roi: float(9)?,
            normalized_sharpe: float(10)?,
            normalized_pnl: float(11)?,
            normalized_win_rate: float(12)?,
            mdd_score: float(13)?,
            score: float(14)?,
        });
    }
    Ok(out)
}

// ─── Run manifest ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: String,
    pub config_fingerprint: String,
    pub input: PathBuf,
    pub from_cache: bool,
    pub raw_rows: usize,
    pub dropped_empty_history: usize,
    /// Raw rows whose trade history could not be parsed.
    pub skipped_rows: Vec<SkippedRow>,
    pub trade_rows: usize,
    /// Flat rows with an unusable account, profit or quantity.
    pub skipped_trades: Vec<SkippedRow>,
    pub accounts: usize,
    pub drawdown_mode: DrawdownMode,
    pub warnings: Vec<DegenerateNormalization>,
    pub outputs: Vec<PathBuf>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).context("failed to serialize run manifest")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: RunManifest =
        serde_json::from_str(&json).context("failed to deserialize run manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}
