//! Plain-text tables printed by the CLI commands.

use std::fmt::Write as _;

use tradelens_core::{CacheFreshness, CacheMeta, DatasetSummary};
use tradelens_runner::{AccountMetrics, AnalysisOutcome};

/// Cell text wider than this is cut in the `inspect` preview.
const PREVIEW_WIDTH: usize = 40;

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

/// Ranking table: rank, account, score and the headline metrics.
pub fn ranking_table(entries: &[AccountMetrics]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<22} {:>8} {:>10} {:>9} {:>12} {:>7} {:>7}",
        "#", "Account", "Score", "ROI %", "Sharpe", "PnL", "Win %", "Trades"
    );
    let _ = writeln!(out, "{}", "-".repeat(88));
    for (i, m) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<22} {:>8.4} {:>10.2} {:>9.2} {:>12.2} {:>7.1} {:>7}",
            i + 1,
            truncate(m.account.as_str(), 22),
            m.score,
            m.roi,
            m.sharpe_ratio,
            m.pnl,
            m.win_rate,
            m.total_positions
        );
    }
    out
}

/// Run summary followed by the top-N ranking.
pub fn analysis_summary(outcome: &AnalysisOutcome, top_n: usize) -> String {
    let manifest = &outcome.manifest;
    let ranking = &outcome.analysis.ranking;
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "=== TradeLens Analysis ===");
    let _ = writeln!(
        out,
        "Input:          {} ({})",
        manifest.input.display(),
        if manifest.from_cache { "flattened cache" } else { "raw export" }
    );
    let _ = writeln!(
        out,
        "Raw rows:       {} ({} empty history, {} malformed)",
        manifest.raw_rows,
        manifest.dropped_empty_history,
        manifest.skipped_rows.len()
    );
    let _ = writeln!(
        out,
        "Trades:         {} ({} unusable)",
        manifest.trade_rows,
        manifest.skipped_trades.len()
    );
    let _ = writeln!(out, "Accounts:       {}", manifest.accounts);
    let _ = writeln!(out, "Drawdown:       {}", manifest.drawdown_mode);
    let _ = writeln!(out);

    let shown = ranking.top(top_n);
    let _ = writeln!(out, "--- Top {} by Score ---", shown.len());
    out.push_str(&ranking_table(shown));

    if !manifest.warnings.is_empty() {
        let _ = writeln!(out);
        for w in &manifest.warnings {
            let _ = writeln!(out, "WARNING: {w}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Outputs:");
    for path in &manifest.outputs {
        let _ = writeln!(out, "  {}", path.display());
    }
    out
}

/// Shape, per-column fill and the first rows of a raw export.
pub fn dataset_summary(summary: &DatasetSummary, headers: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dataset:        {}", summary.label);
    let _ = writeln!(out, "Rows:           {}", summary.total_rows);
    let _ = writeln!(
        out,
        "Kept:           {} ({} dropped for missing trade history)",
        summary.total_rows - summary.dropped_missing_history,
        summary.dropped_missing_history
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<28} {:>10} {:>10}", "Column", "Non-empty", "Missing");
    let _ = writeln!(out, "{}", "-".repeat(50));
    for c in &summary.columns {
        let _ = writeln!(out, "{:<28} {:>10} {:>10}", truncate(&c.name, 28), c.non_empty, c.missing);
    }

    if !summary.head.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- First {} rows ---", summary.head.len());
        for row in &summary.head {
            let cells: Vec<String> = headers
                .iter()
                .zip(row)
                .map(|(h, v)| format!("{h}={}", truncate(v, PREVIEW_WIDTH)))
                .collect();
            let _ = writeln!(out, "  {}", cells.join("  "));
        }
    }
    out
}

/// `cache status` report.
pub fn cache_status(path: &std::path::Path, exists: bool, meta: Option<&CacheMeta>, freshness: CacheFreshness) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cache:          {}", path.display());
    if !exists {
        let _ = writeln!(out, "Status:         not present");
        return out;
    }
    let Some(meta) = meta else {
        let _ = writeln!(out, "Status:         present, no metadata sidecar");
        return out;
    };
    let _ = writeln!(out, "Rows:           {}", meta.rows);
    let _ = writeln!(out, "Columns:        {}", meta.columns);
    let _ = writeln!(out, "Created:        {}", meta.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(source) = &meta.source_path {
        let _ = writeln!(out, "Source:         {source}");
    }
    if let Some(hash) = &meta.source_hash {
        let _ = writeln!(out, "Source hash:    {}", &hash[..hash.len().min(16)]);
    }
    let status = match freshness {
        CacheFreshness::Fresh => "up to date with raw input",
        CacheFreshness::Stale => "STALE: raw input changed since the cache was written",
        CacheFreshness::Unknown => "unknown (no raw input or no recorded hash)",
    };
    let _ = writeln!(out, "Status:         {status}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradelens_core::{AccountId, ColumnSummary};

    fn metric(account: &str, score: f64) -> AccountMetrics {
        AccountMetrics {
            account: AccountId::new(account),
            pnl: 20.0,
            total_investment: 200.0,
            pnl_std: None,
            win_positions: 1,
            total_positions: 1,
            roi: 10.0,
            sharpe_ratio: 0.0,
            mdd: 100.0,
            win_rate: 100.0,
            normalized_roi: 1.0,
            normalized_sharpe: 0.0,
            normalized_pnl: 1.0,
            normalized_win_rate: 1.0,
            mdd_score: 1.0 / 101.0,
            score,
        }
    }

    #[test]
    fn ranking_table_lists_rows_in_order() {
        let table = ranking_table(&[metric("B", 0.70099), metric("A", 0.45099)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Account"));
        assert!(lines[2].contains(" B ") && lines[2].contains("0.7010"));
        assert!(lines[3].starts_with("   2  A"));
    }

    #[test]
    fn long_accounts_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn dataset_summary_shows_fill_and_head() {
        let summary = DatasetSummary {
            label: "trades.csv".into(),
            total_rows: 3,
            dropped_missing_history: 1,
            columns: vec![
                ColumnSummary { name: "Port_IDs".into(), non_empty: 2, missing: 0 },
                ColumnSummary { name: "Trade_History".into(), non_empty: 2, missing: 0 },
            ],
            head: vec![vec!["1".into(), "[]".into()]],
        };
        let headers = vec!["Port_IDs".to_string(), "Trade_History".to_string()];
        let text = dataset_summary(&summary, &headers);
        assert!(text.contains("Kept:           2 (1 dropped"));
        assert!(text.contains("Trade_History"));
        assert!(text.contains("Port_IDs=1  Trade_History=[]"));
    }

    #[test]
    fn cache_status_variants() {
        let path = std::path::Path::new("flattened_trades.csv");
        assert!(cache_status(path, false, None, CacheFreshness::Unknown).contains("not present"));
        assert!(cache_status(path, true, None, CacheFreshness::Unknown).contains("no metadata"));

        let meta = CacheMeta {
            source_hash: Some("0123456789abcdef0123".into()),
            source_path: Some("trades.csv".into()),
            rows: 4,
            columns: 6,
            created_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
        };
        let text = cache_status(path, true, Some(&meta), CacheFreshness::Stale);
        assert!(text.contains("Rows:           4"));
        assert!(text.contains("0123456789abcdef"));
        assert!(!text.contains("0123456789abcdef0123"));
        assert!(text.contains("STALE"));
        assert!(text.contains("2026-01-02 03:04:05"));
    }
}
