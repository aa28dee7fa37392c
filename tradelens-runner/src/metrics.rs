//! Per-account performance metrics.
//!
//! Aggregation (sum / std / counts per account) runs as a polars
//! `group_by_stable`, so accounts come out in order of first appearance.
//! The derived ratios are pure functions over the aggregates.

use std::collections::HashMap;

use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};
use tradelens_core::{AccountId, TradeRecord};

use crate::drawdown::{equity_drawdown, DrawdownMode};
use crate::score::{mdd_score, min_max_normalize, DegenerateNormalization, ScoreInputs, ScoreWeights};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("no trades to aggregate")]
    EmptyInput,
    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),
    #[error("aggregate column '{0}' is null for an account")]
    NullAggregate(&'static str),
}

/// Raw per-account statistics straight out of the group-by.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountAggregate {
    pub account: AccountId,
    pub pnl: f64,
    pub total_investment: f64,
    /// Sample standard deviation (ddof 1); `None` for single-trade accounts.
    pub pnl_std: Option<f64>,
    pub win_positions: u64,
    pub total_positions: u64,
}

/// One row of the ranking tables. Column names live in `export::METRIC_COLUMNS`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountMetrics {
    pub account: AccountId,
    pub pnl: f64,
    pub total_investment: f64,
    pub pnl_std: Option<f64>,
    pub win_positions: u64,
    pub total_positions: u64,
    pub roi: f64,
    pub sharpe_ratio: f64,
    /// The configured placeholder, or the equity drawdown in profit units.
    pub mdd: f64,
    pub win_rate: f64,
    pub normalized_roi: f64,
    pub normalized_sharpe: f64,
    pub normalized_pnl: f64,
    pub normalized_win_rate: f64,
    pub mdd_score: f64,
    pub score: f64,
}

impl AccountMetrics {
    pub fn score_inputs(&self) -> ScoreInputs {
        ScoreInputs {
            normalized_roi: self.normalized_roi,
            normalized_sharpe: self.normalized_sharpe,
            normalized_pnl: self.normalized_pnl,
            normalized_win_rate: self.normalized_win_rate,
            mdd_score: self.mdd_score,
        }
    }
}

/// Knobs for [`compute_metrics`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsOptions {
    pub weights: ScoreWeights,
    pub drawdown: DrawdownMode,
    pub placeholder_mdd: f64,
    pub degenerate_fill: f64,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            drawdown: DrawdownMode::Placeholder,
            placeholder_mdd: 100.0,
            degenerate_fill: 0.0,
        }
    }
}

/// Scored accounts in first-appearance order, plus normalization warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    pub accounts: Vec<AccountMetrics>,
    pub warnings: Vec<DegenerateNormalization>,
}

// ─── Aggregation ────────────────────────────────────────────────────

const ACCOUNT: &str = "account";
const PROFIT: &str = "profit";
const QUANTITY: &str = "quantity";

/// Group trades by account and compute the base statistics.
pub fn aggregate(records: &[TradeRecord]) -> Result<Vec<AccountAggregate>, MetricsError> {
    if records.is_empty() {
        return Err(MetricsError::EmptyInput);
    }

    let accounts: Vec<&str> = records.iter().map(|r| r.account.as_str()).collect();
    let profits: Vec<f64> = records.iter().map(|r| r.realized_profit).collect();
    let quantities: Vec<f64> = records.iter().map(|r| r.quantity).collect();
    let trades = df!(
        ACCOUNT => accounts,
        PROFIT => profits,
        QUANTITY => quantities
    )?;

    let grouped = trades
        .lazy()
        .group_by_stable([col(ACCOUNT)])
        .agg([
            col(PROFIT).sum().alias("pnl"),
            col(QUANTITY).sum().alias("total_investment"),
            col(PROFIT).std(1).alias("pnl_std"),
            col(PROFIT)
                .gt(lit(0.0))
                .sum()
                .cast(DataType::UInt64)
                .alias("win_positions"),
            col(PROFIT)
                .count()
                .cast(DataType::UInt64)
                .alias("total_positions"),
        ])
        .collect()?;

    let account_col = grouped.column(ACCOUNT)?.as_materialized_series().str()?;
    let pnl = grouped.column("pnl")?.as_materialized_series().f64()?;
    let investment = grouped.column("total_investment")?.as_materialized_series().f64()?;
    let std = grouped.column("pnl_std")?.as_materialized_series().f64()?;
    let wins = grouped.column("win_positions")?.as_materialized_series().u64()?;
    let total = grouped.column("total_positions")?.as_materialized_series().u64()?;

    (0..grouped.height())
        .map(|i| {
            Ok(AccountAggregate {
                account: AccountId::from(account_col.get(i).ok_or(MetricsError::NullAggregate(ACCOUNT))?),
                pnl: pnl.get(i).ok_or(MetricsError::NullAggregate("pnl"))?,
                total_investment: investment
                    .get(i)
                    .ok_or(MetricsError::NullAggregate("total_investment"))?,
                pnl_std: std.get(i).filter(|s| s.is_finite()),
                win_positions: wins.get(i).ok_or(MetricsError::NullAggregate("win_positions"))?,
                total_positions: total
                    .get(i)
                    .ok_or(MetricsError::NullAggregate("total_positions"))?,
            })
        })
        .collect()
}

// ─── Derived ratios ─────────────────────────────────────────────────

/// ROI in percent. Zero when nothing was invested.
pub fn roi(pnl: f64, total_investment: f64) -> f64 {
    if total_investment.abs() < 1e-15 {
        return 0.0;
    }
    pnl / total_investment * 100.0
}

/// PnL over its per-trade standard deviation. Zero when the deviation is
/// undefined (single trade) or zero.
pub fn sharpe_ratio(pnl: f64, pnl_std: Option<f64>) -> f64 {
    match pnl_std {
        Some(std) if std > 1e-15 => pnl / std,
        _ => 0.0,
    }
}

/// Win rate in percent.
pub fn win_rate(win_positions: u64, total_positions: u64) -> f64 {
    if total_positions == 0 {
        return 0.0;
    }
    win_positions as f64 / total_positions as f64 * 100.0
}

// ─── Full computation ───────────────────────────────────────────────

/// Aggregate, derive, normalize and score every account.
pub fn compute_metrics(
    records: &[TradeRecord],
    opts: &MetricsOptions,
) -> Result<MetricsTable, MetricsError> {
    let aggregates = aggregate(records)?;
    info!(trades = records.len(), accounts = aggregates.len(), "aggregated trades by account");

    let drawdowns: Vec<f64> = match opts.drawdown {
        DrawdownMode::Placeholder => vec![opts.placeholder_mdd; aggregates.len()],
        DrawdownMode::Equity => {
            let mut by_account: HashMap<&str, Vec<&TradeRecord>> = HashMap::new();
            for r in records {
                by_account.entry(r.account.as_str()).or_default().push(r);
            }
            aggregates
                .iter()
                .map(|a| {
                    by_account
                        .get(a.account.as_str())
                        .map(|trades| equity_drawdown(trades))
                        .unwrap_or(0.0)
                })
                .collect()
        }
    };

    let rois: Vec<f64> = aggregates.iter().map(|a| roi(a.pnl, a.total_investment)).collect();
    let sharpes: Vec<f64> = aggregates.iter().map(|a| sharpe_ratio(a.pnl, a.pnl_std)).collect();
    let pnls: Vec<f64> = aggregates.iter().map(|a| a.pnl).collect();
    let win_rates: Vec<f64> = aggregates
        .iter()
        .map(|a| win_rate(a.win_positions, a.total_positions))
        .collect();

    let fill = opts.degenerate_fill;
    let mut warnings = Vec::new();
    let mut normalize = |column: &str, values: &[f64]| {
        let (normalized, warning) = min_max_normalize(column, values, fill);
        warnings.extend(warning);
        normalized
    };
    let n_roi = normalize("ROI", &rois);
    let n_sharpe = normalize("Sharpe_Ratio", &sharpes);
    let n_pnl = normalize("PnL", &pnls);
    let n_win = normalize("Win_Rate", &win_rates);

    let accounts = aggregates
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            let mut m = AccountMetrics {
                account: a.account,
                pnl: a.pnl,
                total_investment: a.total_investment,
                pnl_std: a.pnl_std,
                win_positions: a.win_positions,
                total_positions: a.total_positions,
                roi: rois[i],
                sharpe_ratio: sharpes[i],
                mdd: drawdowns[i],
                win_rate: win_rates[i],
                normalized_roi: n_roi[i],
                normalized_sharpe: n_sharpe[i],
                normalized_pnl: n_pnl[i],
                normalized_win_rate: n_win[i],
                mdd_score: mdd_score(drawdowns[i]),
                score: 0.0,
            };
            m.score = opts.weights.composite(&m.score_inputs());
            debug!(account = %m.account, roi = m.roi, sharpe = m.sharpe_ratio, score = m.score, "scored account");
            m
        })
        .collect();

    Ok(MetricsTable { accounts, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Vec<TradeRecord> {
        vec![
            TradeRecord::new("A", 10.0, 100.0).with_row(0),
            TradeRecord::new("A", -5.0, 50.0).with_row(1),
            TradeRecord::new("B", 20.0, 200.0).with_row(2),
            TradeRecord::new("C", 0.0, 10.0).with_row(3),
        ]
    }

    // ── Aggregation ──

    #[test]
    fn aggregate_groups_in_first_appearance_order() {
        let aggs = aggregate(&scenario()).unwrap();
        let ids: Vec<&str> = aggs.iter().map(|a| a.account.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);

        let a = &aggs[0];
        assert_eq!(a.pnl, 5.0);
        assert_eq!(a.total_investment, 150.0);
        assert_eq!(a.win_positions, 1);
        assert_eq!(a.total_positions, 2);
        // std of [10, -5] with ddof 1 = 15 / sqrt(2)
        assert!((a.pnl_std.unwrap() - 15.0 / 2.0_f64.sqrt()).abs() < 1e-10);

        assert_eq!(aggs[1].pnl_std, None);
        assert_eq!(aggs[2].win_positions, 0);
    }

    #[test]
    fn interleaved_accounts_are_grouped() {
        let records = vec![
            TradeRecord::new("X", 1.0, 1.0),
            TradeRecord::new("Y", 2.0, 1.0),
            TradeRecord::new("X", 3.0, 1.0),
        ];
        let aggs = aggregate(&records).unwrap();
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].account.as_str(), "X");
        assert_eq!(aggs[0].pnl, 4.0);
        assert_eq!(aggs[0].total_positions, 2);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(aggregate(&[]), Err(MetricsError::EmptyInput)));
    }

    // ── Ratios ──

    #[test]
    fn roi_zero_investment_is_zero() {
        assert_eq!(roi(50.0, 0.0), 0.0);
        assert!((roi(5.0, 150.0) - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn sharpe_undefined_is_zero() {
        assert_eq!(sharpe_ratio(20.0, None), 0.0);
        assert_eq!(sharpe_ratio(20.0, Some(0.0)), 0.0);
        assert!((sharpe_ratio(5.0, Some(2.5)) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_account_has_zero_sharpe() {
        let records = vec![
            TradeRecord::new("Z", 4.0, 10.0),
            TradeRecord::new("Z", 4.0, 10.0),
        ];
        let aggs = aggregate(&records).unwrap();
        assert_eq!(sharpe_ratio(aggs[0].pnl, aggs[0].pnl_std), 0.0);
    }

    #[test]
    fn win_rate_bounds() {
        assert_eq!(win_rate(0, 5), 0.0);
        assert_eq!(win_rate(5, 5), 100.0);
        assert_eq!(win_rate(0, 0), 0.0);
    }

    // ── Scoring ──

    #[test]
    fn scenario_scores() {
        let table = compute_metrics(&scenario(), &MetricsOptions::default()).unwrap();
        assert!(table.warnings.is_empty());
        let by_id = |id: &str| {
            table
                .accounts
                .iter()
                .find(|m| m.account.as_str() == id)
                .unwrap()
                .clone()
        };
        let (a, b, c) = (by_id("A"), by_id("B"), by_id("C"));

        assert!((b.roi - 10.0).abs() < 1e-12);
        assert!(b.roi > a.roi && a.roi > c.roi);
        assert_eq!(a.win_rate, 50.0);
        assert_eq!(a.mdd, 100.0);
        assert_eq!(a.normalized_sharpe, 1.0);
        assert_eq!(b.normalized_sharpe, 0.0);

        let mdd = 1.0 / 101.0;
        assert!((b.score - (0.7 + 0.1 * mdd)).abs() < 1e-9);
        assert!((a.score - (0.1 + 0.2 + 0.05 + 0.1 + 0.1 * mdd)).abs() < 1e-9);
        assert!((c.score - 0.1 * mdd).abs() < 1e-9);
    }

    #[test]
    fn single_account_reports_degenerate_columns() {
        let records = vec![TradeRecord::new("solo", 3.0, 30.0)];
        let table = compute_metrics(&records, &MetricsOptions::default()).unwrap();
        let columns: Vec<&str> = table.warnings.iter().map(|w| w.column.as_str()).collect();
        assert_eq!(columns, vec!["ROI", "Sharpe_Ratio", "PnL", "Win_Rate"]);
        let m = &table.accounts[0];
        assert_eq!(m.normalized_roi, 0.0);
        assert!((m.score - 0.1 / 101.0).abs() < 1e-12);
    }

    #[test]
    fn equity_mode_uses_realized_drawdown() {
        let records = vec![
            TradeRecord::new("A", 10.0, 1.0).with_time(1),
            TradeRecord::new("A", -4.0, 1.0).with_time(2),
            TradeRecord::new("B", 1.0, 1.0).with_time(1),
        ];
        let opts = MetricsOptions {
            drawdown: DrawdownMode::Equity,
            ..MetricsOptions::default()
        };
        let table = compute_metrics(&records, &opts).unwrap();
        assert_eq!(table.accounts[0].mdd, 4.0);
        assert_eq!(table.accounts[0].mdd_score, 0.2);
        assert_eq!(table.accounts[1].mdd, 0.0);
        assert_eq!(table.accounts[1].mdd_score, 1.0);
    }
}
