//! Test helpers for building metrics rows

use tradelens_core::AccountId;
use tradelens_runner::AccountMetrics;

/// A metrics row with the given score; other columns derived from it.
pub fn metric(account: &str, score: f64) -> AccountMetrics {
    AccountMetrics {
        account: AccountId::new(account),
        pnl: score * 100.0 - 20.0,
        total_investment: 1000.0,
        pnl_std: Some(12.5),
        win_positions: 3,
        total_positions: 5,
        roi: score * 10.0 - 2.0,
        sharpe_ratio: score * 4.0,
        mdd: 100.0,
        win_rate: 60.0,
        normalized_roi: score,
        normalized_sharpe: score,
        normalized_pnl: score,
        normalized_win_rate: score,
        mdd_score: 1.0 / 101.0,
        score,
    }
}

pub fn metrics(rows: &[(&str, f64)]) -> Vec<AccountMetrics> {
    rows.iter().map(|(a, s)| metric(a, *s)).collect()
}
