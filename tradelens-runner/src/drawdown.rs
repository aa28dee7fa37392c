//! Per-account maximum drawdown.

use serde::{Deserialize, Serialize};
use tradelens_core::TradeRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawdownMode {
    /// Same constant for every account.
    #[default]
    Placeholder,
    /// Largest peak-to-trough decline of cumulative realized PnL.
    Equity,
}

impl std::fmt::Display for DrawdownMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placeholder => write!(f, "placeholder"),
            Self::Equity => write!(f, "equity"),
        }
    }
}

/// Maximum drawdown of the cumulative PnL of `trades`, in profit units.
///
/// Trades are replayed in timestamp order; untimed trades keep their table
/// order after the timed ones. Equity starts at zero, so an account whose
/// first trade loses has a drawdown from zero.
pub fn equity_drawdown(trades: &[&TradeRecord]) -> f64 {
    let mut ordered: Vec<&TradeRecord> = trades.to_vec();
    ordered.sort_by_key(|t| (t.time.is_none(), t.time, t.row));

    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for trade in ordered {
        equity += trade.realized_profit;
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }
    max_dd
}
