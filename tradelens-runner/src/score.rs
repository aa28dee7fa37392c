//! Min-max normalization and the weighted composite score.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Composite score weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub roi: f64,
    pub sharpe: f64,
    pub pnl: f64,
    pub win_rate: f64,
    /// Weight of `MDD_Score`, which is not normalized.
    pub drawdown: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            roi: 0.3,
            sharpe: 0.2,
            pnl: 0.2,
            win_rate: 0.2,
            drawdown: 0.1,
        }
    }
}

impl ScoreWeights {
    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("roi", self.roi),
            ("sharpe", self.sharpe),
            ("pnl", self.pnl),
            ("win_rate", self.win_rate),
            ("drawdown", self.drawdown),
        ]
    }

    pub fn composite(&self, inputs: &ScoreInputs) -> f64 {
        self.roi * inputs.normalized_roi
            + self.sharpe * inputs.normalized_sharpe
            + self.pnl * inputs.normalized_pnl
            + self.win_rate * inputs.normalized_win_rate
            + self.drawdown * inputs.mdd_score
    }
}

/// The five weighted terms of one account's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub normalized_roi: f64,
    pub normalized_sharpe: f64,
    pub normalized_pnl: f64,
    pub normalized_win_rate: f64,
    pub mdd_score: f64,
}

/// A metric column with zero range across the account population.
///
/// Normalization is undefined there; every account gets the fallback value.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("degenerate normalization of '{column}': every account has {value}, filled with {fill}")]
pub struct DegenerateNormalization {
    pub column: String,
    pub value: f64,
    pub fill: f64,
}

/// `1 / (1 + mdd)`.
pub fn mdd_score(mdd: f64) -> f64 {
    1.0 / (1.0 + mdd)
}

/// Min-max normalize `values` to [0, 1].
///
/// A zero-range column maps every entry to `fill` and returns the
/// condition alongside. An empty column normalizes to an empty column.
pub fn min_max_normalize(
    column: &str,
    values: &[f64],
    fill: f64,
) -> (Vec<f64>, Option<DegenerateNormalization>) {
    let Some(&first) = values.first() else {
        return (Vec::new(), None);
    };
    let (min, max) = values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    if !range.is_finite() || range <= 0.0 {
        let warning = DegenerateNormalization {
            column: column.to_string(),
            value: min,
            fill,
        };
        warn!(column, value = min, fill, "zero-range column, normalization falls back");
        return (vec![fill; values.len()], Some(warning));
    }

    let normalized = values
        .iter()
        .map(|v| ((v - min) / range).clamp(0.0, 1.0))
        .collect();
    (normalized, None)
}
