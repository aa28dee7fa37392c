//! Score-ordered ranking of accounts.

use crate::metrics::{AccountMetrics, MetricsTable};
use crate::score::DegenerateNormalization;

/// All accounts, best score first.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    entries: Vec<AccountMetrics>,
    warnings: Vec<DegenerateNormalization>,
}

impl Ranking {
    /// Sort descending by score. The sort is stable, so tied accounts keep
    /// their first-appearance order.
    pub fn new(table: MetricsTable) -> Self {
        let MetricsTable {
            accounts: mut entries,
            warnings,
        } = table;
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self { entries, warnings }
    }

    pub fn entries(&self) -> &[AccountMetrics] {
        &self.entries
    }

    /// The first `n` entries (fewer if there are fewer accounts).
    pub fn top(&self, n: usize) -> &[AccountMetrics] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn warnings(&self) -> &[DegenerateNormalization] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<AccountMetrics> {
        self.entries
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
