//! TUI panels for the viewer tabs
//!
//! - Ranking: score-ordered account table
//! - RoiHistogram: ROI distribution bars
//! - Scatter: Sharpe vs. ROI, win rate vs. PnL
//! - TopAccounts: top-N score bars
//! - Manifest: run summary

pub mod histogram;
pub mod manifest;
pub mod ranking;
pub mod scatter;
pub mod top_accounts;

pub use histogram::RoiHistogramPanel;
pub use manifest::ManifestPanel;
pub use ranking::RankingPanel;
pub use scatter::ScatterPanel;
pub use top_accounts::TopAccountsPanel;
