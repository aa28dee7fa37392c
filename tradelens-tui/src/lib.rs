//! TradeLens TUI - terminal viewer for account rankings
//!
//! Reads `account_metrics.csv` (and `run_manifest.json` when present) and
//! provides:
//! - The score-ordered ranking table
//! - The four report charts (ROI histogram, two scatters, top-N bars)
//! - The run manifest

pub mod app;
pub mod navigation;
pub mod panels;
pub mod theme;
pub mod ui;

pub use app::{App, View};
pub use navigation::handle_key_event;
pub use theme::Theme;

#[cfg(test)]
mod test_helpers;
