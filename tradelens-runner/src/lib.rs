//! TradeLens Runner: metrics engine, scoring, ranking and reporting.
//!
//! This crate builds on `tradelens-core` to provide:
//! - TOML analysis configuration with validation and fingerprinting
//! - Per-account aggregation (polars group-by) and derived ratios
//! - Min-max normalization and the weighted composite score
//! - Score ranking with top-N selection
//! - CSV ranking tables, the JSON run manifest, and SVG charts
//! - A deterministic synthetic export generator
//! - The end-to-end analysis pipeline

pub mod charts;
pub mod config;
pub mod drawdown;
pub mod export;
pub mod metrics;
pub mod pipeline;
pub mod ranking;
pub mod score;
pub mod synthetic;

pub use charts::{histogram, render_charts, top_by_score, ChartKind, HistogramBin};
pub use config::{AnalysisConfig, ConfigError};
pub use drawdown::DrawdownMode;
pub use export::{read_manifest, read_metrics_csv, write_metrics_csv, RunManifest, METRIC_COLUMNS};
pub use metrics::{compute_metrics, AccountMetrics, MetricsError, MetricsOptions, MetricsTable};
pub use pipeline::{analyze, run_analysis, write_outputs, Analysis, AnalysisOutcome, PipelineError};
pub use ranking::Ranking;
pub use score::{DegenerateNormalization, ScoreWeights};
pub use synthetic::SyntheticSpec;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn account_metrics_is_send_sync() {
        assert_send::<AccountMetrics>();
        assert_sync::<AccountMetrics>();
    }

    #[test]
    fn ranking_is_send_sync() {
        assert_send::<Ranking>();
        assert_sync::<Ranking>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
        assert_send::<MetricsError>();
        assert_sync::<MetricsError>();
    }
}
