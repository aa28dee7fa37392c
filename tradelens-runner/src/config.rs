//! Analysis configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! standard run: `trades.csv` in, `account_metrics.csv` and
//! `top_20_accounts.csv` out, placeholder drawdown, 30-bin ROI histogram.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradelens_core::{FlattenOptions, MalformedPolicy, SourceMode, TradeColumns};

use crate::drawdown::DrawdownMode;
use crate::metrics::MetricsOptions;
use crate::score::ScoreWeights;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub paths: PathsConfig,
    pub columns: TradeColumns,
    pub loader: LoaderConfig,
    pub scoring: ScoringConfig,
    pub drawdown: DrawdownConfig,
    pub charts: ChartsConfig,
}

/// Input and output locations. Relative output names resolve against
/// `output_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub cache: PathBuf,
    pub output_dir: PathBuf,
    pub metrics_file: PathBuf,
    pub top_file: PathBuf,
    pub charts_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("trades.csv"),
            cache: PathBuf::from("flattened_trades.csv"),
            output_dir: PathBuf::from("."),
            metrics_file: PathBuf::from("account_metrics.csv"),
            top_file: PathBuf::from("top_20_accounts.csv"),
            charts_dir: PathBuf::from("."),
        }
    }
}

impl PathsConfig {
    pub fn metrics_path(&self) -> PathBuf {
        self.output_dir.join(&self.metrics_file)
    }

    pub fn top_path(&self) -> PathBuf {
        self.output_dir.join(&self.top_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join("run_manifest.json")
    }

    pub fn charts_path(&self) -> PathBuf {
        self.output_dir.join(&self.charts_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join("tradelens.log")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub on_malformed: MalformedPolicy,
    pub source: SourceMode,
    /// Write the flattened table to the cache after flattening raw input.
    pub write_cache: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            on_malformed: MalformedPolicy::Skip,
            source: SourceMode::Auto,
            write_cache: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    pub top_n: usize,
    /// Normalized value assigned to every account when a column has zero range.
    pub degenerate_fill: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            top_n: 20,
            degenerate_fill: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawdownConfig {
    pub mode: DrawdownMode,
    pub placeholder: f64,
}

impl Default for DrawdownConfig {
    fn default() -> Self {
        Self {
            mode: DrawdownMode::Placeholder,
            placeholder: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub enabled: bool,
    pub histogram_bins: usize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            histogram_bins: 30,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(field) = self.columns.first_empty() {
            return Err(ConfigError::Invalid(format!("columns.{field} must not be empty")));
        }
        let w = &self.scoring.weights;
        for (name, value) in w.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "scoring.weights.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.scoring.top_n == 0 {
            return Err(ConfigError::Invalid("scoring.top_n must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.scoring.degenerate_fill) {
            return Err(ConfigError::Invalid(format!(
                "scoring.degenerate_fill must be in [0, 1], got {}",
                self.scoring.degenerate_fill
            )));
        }
        if !self.drawdown.placeholder.is_finite() || self.drawdown.placeholder < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "drawdown.placeholder must be finite and non-negative, got {}",
                self.drawdown.placeholder
            )));
        }
        if self.charts.histogram_bins == 0 {
            return Err(ConfigError::Invalid("charts.histogram_bins must be at least 1".into()));
        }
        Ok(())
    }

    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            account_column: self.columns.account.clone(),
            history_column: self.columns.history.clone(),
            on_malformed: self.loader.on_malformed,
        }
    }

    pub fn metrics_options(&self) -> MetricsOptions {
        MetricsOptions {
            weights: self.scoring.weights,
            drawdown: self.drawdown.mode,
            placeholder_mdd: self.drawdown.placeholder,
            degenerate_fill: self.scoring.degenerate_fill,
        }
    }

    /// Content hash of the effective configuration.
    pub fn fingerprint(&self) -> String {
        // Serializing plain data structs to JSON cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.scoring.top_n, 20);
        assert_eq!(config.charts.histogram_bins, 30);
        assert_eq!(config.drawdown.placeholder, 100.0);
        assert_eq!(config.paths.metrics_path(), PathBuf::from("./account_metrics.csv"));
    }

    #[test]
    fn sections_override_defaults() {
        let config = AnalysisConfig::from_toml(
            r#"
            [paths]
            input = "data/raw.csv"
            output_dir = "out"

            [columns]
            account = "account_id"

            [loader]
            on_malformed = "fail"
            source = "raw"

            [scoring]
            top_n = 5
            weights = { roi = 0.5, sharpe = 0.1, pnl = 0.1, win_rate = 0.2, drawdown = 0.1 }

            [drawdown]
            mode = "equity"
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.input, PathBuf::from("data/raw.csv"));
        assert_eq!(config.paths.top_path(), PathBuf::from("out/top_20_accounts.csv"));
        assert_eq!(config.columns.account, "account_id");
        assert_eq!(config.columns.history, "Trade_History");
        assert_eq!(config.loader.on_malformed, MalformedPolicy::Fail);
        assert_eq!(config.loader.source, SourceMode::Raw);
        assert_eq!(config.scoring.top_n, 5);
        assert_eq!(config.scoring.weights.roi, 0.5);
        assert_eq!(config.drawdown.mode, DrawdownMode::Equity);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for toml in [
            "[scoring]\ntop_n = 0",
            "[scoring]\ndegenerate_fill = 2.0",
            "[scoring.weights]\nroi = -1.0",
            "[charts]\nhistogram_bins = 0",
            "[drawdown]\nplaceholder = -5.0",
            "[columns]\nprofit = \"\"",
        ] {
            let err = AnalysisConfig::from_toml(toml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{toml}: {err}");
        }
    }

    #[test]
    fn unknown_enum_value_is_a_parse_error() {
        let err = AnalysisConfig::from_toml("[loader]\non_malformed = \"ignore\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = AnalysisConfig::default();
        let mut b = AnalysisConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.scoring.top_n = 10;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AnalysisConfig::from_file(Path::new("/no/such/tradelens.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
