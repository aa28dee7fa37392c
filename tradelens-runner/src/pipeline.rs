//! The end-to-end run: load → metrics → rank → write outputs.
//!
//! The caller resolves the [`TradeSource`]; nothing here decides between
//! cache and raw input by looking at the filesystem.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, info_span, warn};
use tradelens_core::{FlatCache, FlattenReport, LoadError, SkippedRow, TradeSource};

use crate::charts::render_charts;
use crate::config::AnalysisConfig;
use crate::export::{write_manifest, write_metrics_csv, RunManifest, SCHEMA_VERSION};
use crate::metrics::{compute_metrics, MetricsError};
use crate::ranking::Ranking;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),
    #[error("output error: {0:#}")]
    Output(anyhow::Error),
}

/// Everything computed by a run, before anything is written.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub ranking: Ranking,
    pub load_report: FlattenReport,
    pub from_cache: bool,
    /// Flat rows dropped while projecting onto typed trade records.
    pub skipped_trades: Vec<SkippedRow>,
    pub trade_rows: usize,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: Analysis,
    pub manifest: RunManifest,
}

/// Load, aggregate, score and rank. The only write is the flattened cache
/// (when the input was raw and caching is on); failing to write it is
/// logged and the run continues.
pub fn analyze(source: TradeSource, config: &AnalysisConfig) -> Result<Analysis, PipelineError> {
    let loaded = {
        let _span = info_span!("load").entered();
        let loaded = source.into_flat(&config.flatten_options())?;
        if !loaded.from_cache && config.loader.write_cache {
            let cache = FlatCache::new(&config.paths.cache);
            if let Err(e) = cache.write(&loaded.table, Some(&config.paths.input)) {
                warn!(error = %e, path = %cache.path().display(), "could not write flattened trade cache");
            }
        }
        loaded
    };

    let _span = info_span!("metrics").entered();
    let (records, skipped_trades) = loaded
        .table
        .trade_records(&config.columns, config.loader.on_malformed)?;
    if !skipped_trades.is_empty() {
        warn!(skipped = skipped_trades.len(), "flat rows without usable profit or quantity");
    }

    let table = compute_metrics(&records, &config.metrics_options())?;
    let ranking = Ranking::new(table);
    if let Some(best) = ranking.entries().first() {
        info!(accounts = ranking.len(), best = %best.account, score = best.score, "ranked accounts");
    }

    Ok(Analysis {
        ranking,
        load_report: loaded.report,
        from_cache: loaded.from_cache,
        skipped_trades,
        trade_rows: loaded.table.len(),
    })
}

/// Write both ranking tables, the charts (when enabled) and the manifest.
pub fn write_outputs(analysis: &Analysis, config: &AnalysisConfig) -> Result<RunManifest, PipelineError> {
    let _span = info_span!("report").entered();
    let paths = &config.paths;
    let account_header = &config.columns.account;

    let metrics_path = paths.metrics_path();
    let top_path = paths.top_path();
    write_metrics_csv(&metrics_path, analysis.ranking.entries(), account_header)
        .map_err(PipelineError::Output)?;
    write_metrics_csv(&top_path, analysis.ranking.top(config.scoring.top_n), account_header)
        .map_err(PipelineError::Output)?;
    info!(path = %metrics_path.display(), rows = analysis.ranking.len(), "wrote account metrics");

    let mut outputs: Vec<PathBuf> = vec![metrics_path, top_path];
    if config.charts.enabled {
        let charts = render_charts(
            analysis.ranking.entries(),
            &paths.charts_path(),
            config.charts.histogram_bins,
            config.scoring.top_n,
        )
        .map_err(PipelineError::Output)?;
        outputs.extend(charts);
    }

    let manifest_path = paths.manifest_path();
    outputs.push(manifest_path.clone());
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        generated_at: chrono::Utc::now().to_rfc3339(),
        config_fingerprint: config.fingerprint(),
        input: if analysis.from_cache {
            paths.cache.clone()
        } else {
            paths.input.clone()
        },
        from_cache: analysis.from_cache,
        raw_rows: analysis.load_report.input_rows,
        dropped_empty_history: analysis.load_report.dropped_empty,
        skipped_rows: analysis.load_report.skipped.clone(),
        trade_rows: analysis.trade_rows,
        skipped_trades: analysis.skipped_trades.clone(),
        accounts: analysis.ranking.len(),
        drawdown_mode: config.drawdown.mode,
        warnings: analysis.ranking.warnings().to_vec(),
        outputs,
    };
    write_manifest(&manifest_path, &manifest).map_err(PipelineError::Output)?;
    Ok(manifest)
}

/// [`analyze`] then [`write_outputs`], inside one `run` span.
pub fn run_analysis(source: TradeSource, config: &AnalysisConfig) -> Result<AnalysisOutcome, PipelineError> {
    let fingerprint = config.fingerprint();
    let _span = info_span!("run", config = &fingerprint[..12]).entered();
    info!(
        source = if source.is_flattened() { "cache" } else { "raw" },
        drawdown = %config.drawdown.mode,
        "starting analysis"
    );

    let analysis = analyze(source, config)?;
    let manifest = write_outputs(&analysis, config)?;
    for warning in analysis.ranking.warnings() {
        warn!("{warning}");
    }
    info!(
        accounts = manifest.accounts,
        outputs = manifest.outputs.len(),
        "analysis complete"
    );
    Ok(AnalysisOutcome { analysis, manifest })
}
