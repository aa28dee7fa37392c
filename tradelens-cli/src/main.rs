//! TradeLens CLI: analysis, inspection, charts and cache management.
//!
//! Commands:
//! - `analyze`: flatten trade histories, score and rank accounts, write tables and charts
//! - `inspect`: row counts, missing values and a preview of a raw export
//! - `charts`: re-render the four charts from an existing metrics table
//! - `generate`: write a deterministic synthetic raw export
//! - `cache status`: report on the flattened-trade cache
//! - `cache clear`: remove the cache and its metadata sidecar

mod logging;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tradelens_core::{FlatCache, MalformedPolicy, RawTable, SourceMode, TradeSource};
use tradelens_runner::synthetic::{self, SyntheticSpec};
use tradelens_runner::{read_metrics_csv, render_charts, run_analysis, AnalysisConfig, DrawdownMode};

use crate::logging::with_logging;

#[derive(Parser)]
#[command(
    name = "tradelens",
    about = "TradeLens CLI: rank copy-trading accounts from their trade history"
)]
struct Cli {
    /// Debug-level logging.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten, score and rank accounts; write the ranking tables and charts.
    Analyze(AnalyzeArgs),
    /// Summarize a raw trade-history export.
    Inspect {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Raw export to inspect. Defaults to the configured input.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Number of preview rows.
        #[arg(long, default_value_t = 5)]
        head: usize,
    },
    /// Render the four charts from an existing metrics table.
    Charts {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Metrics table. Defaults to the configured metrics file.
        #[arg(long)]
        metrics: Option<PathBuf>,

        /// Directory for the SVG files. Defaults to the configured charts directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write a synthetic raw export.
    Generate {
        /// Output CSV.
        #[arg(long, default_value = "trades.csv")]
        output: PathBuf,

        /// Number of accounts.
        #[arg(long, default_value_t = 150)]
        accounts: usize,

        /// Most trades per account.
        #[arg(long, default_value_t = 40)]
        max_trades: usize,

        /// Fraction of accounts with an empty history.
        #[arg(long, default_value_t = 0.05)]
        empty_rate: f64,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Flattened-trade cache management.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(clap::Args, Debug, Default)]
struct AnalyzeArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raw trade-history export.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory for tables, charts, manifest and log.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Accounts in the top table.
    #[arg(long)]
    top_n: Option<usize>,

    /// Drawdown computation.
    #[arg(long, value_enum)]
    drawdown: Option<DrawdownArg>,

    /// Ignore the flattened cache and re-read the raw export.
    #[arg(long, default_value_t = false)]
    refresh: bool,

    /// Fail on the first malformed trade history instead of skipping it.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Skip chart rendering.
    #[arg(long, default_value_t = false)]
    no_charts: bool,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report rows, creation time and whether the raw input changed since.
    Status {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Remove the cache file and its sidecar.
    Clear {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DrawdownArg {
    Placeholder,
    Equity,
}

impl From<DrawdownArg> for DrawdownMode {
    fn from(arg: DrawdownArg) -> Self {
        match arg {
            DrawdownArg::Placeholder => DrawdownMode::Placeholder,
            DrawdownArg::Equity => DrawdownMode::Equity,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Analyze(args) => run_analyze_cmd(&args, verbose),
        Commands::Inspect {
            config,
            input,
            head,
        } => {
            let config = load_config(config.as_deref())?;
            let input = input.unwrap_or_else(|| config.paths.input.clone());
            with_logging(None, verbose, || run_inspect(&config, &input, head))
        }
        Commands::Charts {
            config,
            metrics,
            output_dir,
        } => {
            let config = load_config(config.as_deref())?;
            let metrics = metrics.unwrap_or_else(|| config.paths.metrics_path());
            let output_dir = output_dir.unwrap_or_else(|| config.paths.charts_path());
            with_logging(None, verbose, || run_charts(&config, &metrics, &output_dir))
        }
        Commands::Generate {
            output,
            accounts,
            max_trades,
            empty_rate,
            seed,
        } => {
            let spec = SyntheticSpec {
                accounts,
                max_trades,
                empty_rate,
                seed,
                ..SyntheticSpec::default()
            };
            with_logging(None, verbose, || run_generate(&spec, &output))
        }
        Commands::Cache { action } => match action {
            CacheAction::Status { config } => run_cache_status(&load_config(config.as_deref())?),
            CacheAction::Clear { config } => {
                let config = load_config(config.as_deref())?;
                with_logging(None, verbose, || run_cache_clear(&config))
            }
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => Ok(AnalysisConfig::from_file(path)?),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Layer command-line flags over the file config, then re-validate.
fn apply_overrides(config: &mut AnalysisConfig, args: &AnalyzeArgs) -> Result<()> {
    if let Some(input) = &args.input {
        config.paths.input = input.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.paths.output_dir = dir.clone();
    }
    if let Some(n) = args.top_n {
        config.scoring.top_n = n;
    }
    if let Some(mode) = args.drawdown {
        config.drawdown.mode = mode.into();
    }
    if args.refresh {
        config.loader.source = SourceMode::Raw;
    }
    if args.strict {
        config.loader.on_malformed = MalformedPolicy::Fail;
    }
    if args.no_charts {
        config.charts.enabled = false;
    }
    config.validate()?;
    Ok(())
}

fn run_analyze_cmd(args: &AnalyzeArgs, verbose: bool) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args)?;

    let log_path = config.paths.log_path();
    let summary = with_logging(Some(&log_path), verbose, || {
        let cache = FlatCache::new(&config.paths.cache);
        let source = TradeSource::resolve(config.loader.source, &config.paths.input, &cache)?;
        let outcome = run_analysis(source, &config)?;
        Ok(report::analysis_summary(&outcome, config.scoring.top_n))
    })?;

    print!("{summary}");
    println!("Log:            {}", log_path.display());
    Ok(())
}

fn run_inspect(config: &AnalysisConfig, input: &Path, head: usize) -> Result<()> {
    let raw = RawTable::read_csv(input)?;
    info!(rows = raw.len(), columns = raw.headers().len(), "read raw export");
    let summary = raw.summary(&config.columns.history, head);
    print!("{}", report::dataset_summary(&summary, raw.headers()));
    Ok(())
}

fn run_charts(config: &AnalysisConfig, metrics_path: &Path, output_dir: &Path) -> Result<()> {
    let metrics = read_metrics_csv(metrics_path)?;
    let written = render_charts(
        &metrics,
        output_dir,
        config.charts.histogram_bins,
        config.scoring.top_n,
    )?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_generate(spec: &SyntheticSpec, output: &Path) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&spec.empty_rate),
        "--empty-rate must be in [0, 1], got {}",
        spec.empty_rate
    );
    let config = AnalysisConfig::default();
    let table = synthetic::generate(spec, &config.columns);
    let rows = synthetic::write_csv(output, &table)
        .with_context(|| format!("failed to write synthetic export {}", output.display()))?;
    info!(rows, seed = spec.seed, path = %output.display(), "wrote synthetic export");
    println!("Wrote {rows} accounts to {}", output.display());
    Ok(())
}

fn run_cache_status(config: &AnalysisConfig) -> Result<()> {
    let cache = FlatCache::new(&config.paths.cache);
    let meta = cache.meta();
    let freshness = cache.freshness(&config.paths.input);
    print!(
        "{}",
        report::cache_status(cache.path(), cache.exists(), meta.as_ref(), freshness)
    );
    Ok(())
}

fn run_cache_clear(config: &AnalysisConfig) -> Result<()> {
    let cache = FlatCache::new(&config.paths.cache);
    if cache.clear()? {
        println!("Removed {}", cache.path().display());
    } else {
        println!("No cache at {}", cache.path().display());
    }
    Ok(())
}
