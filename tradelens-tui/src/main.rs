//! TradeLens TUI: browse a finished analysis in the terminal.
//!
//! Views:
//! 1. Ranking: every account in score order
//! 2. ROI: distribution histogram
//! 3. Sharpe/ROI: scatter
//! 4. WinRate/PnL: scatter
//! 5. Top: top-N accounts by score
//! 6. Run: the run manifest

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use tradelens_runner::AnalysisConfig;
use tradelens_tui::{handle_key_event, ui, App, Theme};

#[derive(Parser)]
#[command(name = "tradelens-tui", about = "Terminal viewer for TradeLens account rankings")]
struct Args {
    /// Analysis config; its output paths locate the metrics table.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Metrics table to open, overriding the config.
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Accounts in the top-N view.
    #[arg(long)]
    top_n: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    let (metrics_path, manifest_path) = match &args.metrics {
        Some(path) => {
            let dir = path.parent().map(PathBuf::from).unwrap_or_default();
            (path.clone(), dir.join("run_manifest.json"))
        }
        None => (config.paths.metrics_path(), config.paths.manifest_path()),
    };
    let top_n = args.top_n.unwrap_or(config.scoring.top_n);
    let mut app = App::load(&metrics_path, &manifest_path, config.charts.histogram_bins, top_n)
        .context("run `tradelens analyze` first to produce the metrics table")?;

    // Restore the terminal before printing a panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let theme = Theme::default();
    loop {
        terminal.draw(|f| ui::draw(f, app, &theme))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
