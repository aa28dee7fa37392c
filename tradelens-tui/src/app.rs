//! Viewer state: single-owner, main-thread only.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tradelens_runner::{read_manifest, read_metrics_csv, AccountMetrics, ChartKind, RunManifest};

/// Which view fills the main area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Ranking,
    Chart(ChartKind),
    Manifest,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Ranking,
        View::Chart(ChartKind::RoiDistribution),
        View::Chart(ChartKind::SharpeVsRoi),
        View::Chart(ChartKind::WinRateVsPnl),
        View::Chart(ChartKind::TopAccounts),
        View::Manifest,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Ranking => "Ranking",
            View::Chart(kind) => kind.label(),
            View::Manifest => "Run",
        }
    }

    pub fn next(self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> View {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Top-level viewer state.
#[derive(Debug, Clone)]
pub struct App {
    /// Ranked accounts, in file order.
    pub metrics: Vec<AccountMetrics>,
    pub manifest: Option<RunManifest>,
    pub source: PathBuf,
    pub view: View,
    pub selected_index: usize,
    pub histogram_bins: usize,
    pub top_n: usize,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(metrics: Vec<AccountMetrics>, histogram_bins: usize, top_n: usize) -> Self {
        Self {
            metrics,
            manifest: None,
            source: PathBuf::new(),
            view: View::Ranking,
            selected_index: 0,
            histogram_bins,
            top_n,
            show_help: false,
            should_quit: false,
        }
    }

    /// Read the metrics table, plus the run manifest when one sits at
    /// `manifest_path`. A missing or unreadable manifest is not an error.
    pub fn load(
        metrics_path: &Path,
        manifest_path: &Path,
        histogram_bins: usize,
        top_n: usize,
    ) -> Result<Self> {
        let metrics = read_metrics_csv(metrics_path)
            .with_context(|| format!("cannot open metrics table {}", metrics_path.display()))?;
        let mut app = Self::new(metrics, histogram_bins, top_n);
        app.source = metrics_path.to_path_buf();
        app.manifest = read_manifest(manifest_path).ok();
        Ok(app)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn selected(&self) -> Option<&AccountMetrics> {
        self.metrics.get(self.selected_index)
    }

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.metrics.len() {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn page_down(&mut self, rows: usize) {
        let last = self.metrics.len().saturating_sub(1);
        self.selected_index = (self.selected_index + rows).min(last);
    }

    pub fn page_up(&mut self, rows: usize) {
        self.selected_index = self.selected_index.saturating_sub(rows);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.metrics.len().saturating_sub(1);
    }

    pub fn next_view(&mut self) {
        self.view = self.view.next();
    }

    pub fn prev_view(&mut self) {
        self.view = self.view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::metrics;

    #[test]
    fn view_cycle() {
        assert_eq!(View::Ranking.next(), View::Chart(ChartKind::RoiDistribution));
        assert_eq!(View::Manifest.next(), View::Ranking);
        assert_eq!(View::Ranking.prev(), View::Manifest);
        assert_eq!(View::Chart(ChartKind::TopAccounts).next(), View::Manifest);
    }

    #[test]
    fn view_from_index() {
        for i in 0..View::ALL.len() {
            let v = View::from_index(i).unwrap();
            assert_eq!(v.index(), i);
        }
        assert!(View::from_index(6).is_none());
    }

    #[test]
    fn selection_is_clamped() {
        let mut app = App::new(metrics(&[("A", 0.5), ("B", 0.4), ("C", 0.1)]), 30, 20);
        app.select_previous();
        assert_eq!(app.selected_index, 0);
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_index, 2);
        assert_eq!(app.selected().unwrap().account.as_str(), "C");

        app.page_up(10);
        assert_eq!(app.selected_index, 0);
        app.page_down(10);
        assert_eq!(app.selected_index, 2);
    }

    #[test]
    fn empty_table_has_no_selection() {
        let mut app = App::new(Vec::new(), 30, 20);
        app.select_next();
        app.select_last();
        assert_eq!(app.selected_index, 0);
        assert!(app.selected().is_none());
    }

    #[test]
    fn load_reads_metrics_and_optional_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("account_metrics.csv");
        tradelens_runner::write_metrics_csv(&path, &metrics(&[("A", 0.5)]), "Port_IDs").unwrap();

        let app = App::load(&path, &dir.path().join("run_manifest.json"), 30, 20).unwrap();
        assert_eq!(app.metrics.len(), 1);
        assert!(app.manifest.is_none());
        assert_eq!(app.source, path);

        let err = App::load(&dir.path().join("missing.csv"), &path, 30, 20).unwrap_err();
        assert!(err.to_string().contains("missing.csv"));
    }
}
