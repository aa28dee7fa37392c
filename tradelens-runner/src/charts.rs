//! Static SVG charts over the metrics table.
//!
//! Four charts, each written to its own file:
//! - ROI histogram
//! - Sharpe ratio vs. ROI scatter
//! - Win rate vs. PnL scatter
//! - Top accounts by score, horizontal bars
//!
//! The data preparation ([`histogram`], [`top_by_score`]) is shared with the
//! terminal viewer.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::metrics::AccountMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    RoiDistribution,
    SharpeVsRoi,
    WinRateVsPnl,
    TopAccounts,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::RoiDistribution,
        ChartKind::SharpeVsRoi,
        ChartKind::WinRateVsPnl,
        ChartKind::TopAccounts,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::RoiDistribution => "roi_distribution.svg",
            Self::SharpeVsRoi => "sharpe_vs_roi.svg",
            Self::WinRateVsPnl => "winrate_vs_pnl.svg",
            Self::TopAccounts => "top20_accounts.svg",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::RoiDistribution => "Distribution of ROI across Accounts",
            Self::SharpeVsRoi => "Sharpe Ratio vs. ROI",
            Self::WinRateVsPnl => "Win Rate vs. PnL",
            Self::TopAccounts => "Top Accounts by Performance Score",
        }
    }

    /// Short label for tab bars.
    pub fn label(self) -> &'static str {
        match self {
            Self::RoiDistribution => "ROI",
            Self::SharpeVsRoi => "Sharpe/ROI",
            Self::WinRateVsPnl => "WinRate/PnL",
            Self::TopAccounts => "Top",
        }
    }
}

// ─── Data preparation ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]`; the last bin is closed.
///
/// A constant column is binned over `[v - 0.5, v + 0.5]`. Non-finite values
/// are ignored.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lo: lo + width * i as f64,
            hi: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// The `n` best accounts by score, ties in input order.
pub fn top_by_score(metrics: &[AccountMetrics], n: usize) -> Vec<&AccountMetrics> {
    let mut sorted: Vec<&AccountMetrics> = metrics.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
    sorted.truncate(n);
    sorted
}

// ─── SVG rendering ──────────────────────────────────────────────────

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: usize = 5;

struct Plot {
    width: f64,
    height: f64,
    left: f64,
    x: (f64, f64),
    y: (f64, f64),
    body: String,
}

impl Plot {
    fn new(width: f64, height: f64, left: f64, x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            width,
            height,
            left,
            x,
            y,
            body: String::new(),
        }
    }

    fn plot_width(&self) -> f64 {
        self.width - self.left - MARGIN_RIGHT
    }

    fn plot_height(&self) -> f64 {
        self.height - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn px(&self, x: f64) -> f64 {
        self.left + (x - self.x.0) / (self.x.1 - self.x.0) * self.plot_width()
    }

    fn py(&self, y: f64) -> f64 {
        self.height - MARGIN_BOTTOM - (y - self.y.0) / (self.y.1 - self.y.0) * self.plot_height()
    }

    /// Grid lines with tick labels; `y_ticks` is false for categorical axes.
    fn grid(&mut self, y_ticks: bool) {
        let bottom = self.height - MARGIN_BOTTOM;
        let right = self.width - MARGIN_RIGHT;
        for v in ticks(self.x.0, self.x.1) {
            let x = self.px(v);
            let _ = write!(
                self.body,
                r##"<line x1="{x:.2}" y1="{MARGIN_TOP:.2}" x2="{x:.2}" y2="{bottom:.2}" stroke="#e5e5e5" /><text x="{x:.2}" y="{ty:.2}" text-anchor="middle">{label}</text>"##,
                ty = bottom + 16.0,
                label = tick_label(v),
            );
        }
        if y_ticks {
            let left = self.left;
            for v in ticks(self.y.0, self.y.1) {
                let y = self.py(v);
                let _ = write!(
                    self.body,
                    r##"<line x1="{left:.2}" y1="{y:.2}" x2="{right:.2}" y2="{y:.2}" stroke="#e5e5e5" /><text x="{tx:.2}" y="{ty:.2}" text-anchor="end">{label}</text>"##,
                    tx = left - 6.0,
                    ty = y + 3.0,
                    label = tick_label(v),
                );
            }
        }
        let (left, w, h) = (self.left, self.plot_width(), self.plot_height());
        let _ = write!(
            self.body,
            r##"<rect x="{left:.2}" y="{MARGIN_TOP:.2}" width="{w:.2}" height="{h:.2}" fill="none" stroke="#999" />"##,
        );
    }

    fn finish(self, title: &str, x_label: &str, y_label: &str) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}"><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:#444}}.title{{font-size:16px;fill:#222}}</style><rect width="100%" height="100%" fill="white" />"#,
            w = self.width,
            h = self.height,
        );
        svg.push_str(&self.body);
        let mid_x = self.left + self.plot_width() / 2.0;
        let mid_y = MARGIN_TOP + self.plot_height() / 2.0;
        let _ = write!(
            svg,
            r#"<text class="title" x="{mid_x:.2}" y="30" text-anchor="middle">{title}</text><text x="{mid_x:.2}" y="{xl:.2}" text-anchor="middle">{x_label}</text><text x="18" y="{mid_y:.2}" text-anchor="middle" transform="rotate(-90 18 {mid_y:.2})">{y_label}</text></svg>"#,
            xl = self.height - 18.0,
            title = escape(title),
            x_label = escape(x_label),
            y_label = escape(y_label),
        );
        svg
    }
}

fn ticks(lo: f64, hi: f64) -> Vec<f64> {
    (0..=TICKS)
        .map(|i| lo + (hi - lo) * i as f64 / TICKS as f64)
        .collect()
}

fn tick_label(v: f64) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        format!("{v:.0}")
    } else if a >= 10.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Extent of the finite values with 5% padding; unit span around a constant.
fn padded_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

pub fn roi_histogram_svg(metrics: &[AccountMetrics], bins: usize) -> String {
    let rois: Vec<f64> = metrics.iter().map(|m| m.roi).collect();
    let hist = histogram(&rois, bins);
    let x = match (hist.first(), hist.last()) {
        (Some(first), Some(last)) => (first.lo, last.hi),
        _ => (0.0, 1.0),
    };
    let max_count = hist.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let mut plot = Plot::new(WIDTH, HEIGHT, MARGIN_LEFT, x, (0.0, max_count as f64 * 1.05));
    plot.grid(true);

    for bin in &hist {
        if bin.count == 0 {
            continue;
        }
        let (x0, x1) = (plot.px(bin.lo), plot.px(bin.hi));
        let top = plot.py(bin.count as f64);
        let bottom = plot.py(0.0);
        let _ = write!(
            plot.body,
            r##"<rect x="{x0:.2}" y="{top:.2}" width="{w:.2}" height="{h:.2}" fill="#3b6fd4" fill-opacity="0.75" stroke="white" />"##,
            w = (x1 - x0).max(0.5),
            h = bottom - top,
        );
    }
    plot.finish(ChartKind::RoiDistribution.title(), "ROI (%)", "Frequency")
}

fn scatter_svg(points: &[(f64, f64)], color: &str, kind: ChartKind, x_label: &str, y_label: &str) -> String {
    let x = padded_extent(points.iter().map(|p| p.0));
    let y = padded_extent(points.iter().map(|p| p.1));
    let mut plot = Plot::new(WIDTH, HEIGHT, MARGIN_LEFT, x, y);
    plot.grid(true);
    for &(px, py) in points {
        if !px.is_finite() || !py.is_finite() {
            continue;
        }
        let (cx, cy) = (plot.px(px), plot.py(py));
        let _ = write!(
            plot.body,
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="4" fill="{color}" fill-opacity="0.7" />"#
        );
    }
    plot.finish(kind.title(), x_label, y_label)
}

pub fn sharpe_vs_roi_svg(metrics: &[AccountMetrics]) -> String {
    let points: Vec<(f64, f64)> = metrics.iter().map(|m| (m.sharpe_ratio, m.roi)).collect();
    scatter_svg(&points, "#1f77b4", ChartKind::SharpeVsRoi, "Sharpe Ratio", "ROI (%)")
}

pub fn winrate_vs_pnl_svg(metrics: &[AccountMetrics]) -> String {
    let points: Vec<(f64, f64)> = metrics.iter().map(|m| (m.win_rate, m.pnl)).collect();
    scatter_svg(&points, "#2ca02c", ChartKind::WinRateVsPnl, "Win Rate (%)", "Total PnL")
}

/// Horizontal bars, best account at the top.
pub fn top_accounts_svg(metrics: &[AccountMetrics], n: usize) -> String {
    let top = top_by_score(metrics, n);
    let left = 190.0;
    let height = 600.0;
    let max = top.iter().map(|m| m.score).fold(0.0_f64, f64::max);
    let min = top.iter().map(|m| m.score).fold(0.0_f64, f64::min);
    let x = if max > min { (min, max * 1.05) } else { (0.0, 1.0) };

    let mut plot = Plot::new(1200.0, height, left, x, (0.0, top.len().max(1) as f64));
    plot.grid(false);

    let row = plot.plot_height() / top.len().max(1) as f64;
    let last = top.len().saturating_sub(1).max(1) as f64;
    for (i, m) in top.iter().enumerate() {
        let y = MARGIN_TOP + row * i as f64 + row * 0.1;
        let (x0, x1) = (plot.px(0.0_f64.max(min)), plot.px(m.score));
        let (x0, x1) = if x1 < x0 { (x1, x0) } else { (x0, x1) };
        let _ = write!(
            plot.body,
            r#"<rect x="{x0:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" /><text x="{tx:.2}" y="{ty:.2}" text-anchor="end">{label}</text>"#,
            w = x1 - x0,
            h = row * 0.8,
            fill = coolwarm(i as f64 / last),
            tx = left - 6.0,
            ty = y + row * 0.4 + 4.0,
            label = escape(m.account.as_str()),
        );
    }
    plot.finish(ChartKind::TopAccounts.title(), "Score", "Account ID")
}

/// Blue-to-red ramp, `t` in [0, 1].
fn coolwarm(t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    let (r0, g0, b0) = (59.0, 76.0, 192.0);
    let (r1, g1, b1) = (180.0, 4.0, 38.0);
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    format!("#{:02x}{:02x}{:02x}", lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Write all four charts into `dir`. Returns the written paths in
/// [`ChartKind::ALL`] order.
pub fn render_charts(
    metrics: &[AccountMetrics],
    dir: &Path,
    bins: usize,
    top_n: usize,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = Vec::with_capacity(ChartKind::ALL.len());
    for kind in ChartKind::ALL {
        let svg = match kind {
            ChartKind::RoiDistribution => roi_histogram_svg(metrics, bins),
            ChartKind::SharpeVsRoi => sharpe_vs_roi_svg(metrics),
            ChartKind::WinRateVsPnl => winrate_vs_pnl_svg(metrics),
            ChartKind::TopAccounts => top_accounts_svg(metrics, top_n),
        };
        let path = dir.join(kind.file_name());
        std::fs::write(&path, svg).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    info!(dir = %dir.display(), charts = written.len(), "rendered charts");
    Ok(written)
}
