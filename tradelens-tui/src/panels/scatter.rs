//! Scatter panels - Sharpe vs. ROI and win rate vs. PnL
//!
//! One braille point per account. The selected account is drawn as a
//! second dataset so it stands out.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};
use tradelens_runner::{AccountMetrics, ChartKind};

use crate::theme::Theme;

/// Scatter plot widget
pub struct ScatterPanel<'a> {
    kind: ChartKind,
    points: Vec<(f64, f64)>,
    highlight: Option<(f64, f64)>,
    x_title: &'static str,
    y_title: &'static str,
    theme: &'a Theme,
}

impl<'a> ScatterPanel<'a> {
    /// ROI on x, Sharpe ratio on y.
    pub fn sharpe_vs_roi(metrics: &[AccountMetrics], selected: Option<usize>, theme: &'a Theme) -> Self {
        Self::build(
            ChartKind::SharpeVsRoi,
            metrics,
            selected,
            |m| (m.roi, m.sharpe_ratio),
            ("ROI (%)", "Sharpe Ratio"),
            theme,
        )
    }

    /// PnL on x, win rate on y.
    pub fn winrate_vs_pnl(metrics: &[AccountMetrics], selected: Option<usize>, theme: &'a Theme) -> Self {
        Self::build(
            ChartKind::WinRateVsPnl,
            metrics,
            selected,
            |m| (m.pnl, m.win_rate),
            ("PnL", "Win Rate (%)"),
            theme,
        )
    }

    fn build(
        kind: ChartKind,
        metrics: &[AccountMetrics],
        selected: Option<usize>,
        point: impl Fn(&AccountMetrics) -> (f64, f64),
        (x_title, y_title): (&'static str, &'static str),
        theme: &'a Theme,
    ) -> Self {
        let points: Vec<(f64, f64)> = metrics
            .iter()
            .map(&point)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        let highlight = selected.and_then(|i| metrics.get(i)).map(&point);
        Self {
            kind,
            points,
            highlight,
            x_title,
            y_title,
            theme,
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// `[min, max]` padded by 5% of the span; a flat axis gets ±1.
pub fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    let span = hi - lo;
    if span <= 0.0 {
        return [lo - 1.0, hi + 1.0];
    }
    [lo - span * 0.05, hi + span * 0.05]
}

fn axis_labels<'b>(bounds: [f64; 2], style: Style) -> Vec<Span<'b>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(|v| Span::styled(format!("{v:.1}"), style))
        .collect()
}

impl<'a> Widget for ScatterPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} [{} accounts] ", self.kind.title(), self.points.len()))
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .style(Style::default().bg(self.theme.background));

        if self.points.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            buf.set_string(inner.x, inner.y, "No accounts to plot", self.theme.hint());
            return;
        }

        let x_bounds = padded_bounds(self.points.iter().map(|p| p.0));
        let y_bounds = padded_bounds(self.points.iter().map(|p| p.1));

        let highlight: Vec<(f64, f64)> = self.highlight.into_iter().collect();
        let mut datasets = vec![Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(self.theme.accent))
            .data(&self.points)];
        if !highlight.is_empty() {
            datasets.push(
                Dataset::default()
                    .name("selected")
                    .marker(symbols::Marker::Block)
                    .graph_type(GraphType::Scatter)
                    .style(
                        Style::default()
                            .fg(self.theme.warning)
                            .add_modifier(Modifier::BOLD),
                    )
                    .data(&highlight),
            );
        }

        let label_style = self.theme.hint();
        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(Span::styled(self.x_title, label_style))
                    .style(label_style)
                    .bounds(x_bounds)
                    .labels(axis_labels(x_bounds, label_style)),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(self.y_title, label_style))
                    .style(label_style)
                    .bounds(y_bounds)
                    .labels(axis_labels(y_bounds, label_style)),
            )
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::metrics;

    #[test]
    fn test_padded_bounds() {
        assert_eq!(padded_bounds([0.0, 10.0].into_iter()), [-0.5, 10.5]);
        assert_eq!(padded_bounds([3.0, 3.0].into_iter()), [2.0, 4.0]);
        assert_eq!(padded_bounds(std::iter::empty()), [0.0, 1.0]);
    }

    #[test]
    fn test_points_follow_axes() {
        let theme = Theme::default();
        let rows = metrics(&[("A", 0.5), ("B", 0.25)]);

        let sharpe = ScatterPanel::sharpe_vs_roi(&rows, None, &theme);
        assert_eq!(sharpe.points(), &[(rows[0].roi, rows[0].sharpe_ratio), (rows[1].roi, rows[1].sharpe_ratio)]);

        let win = ScatterPanel::winrate_vs_pnl(&rows, Some(1), &theme);
        assert_eq!(win.points()[0], (rows[0].pnl, rows[0].win_rate));
        assert_eq!(win.highlight, Some((rows[1].pnl, rows[1].win_rate)));
    }

    #[test]
    fn test_non_finite_points_are_dropped() {
        let theme = Theme::default();
        let mut rows = metrics(&[("A", 0.5), ("B", 0.25)]);
        rows[1].roi = f64::NAN;
        let panel = ScatterPanel::sharpe_vs_roi(&rows, None, &theme);
        assert_eq!(panel.points().len(), 1);
    }

    #[test]
    fn test_renders_title() {
        let theme = Theme::default();
        let rows = metrics(&[("A", 0.5), ("B", 0.25), ("C", 0.75)]);
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        ScatterPanel::sharpe_vs_roi(&rows, Some(0), &theme).render(area, &mut buf);

        let first_row: String = (0..area.width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        assert!(first_row.contains("Sharpe Ratio vs. ROI [3 accounts]"));
    }
}
