//! ROI distribution - vertical bar histogram
//!
//! Bins come from the same [`histogram`] the SVG report uses; the bar
//! width shrinks to fit all bins into the panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget},
};
use tradelens_runner::{histogram, AccountMetrics, ChartKind, HistogramBin};

use crate::theme::Theme;

/// ROI histogram widget
pub struct RoiHistogramPanel<'a> {
    metrics: &'a [AccountMetrics],
    bins: usize,
    theme: &'a Theme,
}

impl<'a> RoiHistogramPanel<'a> {
    pub fn new(metrics: &'a [AccountMetrics], bins: usize, theme: &'a Theme) -> Self {
        Self {
            metrics,
            bins,
            theme,
        }
    }

    pub fn bins(&self) -> Vec<HistogramBin> {
        let rois: Vec<f64> = self.metrics.iter().map(|m| m.roi).collect();
        histogram(&rois, self.bins)
    }
}

/// Widest bar (with a one-column gap) that fits `bins` bars into `width`.
pub fn bar_width(width: u16, bins: usize) -> u16 {
    if bins == 0 {
        return 1;
    }
    let per_bar = width as usize / bins;
    per_bar.saturating_sub(1).max(1) as u16
}

impl<'a> Widget for RoiHistogramPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bins = self.bins();
        let range = match (bins.first(), bins.last()) {
            (Some(first), Some(last)) => format!(" | {:.1}% to {:.1}%", first.lo, last.hi),
            _ => String::new(),
        };
        let block = Block::default()
            .title(format!(" {}{} ", ChartKind::RoiDistribution.title(), range))
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .style(Style::default().bg(self.theme.background));

        let inner = block.inner(area);
        if bins.is_empty() {
            block.render(area, buf);
            buf.set_string(inner.x, inner.y, "No accounts to plot", self.theme.hint());
            return;
        }

        let width = bar_width(inner.width, bins.len());
        // Edge labels only, the rest stay blank.
        let last = bins.len() - 1;
        let bars: Vec<Bar> = bins
            .iter()
            .enumerate()
            .map(|(i, bin)| {
                let label = if i == 0 {
                    format!("{:.0}", bin.lo)
                } else if i == last {
                    format!("{:.0}", bin.hi)
                } else {
                    String::new()
                };
                Bar::default()
                    .value(bin.count as u64)
                    .label(Line::from(label))
                    .style(Style::default().fg(self.theme.accent))
                    .value_style(Style::default().fg(self.theme.background).bg(self.theme.accent))
            })
            .collect();

        BarChart::default()
            .block(block)
            .bar_width(width)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::metric;

    #[test]
    fn test_bar_width_fits() {
        assert_eq!(bar_width(120, 30), 3);
        assert_eq!(bar_width(30, 30), 1);
        assert_eq!(bar_width(10, 30), 1);
        assert_eq!(bar_width(10, 0), 1);
    }

    #[test]
    fn test_bins_cover_every_account() {
        let theme = Theme::default();
        let rows: Vec<_> = (0..40).map(|i| metric(&format!("a{i}"), i as f64 / 40.0)).collect();
        let panel = RoiHistogramPanel::new(&rows, 30, &theme);
        let bins = panel.bins();
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 40);
    }

    #[test]
    fn test_renders_title_and_empty_state() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 12);

        let mut buf = Buffer::empty(area);
        RoiHistogramPanel::new(&[], 30, &theme).render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf.cell(pos).unwrap().symbol().to_string())
            .collect();
        assert!(text.contains("Distribution of ROI"));
        assert!(text.contains("No accounts to plot"));
    }
}
