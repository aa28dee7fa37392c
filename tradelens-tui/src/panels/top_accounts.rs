//! Top accounts - horizontal bars of the composite score

use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget},
};
use tradelens_runner::{top_by_score, AccountMetrics, ChartKind};

use crate::panels::ranking::short_account;
use crate::theme::Theme;

/// Bar lengths are integer; scores are scaled to thousandths.
const SCALE: f64 = 1000.0;

/// Top-N bar chart widget
pub struct TopAccountsPanel<'a> {
    top: Vec<&'a AccountMetrics>,
    theme: &'a Theme,
}

impl<'a> TopAccountsPanel<'a> {
    pub fn new(metrics: &'a [AccountMetrics], n: usize, theme: &'a Theme) -> Self {
        Self {
            top: top_by_score(metrics, n),
            theme,
        }
    }

    pub fn accounts(&self) -> Vec<&str> {
        self.top.iter().map(|m| m.account.as_str()).collect()
    }
}

pub fn scaled(score: f64) -> u64 {
    if score.is_finite() && score > 0.0 {
        (score * SCALE).round() as u64
    } else {
        0
    }
}

impl<'a> Widget for TopAccountsPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} [top {}] ", ChartKind::TopAccounts.title(), self.top.len()))
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .style(Style::default().bg(self.theme.background));

        if self.top.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            buf.set_string(inner.x, inner.y, "No accounts to plot", self.theme.hint());
            return;
        }

        let bars: Vec<Bar> = self
            .top
            .iter()
            .map(|m| {
                let color = self.theme.score_color(m.score);
                Bar::default()
                    .value(scaled(m.score))
                    .text_value(format!("{:.4}", m.score))
                    .label(Line::from(short_account(m.account.as_str(), 12)))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(self.theme.background).bg(color))
            })
            .collect();

        BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}
