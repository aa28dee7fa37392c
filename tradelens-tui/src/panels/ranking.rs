//! Ranking panel - accounts in score order
//!
//! Displays rank, account, score, ROI, Sharpe, PnL, win rate and trade
//! count, scrolling to keep the cursor row visible.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};
use tradelens_runner::AccountMetrics;

use crate::theme::Theme;

/// Ranking table widget
pub struct RankingPanel<'a> {
    metrics: &'a [AccountMetrics],
    selected_index: usize,
    theme: &'a Theme,
}

impl<'a> RankingPanel<'a> {
    pub fn new(metrics: &'a [AccountMetrics], selected_index: usize, theme: &'a Theme) -> Self {
        Self {
            metrics,
            selected_index,
            theme,
        }
    }
}

/// First row to draw so that `selected` stays inside a window of `visible`
/// rows.
pub fn scroll_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return selected;
    }
    (selected + 1).saturating_sub(visible)
}

/// Long numeric account ids keep their distinguishing tail.
pub fn short_account(id: &str, max: usize) -> String {
    let count = id.chars().count();
    if count <= max || max < 2 {
        return id.to_string();
    }
    let tail: String = id.chars().skip(count - (max - 1)).collect();
    format!("…{tail}")
}

impl<'a> Widget for RankingPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" Account Ranking [{} accounts] ", self.metrics.len()))
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .style(Style::default().bg(self.theme.background));

        let header = Row::new(
            ["#", "Account", "Score", "ROI %", "Sharpe", "PnL", "Win %", "Trades"]
                .into_iter()
                .map(|h| Cell::from(h).style(self.theme.header())),
        )
        .height(1);

        // Borders, header and the hint line.
        let visible = area.height.saturating_sub(4) as usize;
        let offset = scroll_offset(self.selected_index, visible);

        let rows = self
            .metrics
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, m)| {
                let style = if i == self.selected_index {
                    self.theme.selected()
                } else {
                    Style::default().fg(self.theme.text_primary)
                };
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(short_account(m.account.as_str(), 20)),
                    Cell::from(format!("{:.4}", m.score))
                        .style(Style::default().fg(self.theme.score_color(m.score))),
                    Cell::from(format!("{:+.2}", m.roi))
                        .style(Style::default().fg(self.theme.pnl_color(m.roi))),
                    Cell::from(format!("{:.2}", m.sharpe_ratio))
                        .style(Style::default().fg(self.theme.sharpe_color(m.sharpe_ratio))),
                    Cell::from(format!("{:+.2}", m.pnl))
                        .style(Style::default().fg(self.theme.pnl_color(m.pnl))),
                    Cell::from(format!("{:.1}", m.win_rate))
                        .style(Style::default().fg(self.theme.win_rate_color(m.win_rate))),
                    Cell::from(format!("{}", m.total_positions)),
                ])
                .style(style)
            });

        let widths = [
            Constraint::Length(5),
            Constraint::Length(21),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Length(7),
        ];

        Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .render(area, buf);

        if area.height < 3 {
            return;
        }
        let hint = Line::from(vec![
            Span::styled("↑/↓: ", self.theme.hint()),
            Span::styled("Select", Style::default().fg(self.theme.text_secondary)),
            Span::styled(" │ ", self.theme.hint()),
            Span::styled("Tab: ", self.theme.hint()),
            Span::styled("Charts", Style::default().fg(self.theme.text_secondary)),
            Span::styled(" │ ", self.theme.hint()),
            Span::styled("?: ", self.theme.hint()),
            Span::styled("Help", Style::default().fg(self.theme.text_secondary)),
        ]);
        buf.set_line(
            area.x + 2,
            area.y + area.height - 2,
            &hint,
            area.width.saturating_sub(4),
        );
    }
}
