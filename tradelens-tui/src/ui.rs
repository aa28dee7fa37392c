//! Top-level layout: tab bar, active view, status line, help overlay.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};
use ratatui::Frame;
use tradelens_runner::ChartKind;

use crate::app::{App, View};
use crate::navigation::key_bindings_help;
use crate::panels::{ManifestPanel, RankingPanel, RoiHistogramPanel, ScatterPanel, TopAccountsPanel};
use crate::theme::Theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tabs(f, chunks[0], app, theme);
    draw_view(f, chunks[1], app, theme);
    draw_status(f, chunks[2], app, theme);

    if app.show_help {
        draw_help(f, centered_rect(60, 50, chunks[1]), theme);
    }
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let titles: Vec<String> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}:{}", i + 1, v.label()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.view.index())
        .style(theme.hint())
        .highlight_style(theme.header())
        .divider(" ");
    f.render_widget(tabs, area);
}

fn draw_view(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let metrics = &app.metrics;
    match app.view {
        View::Ranking => f.render_widget(RankingPanel::new(metrics, app.selected_index, theme), area),
        View::Chart(ChartKind::RoiDistribution) => {
            f.render_widget(RoiHistogramPanel::new(metrics, app.histogram_bins, theme), area)
        }
        View::Chart(ChartKind::SharpeVsRoi) => f.render_widget(
            ScatterPanel::sharpe_vs_roi(metrics, Some(app.selected_index), theme),
            area,
        ),
        View::Chart(ChartKind::WinRateVsPnl) => f.render_widget(
            ScatterPanel::winrate_vs_pnl(metrics, Some(app.selected_index), theme),
            area,
        ),
        View::Chart(ChartKind::TopAccounts) => {
            f.render_widget(TopAccountsPanel::new(metrics, app.top_n, theme), area)
        }
        View::Manifest => f.render_widget(ManifestPanel::new(app.manifest.as_ref(), theme), area),
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.source.display()),
        theme.hint(),
    )];
    if let Some(m) = app.selected() {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(
            format!(
                "#{} {}  score {:.4}  ROI {:+.2}%  win {:.1}%",
                app.selected_index + 1,
                m.account,
                m.score,
                m.roi,
                m.win_rate
            ),
            Style::default().fg(theme.text_primary),
        ));
    }
    if let Some(manifest) = &app.manifest {
        if !manifest.warnings.is_empty() {
            spans.push(Span::styled(
                format!("  {} degenerate column(s)", manifest.warnings.len()),
                Style::default().fg(theme.warning),
            ));
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(f: &mut Frame, area: Rect, theme: &Theme) {
    let lines: Vec<Line> = key_bindings_help()
        .into_iter()
        .map(|(keys, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:>24}  ", keys), Style::default().fg(theme.accent)),
                Span::styled(desc, Style::default().fg(theme.text_secondary)),
            ])
        })
        .collect();
    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(theme.border())
        .style(Style::default().bg(theme.background));
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::metrics;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(app: &App) -> String {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app, &theme)).unwrap();
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn every_view_renders() {
        let mut app = App::new(metrics(&[("B", 0.7), ("A", 0.45), ("C", 0.001)]), 30, 20);
        for view in View::ALL {
            app.set_view(view);
            let text = screen(&app);
            assert!(text.contains("1:Ranking"), "{view:?}");
        }
    }

    #[test]
    fn status_line_shows_selection() {
        let mut app = App::new(metrics(&[("B", 0.7), ("A", 0.45)]), 30, 20);
        app.select_next();
        let text = screen(&app);
        assert!(text.contains("#2 A"));
    }

    #[test]
    fn help_overlay_lists_bindings() {
        let mut app = App::new(metrics(&[("B", 0.7)]), 30, 20);
        app.toggle_help();
        let text = screen(&app);
        assert!(text.contains("Keys"));
        assert!(text.contains("Next / previous view"));
    }

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let r = centered_rect(60, 50, area);
        assert!(r.x >= area.x && r.right() <= area.right());
        assert!(r.y >= area.y && r.bottom() <= area.bottom());
        assert_eq!(r.width, 60);
    }
}
