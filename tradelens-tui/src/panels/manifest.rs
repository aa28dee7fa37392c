//! Run manifest viewer - what produced the metrics table on screen
//!
//! Shows input, counts, drawdown mode, normalization warnings, skipped
//! rows and output files.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use tradelens_runner::RunManifest;

use crate::theme::Theme;

/// Skipped rows listed before the rest are summarized.
const MAX_SKIPPED: usize = 5;

/// Run manifest widget
pub struct ManifestPanel<'a> {
    manifest: Option<&'a RunManifest>,
    theme: &'a Theme,
}

impl<'a> ManifestPanel<'a> {
    pub fn new(manifest: Option<&'a RunManifest>, theme: &'a Theme) -> Self {
        Self { manifest, theme }
    }

    fn section_header(&self, label: &str) -> Line<'a> {
        Line::from(Span::styled(
            format!("--- {} ---", label),
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn key_value(&self, key: &str, value: String) -> Line<'a> {
        Line::from(vec![
            Span::styled(
                format!("  {}: ", key),
                Style::default().fg(self.theme.text_secondary),
            ),
            Span::styled(value, Style::default().fg(self.theme.text_primary)),
        ])
    }

    fn lines(&self, m: &RunManifest) -> Vec<Line<'a>> {
        let mut lines = vec![self.section_header("Input")];
        lines.push(self.key_value("File", m.input.display().to_string()));
        lines.push(self.key_value(
            "Source",
            if m.from_cache { "flattened cache" } else { "raw export" }.to_string(),
        ));
        lines.push(self.key_value("Generated", m.generated_at.clone()));
        lines.push(self.key_value("Config", m.config_fingerprint.chars().take(16).collect()));
        lines.push(Line::from(""));

        lines.push(self.section_header("Counts"));
        lines.push(self.key_value("Raw rows", m.raw_rows.to_string()));
        lines.push(self.key_value("Empty history dropped", m.dropped_empty_history.to_string()));
        lines.push(self.key_value("Malformed rows skipped", m.skipped_rows.len().to_string()));
        lines.push(self.key_value("Trade rows", m.trade_rows.to_string()));
        lines.push(self.key_value("Unusable trades skipped", m.skipped_trades.len().to_string()));
        lines.push(self.key_value("Accounts", m.accounts.to_string()));
        lines.push(self.key_value("Drawdown", m.drawdown_mode.to_string()));
        lines.push(Line::from(""));

        if !m.warnings.is_empty() {
            lines.push(self.section_header("Warnings"));
            for w in &m.warnings {
                lines.push(Line::from(Span::styled(
                    format!("  {w}"),
                    Style::default().fg(self.theme.warning),
                )));
            }
            lines.push(Line::from(""));
        }

        let skipped: Vec<_> = m.skipped_rows.iter().chain(&m.skipped_trades).collect();
        if !skipped.is_empty() {
            lines.push(self.section_header("Skipped"));
            for s in skipped.iter().take(MAX_SKIPPED) {
                lines.push(self.key_value(&format!("row {}", s.row), format!("{} ({})", s.reason, s.account)));
            }
            if skipped.len() > MAX_SKIPPED {
                lines.push(Line::from(Span::styled(
                    format!("  … {} more", skipped.len() - MAX_SKIPPED),
                    self.theme.hint(),
                )));
            }
            lines.push(Line::from(""));
        }

        lines.push(self.section_header("Outputs"));
        for path in &m.outputs {
            lines.push(Line::from(Span::styled(
                format!("  {}", path.display()),
                Style::default().fg(self.theme.text_primary),
            )));
        }
        lines
    }
}

impl<'a> Widget for ManifestPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Run Manifest ")
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .style(Style::default().bg(self.theme.background));

        let lines = match self.manifest {
            Some(m) => self.lines(m),
            None => vec![Line::from(Span::styled(
                "No run_manifest.json next to the metrics table.",
                self.theme.hint(),
            ))],
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tradelens_core::SkippedRow;
    use tradelens_runner::{DegenerateNormalization, DrawdownMode};

    fn manifest() -> RunManifest {
        RunManifest {
            schema_version: 1,
            generated_at: "2026-01-02T03:04:05+00:00".into(),
            config_fingerprint: "ab".repeat(32),
            input: PathBuf::from("trades.csv"),
            from_cache: false,
            raw_rows: 4,
            dropped_empty_history: 1,
            skipped_rows: vec![SkippedRow {
                row: 3,
                account: "C".into(),
                reason: "invalid JSON".into(),
            }],
            trade_rows: 3,
            skipped_trades: Vec::new(),
            accounts: 2,
            drawdown_mode: DrawdownMode::Placeholder,
            warnings: vec![DegenerateNormalization {
                column: "Sharpe_Ratio".into(),
                value: 0.0,
                fill: 0.0,
            }],
            outputs: vec![PathBuf::from("account_metrics.csv")],
        }
    }

    fn content(buf: &Buffer, area: Rect) -> String {
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf.cell((x, y)).unwrap().symbol());
            }
        }
        out
    }

    #[test]
    fn test_renders_all_sections() {
        let theme = Theme::default();
        let m = manifest();
        let area = Rect::new(0, 0, 100, 40);
        let mut buf = Buffer::empty(area);
        ManifestPanel::new(Some(&m), &theme).render(area, &mut buf);

        let text = content(&buf, area);
        assert!(text.contains("Input"));
        assert!(text.contains("raw export"));
        assert!(text.contains("Counts"));
        assert!(text.contains("Warnings"));
        assert!(text.contains("Sharpe_Ratio"));
        assert!(text.contains("row 3"));
        assert!(text.contains("account_metrics.csv"));
    }

    #[test]
    fn test_missing_manifest() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 5);
        let mut buf = Buffer::empty(area);
        ManifestPanel::new(None, &theme).render(area, &mut buf);
        assert!(content(&buf, area).contains("No run_manifest.json"));
    }
}
