//! Neon theme tokens for the TradeLens viewer
//!
//! # Color Palette
//! - **Background**: deep charcoal
//! - **Accent**: electric cyan (focus, headers)
//! - **Positive**: neon green (gains, strong scores)
//! - **Negative**: hot pink (losses)
//! - **Warning**: neon orange (degenerate columns, alerts)
//! - **Neutral**: cool purple (selection, secondary series)
//! - **Muted**: steel blue (axes, hints)

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::neon()
    }
}

impl Theme {
    pub fn neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Gains green, losses pink. Zero counts as a gain.
    pub fn pnl_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    /// Sharpe here is total PnL over per-trade deviation, so it runs larger
    /// than an annualized ratio.
    pub fn sharpe_color(&self, sharpe: f64) -> Color {
        match sharpe {
            s if s >= 3.0 => self.positive,
            s if s >= 1.0 => self.accent,
            s if s >= 0.0 => self.muted,
            _ => self.negative,
        }
    }

    /// Win rate in percent.
    pub fn win_rate_color(&self, win_rate: f64) -> Color {
        match win_rate {
            w if w >= 70.0 => self.positive,
            w if w >= 50.0 => self.accent,
            w if w >= 40.0 => self.neutral,
            _ => self.warning,
        }
    }

    /// Composite score in [0, 1].
    pub fn score_color(&self, score: f64) -> Color {
        match score {
            s if s >= 0.6 => self.positive,
            s if s >= 0.4 => self.accent,
            s if s >= 0.2 => self.neutral,
            _ => self.muted,
        }
    }

    pub fn header(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.neutral)
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn hint(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
