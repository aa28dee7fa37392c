//! Keyboard navigation and event handling
//!
//! Maps keyboard events to app actions. The help overlay swallows every key
//! except the ones that close it.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tradelens_runner::ChartKind;

use crate::app::{App, View};

const PAGE: usize = 10;

/// Handle keyboard input and update app state
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Windows reports both press and release.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.quit();
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
        }
        KeyCode::Char('?') => {
            app.toggle_help();
        }

        // Views
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
            app.next_view();
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
            app.prev_view();
        }
        KeyCode::Char('1') => app.set_view(View::Ranking),
        KeyCode::Char('2') => app.set_view(View::Chart(ChartKind::RoiDistribution)),
        KeyCode::Char('3') => app.set_view(View::Chart(ChartKind::SharpeVsRoi)),
        KeyCode::Char('4') => app.set_view(View::Chart(ChartKind::WinRateVsPnl)),
        KeyCode::Char('5') => app.set_view(View::Chart(ChartKind::TopAccounts)),
        KeyCode::Char('6') => app.set_view(View::Manifest),

        // Ranking cursor
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::PageDown => app.page_down(PAGE),
        KeyCode::PageUp => app.page_up(PAGE),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),

        _ => {}
    }
}

/// Key bindings help text
pub fn key_bindings_help() -> Vec<(&'static str, &'static str)> {
    vec![
        ("q / Esc / Ctrl+C", "Quit"),
        ("Tab / l, Shift+Tab / h", "Next / previous view"),
        ("1-6", "Jump to view"),
        ("↓/j, ↑/k", "Move ranking cursor"),
        ("PgDn / PgUp", "Move ten rows"),
        ("g / G", "First / last account"),
        ("?", "Toggle this help"),
    ]
}
