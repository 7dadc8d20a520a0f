//! Shared UI theme constants.

use ratatui::style::{Color, Modifier, Style};

pub const SB_ARROW: Color = Color::Rgb(170, 170, 180);
pub const SB_TRACK: Color = Color::Rgb(170, 170, 180);
pub const SB_THUMB: Color = Color::Rgb(170, 170, 180);

/// QStellar navy, used for titles and the selected tab.
pub const BRAND: Color = Color::Rgb(14, 39, 98);
pub const ACCENT: Color = Color::Cyan;

pub const OK: Color = Color::Green;
pub const WARN: Color = Color::Yellow;
pub const ERR: Color = Color::Red;
pub const MUTED: Color = Color::DarkGray;

pub fn header_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}
