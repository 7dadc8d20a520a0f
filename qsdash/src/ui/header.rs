//! Top header: product name, API host and the tab strip.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

use crate::ui::theme::{ACCENT, MUTED};

pub const TAB_TITLES: [&str; 3] = ["1 Downloads", "2 Monitoring", "3 Assets"];

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, api: &str, selected_tab: usize) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(48)])
        .split(area);

    let tabs = Tabs::new(TAB_TITLES.to_vec())
        .select(selected_tab)
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM).title("QStellar"));
    f.render_widget(tabs, cols[0]);

    let right = Line::from(vec![
        Span::styled("api: ", Style::default().fg(MUTED)),
        Span::raw(api.to_string()),
        Span::styled("  (q quit)", Style::default().fg(MUTED)),
    ]);
    f.render_widget(
        Paragraph::new(right).block(Block::default().borders(Borders::BOTTOM)),
        cols[1],
    );
}
