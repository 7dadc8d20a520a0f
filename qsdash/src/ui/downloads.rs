//! Agent download cards, one per OS.

use std::collections::BTreeMap;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::links::{ChecksumDisplay, OsKey, AGENT_RELEASE_DATE, AGENT_VERSION};
use crate::ui::theme::{selected_style, ACCENT, ERR, MUTED, OK};

pub fn draw_downloads(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    checksums: &BTreeMap<OsKey, ChecksumDisplay>,
    selected: usize,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(1)])
        .split(area);
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);

    for (i, key) in OsKey::ALL.iter().enumerate() {
        let checksum = checksums.get(key).cloned().unwrap_or_default();
        draw_card(f, cards[i], *key, &checksum, i == selected);
    }

    let help = Line::from(Span::styled(
        "←/→ select  Enter/d download  r re-check",
        Style::default().fg(MUTED),
    ));
    f.render_widget(Paragraph::new(help), rows[1]);
}

fn draw_card(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    key: OsKey,
    checksum: &ChecksumDisplay,
    selected: bool,
) {
    let border = if selected {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let sum_fg = match checksum {
        ChecksumDisplay::Fetching => MUTED,
        ChecksumDisplay::Available(_) => OK,
        ChecksumDisplay::Unavailable => ERR,
    };
    let label = |s: &'static str| Span::styled(s, Style::default().fg(MUTED));
    let text = vec![
        Line::from(vec![label("Version: "), Span::raw(AGENT_VERSION)]),
        Line::from(vec![label("File:    "), Span::raw(key.file_name())]),
        Line::from(vec![label("Date:    "), Span::raw(AGENT_RELEASE_DATE)]),
        Line::from(vec![
            label("SHA256:  "),
            Span::styled(checksum.to_string(), Style::default().fg(sum_fg)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            if selected { "[ Download ]" } else { "  Download  " },
            if selected { selected_style() } else { border },
        )),
    ];
    f.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!("{} Agent", key.display_name())),
        ),
        area,
    );
}
