//! Floating layers drawn over the active tab: toasts and the idle panel.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::idle::{IdleContext, NoticeKind, IDLE_BLURB, IDLE_TITLE};
use crate::notify::{NotificationCenter, ToastLevel};
use crate::ui::theme::{ACCENT, BRAND, ERR, MUTED, OK, WARN};
use crate::ui::util::truncate_middle;

const TOAST_WIDTH: u16 = 48;

/// Newest toast on top, stacked down from the top-right corner.
pub fn draw_toasts(f: &mut ratatui::Frame<'_>, area: Rect, center: &NotificationCenter) {
    let width = TOAST_WIDTH.min(area.width);
    let mut y = area.y + 1;
    for t in center.visible() {
        if y + 3 > area.y + area.height {
            break;
        }
        let (icon, fg) = match t.level {
            ToastLevel::Info => ("i", ACCENT),
            ToastLevel::Loading => ("…", WARN),
            ToastLevel::Success => ("✓", OK),
            ToastLevel::Error => ("✗", ERR),
        };
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y,
            width,
            height: 3,
        };
        let msg = truncate_middle(&t.message, width.saturating_sub(6) as usize);
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("{icon} "), Style::default().fg(fg)),
                Span::raw(msg),
            ]))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(fg))),
            rect,
        );
        y += 3;
    }
}

/// Right-hand panel shown while the user is idle.
pub fn draw_idle_panel(f: &mut ratatui::Frame<'_>, area: Rect, ctx: IdleContext) {
    let width = (area.width * 2 / 5).clamp(30.min(area.width), area.width);
    let rect = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height: area.height,
    };

    let mut lines = vec![
        Line::from(Span::styled(IDLE_BLURB, Style::default().fg(MUTED))),
        Line::from(""),
    ];
    for n in ctx.notices() {
        let fg = match n.kind {
            NoticeKind::Offer => ACCENT,
            NoticeKind::Update => OK,
            NoticeKind::Alert => ERR,
        };
        lines.push(Line::from(Span::styled(
            n.title,
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(n.message));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "press any key to continue",
        Style::default().fg(MUTED),
    )));

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BRAND))
                .title(Span::styled(IDLE_TITLE, Style::default().add_modifier(Modifier::BOLD))),
        ),
        rect,
    );
}
