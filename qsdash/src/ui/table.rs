//! Shared pieces for the paged tables: row scrolling, scrollbar, pager line.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::error::FetchError;
use crate::ui::theme::{ERR, MUTED, SB_ARROW, SB_THUMB, SB_TRACK, WARN};

/// Up/Down/PageUp/PageDown/Home/End over the rows of the current page.
pub fn scroll_handle_key(offset: &mut usize, key: KeyEvent, page: usize) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => *offset = offset.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => *offset = offset.saturating_add(1),
        KeyCode::PageUp => *offset = offset.saturating_sub(page.max(1)),
        KeyCode::PageDown => *offset = offset.saturating_add(page.max(1)),
        KeyCode::Home => *offset = 0,
        KeyCode::End => *offset = usize::MAX,
        _ => {}
    }
}

pub fn scroll_clamp(offset: &mut usize, total_rows: usize, viewport_rows: usize) {
    let max_off = total_rows.saturating_sub(viewport_rows);
    if *offset > max_off {
        *offset = max_off;
    }
}

/// Vertical scrollbar in the last column of `inner`.
pub fn draw_scrollbar(
    f: &mut ratatui::Frame<'_>,
    inner: Rect,
    total_rows: usize,
    viewport_rows: usize,
    offset: usize,
) {
    let area = Rect {
        x: inner.x + inner.width.saturating_sub(1),
        y: inner.y,
        width: 1,
        height: inner.height,
    };
    if area.height < 3 {
        return;
    }
    let track = (area.height - 2) as usize;
    let total = total_rows.max(1);
    let view = viewport_rows.clamp(1, total);
    let max_off = total.saturating_sub(view);
    let offset = offset.min(max_off);

    let thumb_len = (track * view).div_ceil(total).max(1).min(track);
    let thumb_top = if max_off == 0 {
        0
    } else {
        ((track - thumb_len) * offset + max_off / 2) / max_off
    };

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(Line::from(Span::styled("▲", Style::default().fg(SB_ARROW))));
    for i in 0..track {
        if i >= thumb_top && i < thumb_top + thumb_len {
            lines.push(Line::from(Span::styled("█", Style::default().fg(SB_THUMB))));
        } else {
            lines.push(Line::from(Span::styled("│", Style::default().fg(SB_TRACK))));
        }
    }
    lines.push(Line::from(Span::styled("▼", Style::default().fg(SB_ARROW))));
    f.render_widget(Paragraph::new(lines), area);
}

/// "Page X of Y", plus a loading marker or the last error.
pub fn pager_line(current: u32, total: u32, loading: bool, error: Option<&FetchError>) -> Line<'static> {
    let mut spans = vec![
        Span::raw(" ◀ "),
        Span::raw(format!("Page {current} of {total}")),
        Span::raw(" ▶ "),
    ];
    if loading {
        spans.push(Span::styled("  loading...", Style::default().fg(WARN)));
    }
    if let Some(e) = error {
        spans.push(Span::styled(format!("  {e}"), Style::default().fg(ERR)));
    }
    spans.push(Span::styled(
        "   ←/→ page  g/G first/last  r refresh",
        Style::default().fg(MUTED),
    ));
    Line::from(spans)
}
