//! Asset inventory tab.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::fetcher::Assets;
use crate::navigator::PageNavigator;
use crate::types::{AssetRecord, Priority};
use crate::ui::table::{draw_scrollbar, pager_line};
use crate::ui::theme::{header_style, ERR, MUTED, OK, WARN};
use crate::ui::util::{gb, or_dash, truncate_middle, uptime};
use crate::view::{AssetView, SortOrder};

const COLS: [Constraint; 9] = [
    Constraint::Percentage(16), // Hostname
    Constraint::Percentage(10), // User
    Constraint::Percentage(16), // OS
    Constraint::Percentage(16), // CPU
    Constraint::Length(8),      // Memory
    Constraint::Length(9),      // Disk
    Constraint::Percentage(14), // IPs
    Constraint::Length(8),      // Uptime
    Constraint::Length(17),     // Last seen
];

fn risk_fg(a: &AssetRecord) -> ratatui::style::Color {
    match a.risk {
        Some(Priority::High) => ERR,
        Some(Priority::Medium) => WARN,
        Some(Priority::Low) => OK,
        None => ratatui::style::Color::Reset,
    }
}

pub fn draw_assets(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    nav: &PageNavigator<Assets, AssetView>,
    search_input: Option<&str>,
    scroll_offset: usize,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let view = nav.view();
    let mut title = format!(
        "Assets  sort: {}{}",
        view.sort.label(),
        match view.order {
            SortOrder::Asc => " ↑",
            SortOrder::Desc => " ↓",
        }
    );
    match (search_input, view.search.as_deref()) {
        (Some(typing), _) => title.push_str(&format!("  search: {typing}_")),
        (None, Some(q)) if !q.is_empty() => title.push_str(&format!("  search: {q}")),
        _ => {}
    }
    f.render_widget(Block::default().borders(Borders::ALL).title(title), rows[0]);

    let inner = Rect {
        x: rows[0].x + 1,
        y: rows[0].y + 1,
        width: rows[0].width.saturating_sub(2),
        height: rows[0].height.saturating_sub(2),
    };
    if inner.height >= 1 && inner.width >= 3 {
        draw_table(f, inner, nav, scroll_offset);
    }

    let st = nav.state();
    f.render_widget(
        Paragraph::new(pager_line(
            st.current_page,
            st.total_pages,
            st.is_loading,
            st.last_error.as_ref(),
        )),
        rows[1],
    );
}

fn draw_table(
    f: &mut ratatui::Frame<'_>,
    inner: Rect,
    nav: &PageNavigator<Assets, AssetView>,
    scroll_offset: usize,
) {
    let content = Rect {
        width: inner.width.saturating_sub(2),
        ..inner
    };
    let items = nav.visible_items();
    if items.is_empty() {
        let msg = if nav.state().is_loading {
            "Loading assets..."
        } else {
            "No assets found."
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(msg, Style::default().fg(MUTED)))),
            content,
        );
        return;
    }

    let total_rows = items.len();
    let viewport_rows = content.height.saturating_sub(1) as usize;
    let offset = scroll_offset.min(total_rows.saturating_sub(viewport_rows));
    let w = |pct: usize| (content.width as usize * pct / 100).max(6);

    let body = items.iter().skip(offset).take(viewport_rows).map(|a| {
        let os = match (a.os.as_deref(), a.os_version.as_deref()) {
            (Some(os), Some(v)) => format!("{os} {v}"),
            (os, _) => or_dash(os).to_string(),
        };
        let seen = a
            .collected_at()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| a.collected_at.clone());
        Row::new(vec![
            Cell::from(truncate_middle(&a.hostname, w(16))).style(Style::default().fg(risk_fg(a))),
            Cell::from(or_dash(a.username.as_deref()).to_string()),
            Cell::from(truncate_middle(&os, w(16))),
            Cell::from(truncate_middle(or_dash(a.cpu.as_deref()), w(16))),
            Cell::from(gb(a.memory_gb)),
            Cell::from(gb(a.disk_gb)),
            Cell::from(truncate_middle(&a.ip_list().join(", "), w(14))),
            Cell::from(uptime(a.uptime_seconds)),
            Cell::from(seen).style(Style::default().fg(MUTED)),
        ])
    });

    let header = Row::new(vec![
        "Hostname", "User", "OS", "CPU", "Memory", "Disk", "IPs", "Uptime", "Last seen",
    ])
    .style(header_style());

    f.render_widget(
        Table::new(body, COLS.to_vec()).header(header).column_spacing(1),
        content,
    );
    draw_scrollbar(f, inner, total_rows, viewport_rows, offset);
}
