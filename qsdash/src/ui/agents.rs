//! Monitoring tab: summary, active/offline sparkline, agent log table.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Sparkline, Table},
};

use crate::fetcher::AgentLogs;
use crate::history::StatusHistory;
use crate::navigator::PageNavigator;
use crate::types::{AgentStatus, Priority};
use crate::ui::table::{draw_scrollbar, pager_line};
use crate::ui::theme::{header_style, ERR, MUTED, OK, WARN};
use crate::ui::util::{or_dash, truncate_middle};
use crate::view::{AgentView, SortOrder};

const COLS: [Constraint; 8] = [
    Constraint::Percentage(18), // Hostname
    Constraint::Length(16),     // IP
    Constraint::Percentage(14), // OS
    Constraint::Length(9),      // Status
    Constraint::Length(20),     // Last heartbeat
    Constraint::Length(8),      // Priority
    Constraint::Percentage(12), // Department
    Constraint::Length(8),      // Internet
];

pub fn draw_agents(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    nav: &PageNavigator<AgentLogs, AgentView>,
    hist: &StatusHistory,
    scroll_offset: usize,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // summary + sparkline
            Constraint::Min(5),    // table
            Constraint::Length(1), // pager
        ])
        .split(area);

    draw_summary(f, rows[0], nav, hist);
    draw_table(f, rows[1], nav, scroll_offset);

    let st = nav.state();
    f.render_widget(
        Paragraph::new(pager_line(
            st.current_page,
            st.total_pages,
            st.is_loading,
            st.last_error.as_ref(),
        )),
        rows[2],
    );
}

fn draw_summary(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    nav: &PageNavigator<AgentLogs, AgentView>,
    hist: &StatusHistory,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let meta = &nav.state().meta;
    let text = vec![
        Line::from(vec![
            Span::styled("Total agents: ", Style::default().fg(MUTED)),
            Span::raw(meta.total_agents.to_string()),
            Span::styled("   Unique IPs: ", Style::default().fg(MUTED)),
            Span::raw(meta.unique_ips.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Latest heartbeat: ", Style::default().fg(MUTED)),
            Span::raw(meta.latest_heartbeat.clone().unwrap_or_else(|| "N/A".into())),
        ]),
    ];
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Agent Monitoring")),
        cols[0],
    );

    let max_points = cols[1].width.saturating_sub(2) as usize;
    let start = hist.active.len().saturating_sub(max_points);
    let data: Vec<u64> = hist.active.iter().skip(start).copied().collect();
    let title = format!(
        "Active on page (now: {} | offline: {})",
        hist.active.back().copied().unwrap_or(0),
        hist.inactive.back().copied().unwrap_or(0)
    );
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&data)
        .max(nav.page_size() as u64)
        .style(Style::default().fg(OK));
    f.render_widget(spark, cols[1]);
}

fn draw_table(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    nav: &PageNavigator<AgentLogs, AgentView>,
    scroll_offset: usize,
) {
    let view = nav.view();
    let items = nav.visible_items();
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Agents  filter: {}  sort: {}{}",
        view.filter.label(),
        view.sort.label(),
        match view.order {
            SortOrder::Asc => " ↑",
            SortOrder::Desc => " ↓",
        }
    ));
    f.render_widget(block, area);

    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if inner.height < 1 || inner.width < 3 {
        return;
    }
    let content = Rect {
        width: inner.width.saturating_sub(2),
        ..inner
    };

    let total_rows = items.len();
    let viewport_rows = content.height.saturating_sub(1) as usize;
    let offset = scroll_offset.min(total_rows.saturating_sub(viewport_rows));

    if items.is_empty() {
        let msg = if nav.state().is_loading {
            "Loading agents..."
        } else {
            "No agents match the current filter."
        };
        f.render_widget(
            Paragraph::new(Span::styled(msg, Style::default().fg(MUTED))),
            content,
        );
        return;
    }

    let host_w = (content.width as usize * 18 / 100).max(8);
    let body = items.iter().skip(offset).take(viewport_rows).map(|a| {
        let (status, status_fg) = match a.status {
            AgentStatus::Active => ("Active", OK),
            AgentStatus::Inactive => ("Offline", ERR),
        };
        let (prio, prio_fg) = match a.priority {
            Some(Priority::High) => ("High", ERR),
            Some(Priority::Medium) => ("Medium", WARN),
            Some(Priority::Low) => ("Low", OK),
            None => ("-", MUTED),
        };
        Row::new(vec![
            Cell::from(truncate_middle(a.hostname(), host_w)),
            Cell::from(or_dash(a.ip_address.as_deref()).to_string()),
            Cell::from(or_dash(a.os_name.as_deref()).to_string()),
            Cell::from(status).style(Style::default().fg(status_fg)),
            Cell::from(a.last_heartbeat_str.clone()).style(Style::default().fg(MUTED)),
            Cell::from(prio).style(Style::default().fg(prio_fg)),
            Cell::from(or_dash(a.department.as_deref()).to_string()),
            Cell::from(if a.is_internet_facing { "yes" } else { "no" }),
        ])
    });

    let header = Row::new(vec![
        "Hostname", "IP", "OS", "Status", "Last heartbeat", "Priority", "Department", "Internet",
    ])
    .style(header_style().add_modifier(Modifier::BOLD));

    let table = Table::new(body, COLS.to_vec()).header(header).column_spacing(1);
    f.render_widget(table, content);
    draw_scrollbar(f, inner, total_rows, viewport_rows, offset);
}
