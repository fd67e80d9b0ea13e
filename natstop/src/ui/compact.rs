//! Compact text view: server load and traffic summary plus the connections table.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::app::App;
use crate::poll::Sample;
use crate::sort::SortKey;
use crate::types::ConnectionInfo;
use crate::ui::util::{psize, truncate_middle};

// Keep header widths here so the header and the rows line up.
const COLS: [Constraint; 10] = [
    Constraint::Length(22), // HOST
    Constraint::Length(8),  // CID
    Constraint::Length(6),  // SUBS
    Constraint::Length(10), // PENDING
    Constraint::Length(10), // MSGS_TO
    Constraint::Length(10), // MSGS_FROM
    Constraint::Length(10), // BYTES_TO
    Constraint::Length(10), // BYTES_FROM
    Constraint::Length(7),  // LANG
    Constraint::Min(7),     // VERSION
];

/// Column title for each sortable column, in table order after HOST.
const SORTABLE: [(SortKey, &str); 7] = [
    (SortKey::Cid, "CID"),
    (SortKey::Subs, "SUBS"),
    (SortKey::Pending, "PENDING"),
    (SortKey::MsgsTo, "MSGS_TO"),
    (SortKey::MsgsFrom, "MSGS_FROM"),
    (SortKey::BytesTo, "BYTES_TO"),
    (SortKey::BytesFrom, "BYTES_FROM"),
];

pub fn server_lines(s: &Sample) -> Vec<String> {
    let v = &s.snapshot.server;
    let r = &s.rates;
    vec![
        "Server:".to_string(),
        format!("  Load: CPU: {:.1}%  Memory: {}", v.cpu_percent, psize(v.mem_bytes)),
        format!(
            "  In:   Msgs: {}  Bytes: {}  Msgs/Sec: {:.1}  Bytes/Sec: {:.1}",
            psize(v.in_msgs),
            psize(v.in_bytes),
            r.in_msgs_per_sec,
            r.in_bytes_per_sec
        ),
        format!(
            "  Out:  Msgs: {}  Bytes: {}  Msgs/Sec: {:.1}  Bytes/Sec: {:.1}",
            psize(v.out_msgs),
            psize(v.out_bytes),
            r.out_msgs_per_sec,
            r.out_bytes_per_sec
        ),
        String::new(),
        format!("Connections: {}", s.snapshot.connections.num_connections),
    ]
}

pub fn header_cells(sort: SortKey) -> Vec<String> {
    let mut cells = vec!["HOST".to_string()];
    cells.extend(SORTABLE.iter().map(|(k, title)| {
        if *k == sort {
            format!("{title} •")
        } else {
            title.to_string()
        }
    }));
    cells.push("LANG".into());
    cells.push("VERSION".into());
    cells
}

pub fn row_cells(c: &ConnectionInfo) -> Vec<String> {
    vec![
        truncate_middle(&c.address(), 22),
        c.id.to_string(),
        c.subscription_count.to_string(),
        c.pending_bytes.to_string(),
        psize(c.out_msgs),
        psize(c.in_msgs),
        psize(c.out_bytes),
        psize(c.in_bytes),
        c.client_language.clone(),
        c.client_version.clone(),
    ]
}

pub fn draw_compact(f: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let Some(sample) = app.latest() else {
        f.render_widget(
            Paragraph::new("waiting for data...").block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);

    let summary: Vec<Line> = server_lines(sample).into_iter().map(Line::from).collect();
    f.render_widget(Paragraph::new(summary), rows[0]);

    let header = Row::new(header_cells(app.sort())).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let body = app.ranked().iter().map(|c| {
        let cells = row_cells(c);
        Row::new(
            cells
                .into_iter()
                .enumerate()
                .map(|(i, text)| match i {
                    1 => Cell::from(text).style(Style::default().fg(Color::DarkGray)),
                    _ => Cell::from(text),
                }),
        )
    });
    let table = Table::new(body, COLS.to_vec())
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(table, rows[1]);
}
