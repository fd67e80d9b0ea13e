//! Graphical view: CPU gauge, connections and memory line charts, and one
//! sparkline per traffic rate.

use std::collections::VecDeque;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph, Sparkline},
};

use crate::app::App;
use crate::ui::util::psize;

pub fn draw_graphs(f: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let Some(sample) = app.latest() else {
        f.render_widget(
            Paragraph::new("waiting for data...").block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };
    let v = &sample.snapshot.server;
    let r = &sample.rates;
    let hist = app.histories();

    // Three equal rows, two columns each
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);
    let cols = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row)
    };
    let top = cols(rows[0]);
    let mid = cols(rows[1]);
    let bottom = cols(rows[2]);

    // Top-left: CPU gauge stacked over the connections chart
    let cpu_conns = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(top[0]);
    draw_cpu(f, cpu_conns[0], v.cpu_percent);
    draw_line(
        f,
        cpu_conns[1],
        &format!(
            "Connections: {}/{}",
            sample.snapshot.connections.num_connections,
            v.max_connections()
        ),
        &hist.conns,
        hist.capacity(),
        Color::Yellow,
    );
    draw_line(
        f,
        top[1],
        &format!("Memory: {}", psize(v.mem_bytes)),
        &hist.mem_mib,
        hist.capacity(),
        Color::Yellow,
    );

    draw_spark(
        f,
        mid[0],
        &format!("In: Msgs/Sec: {:.1}", r.in_msgs_per_sec),
        &hist.in_msgs,
        Color::Cyan,
    );
    draw_spark(
        f,
        mid[1],
        &format!("In: Bytes/Sec: {}", psize(r.in_bytes_per_sec as u64)),
        &hist.in_bytes,
        Color::Cyan,
    );
    draw_spark(
        f,
        bottom[0],
        &format!("Out: Msgs/Sec: {:.1}", r.out_msgs_per_sec),
        &hist.out_msgs,
        Color::Green,
    );
    draw_spark(
        f,
        bottom[1],
        &format!("Out: Bytes/Sec: {}", psize(r.out_bytes_per_sec as u64)),
        &hist.out_bytes,
        Color::Green,
    );
}

fn draw_cpu(f: &mut ratatui::Frame<'_>, area: Rect, cpu: f64) {
    // multi-core servers can report more than 100%
    let pct = cpu.clamp(0.0, 100.0).round() as u16;
    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("CPU"))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(pct)
        .label(format!("CPU: {cpu:.1}%"));
    f.render_widget(g, area);
}

pub fn line_points(hist: &VecDeque<f64>) -> Vec<(f64, f64)> {
    hist.iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect()
}

fn draw_line(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    hist: &VecDeque<f64>,
    cap: usize,
    color: Color,
) {
    let points = line_points(hist);
    let y_max = hist.iter().copied().fold(1.0_f64, f64::max) * 1.1;
    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .x_axis(
            Axis::default()
                .bounds([0.0, cap.saturating_sub(1).max(1) as f64])
                .style(Style::default().fg(Color::White)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .style(Style::default().fg(Color::White)),
        );
    f.render_widget(chart, area);
}

fn draw_spark(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    hist: &VecDeque<u64>,
    color: Color,
) {
    let max_points = area.width.saturating_sub(2) as usize;
    let start = hist.len().saturating_sub(max_points);
    let data: Vec<u64> = hist.iter().skip(start).cloned().collect();

    let spark = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string()),
        )
        .data(&data)
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}
