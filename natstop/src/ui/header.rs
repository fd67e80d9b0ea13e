//! Top header: target, clock and key hints, or the sort prompt while one is being typed.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, InputMode};

pub fn header_text(app: &App, clock: &str) -> String {
    if app.mode() == InputMode::EnteringSortKey {
        return format!("sort by [{}]: {}", app.sort(), app.pending_sort());
    }
    if let Some(n) = app.notice() {
        return n.text.clone();
    }
    let state = if app.latest().is_some() {
        clock.to_string()
    } else {
        "connecting...".to_string()
    };
    format!(
        "natstop | server: {} | {} | sort: {} | ui: {}  (o: sort, g: view, q: quit)",
        app.target(),
        state,
        app.sort(),
        app.view()
    )
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let clock = chrono::Local::now().format("%H:%M:%S").to_string();
    let text = header_text(app, &clock);
    let style = match (app.mode(), app.notice()) {
        (InputMode::EnteringSortKey, _) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        (InputMode::Viewing, Some(_)) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Cyan),
    };
    f.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), area);
}
