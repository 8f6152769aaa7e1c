use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    spans.push(hint("↑↓", "navigate"));
    spans.push(hint("enter", "edit"));
    spans.push(hint("a", "track"));
    spans.push(hint("f", "fetch"));
    spans.push(hint("s", "save"));
    spans.push(hint("u", "unlink"));
    spans.push(hint("r", "refresh"));
    spans.push(hint("q", "quit"));

    // Connection indicator: the backend's name while connected
    spans.push(Span::raw("  "));
    match app.service.tracker_name() {
        Some(name) => spans.push(Span::styled(
            format!(" {name} "),
            Style::default()
                .fg(ratatui::style::Color::Black)
                .bg(ratatui::style::Color::Green),
        )),
        None => spans.push(Span::styled(
            " OFFLINE ",
            Style::default()
                .fg(ratatui::style::Color::Black)
                .bg(ratatui::style::Color::DarkGray),
        )),
    }

    // Flash message
    if let Some((msg, _)) = &app.flash_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            msg,
            Style::default().fg(ratatui::style::Color::Yellow),
        ));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line);
    f.render_widget(paragraph, area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(
        format!(" {key}:{desc} "),
        Style::default().fg(ratatui::style::Color::DarkGray),
    )
}
