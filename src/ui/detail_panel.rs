use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme::status_color;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ratatui::style::Color::Cyan))
        .title(" Details ");

    let Some(file) = app.selected_file() else {
        f.render_widget(block, area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Kind: ", Style::default().fg(ratatui::style::Color::Gray)),
        Span::raw(file.key.kind().as_str()),
    ]));

    lines.push(Line::from(vec![
        Span::styled("Project: ", Style::default().fg(ratatui::style::Color::Gray)),
        Span::raw(file.key.project()),
    ]));

    let status = app.status_for(file);
    let badge = status.map(|s| s.as_str()).unwrap_or("unknown");
    lines.push(Line::from(vec![
        Span::styled("Status: ", Style::default().fg(ratatui::style::Color::Gray)),
        Span::styled(badge, Style::default().fg(status_color(status))),
    ]));

    lines.push(Line::from(vec![
        Span::styled("Path: ", Style::default().fg(ratatui::style::Color::Gray)),
        Span::raw(file.path.display().to_string()),
    ]));

    lines.push(Line::from(vec![
        Span::styled("Baseline: ", Style::default().fg(ratatui::style::Color::Gray)),
        Span::raw(file.metadata.original_hash.as_str()),
    ]));

    if let Some(serde_yaml::Value::String(updated)) = file.metadata.extra.get("updated") {
        lines.push(Line::from(vec![
            Span::styled("Updated: ", Style::default().fg(ratatui::style::Color::Gray)),
            Span::raw(updated.as_str()),
        ]));
    }

    if let Some(serde_yaml::Value::Mapping(attachments)) = file.metadata.extra.get("attachments") {
        let names: Vec<&str> = attachments.keys().filter_map(|k| k.as_str()).collect();
        if !names.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(
                    "Attachments: ",
                    Style::default().fg(ratatui::style::Color::Gray),
                ),
                Span::raw(names.join(", ")),
            ]));
        }
    }

    if !file.content.is_empty() {
        lines.push(Line::raw(""));
        let preview: String = file.content.chars().take(600).collect();
        lines.push(Line::raw(preview));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
