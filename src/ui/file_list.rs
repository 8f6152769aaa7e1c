use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{kind_color, status_color};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let tracked = app.service.tracked();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ratatui::style::Color::Cyan))
        .title(" Tracked Files ");

    if tracked.is_empty() {
        let hint = Paragraph::new("No tracked files. Press 'a' and enter a key like TEST-123.")
            .style(Style::default().fg(ratatui::style::Color::DarkGray))
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = tracked
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let selected = i == app.selected;
            let status = app.status_for(file);

            let key_span = Span::styled(
                format!("{:<12} ", file.key.as_str()),
                Style::default().fg(kind_color(file.key.kind())),
            );

            // "?" until the remote hash has been seen once
            let badge = status.map(|s| s.as_str()).unwrap_or("?");
            let badge_span = Span::styled(
                format!("{:<9} ", badge),
                Style::default().fg(status_color(status)),
            );

            // Truncate the summary to fit
            let max_summary = area.width.saturating_sub(26) as usize;
            let summary: String = file.metadata.summary.chars().take(max_summary).collect();
            let summary_style = if selected {
                Style::default()
                    .fg(ratatui::style::Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let summary_span = Span::styled(summary, summary_style);

            ListItem::new(Line::from(vec![key_span, badge_span, summary_span]))
        })
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
