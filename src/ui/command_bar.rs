use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    if !app.input_active {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ratatui::style::Color::Yellow))
        .title(" Track entity — TEST-123 or TEST-A-123 ");

    let paragraph = Paragraph::new(Line::raw(app.input_buffer.as_str())).block(block);
    f.render_widget(paragraph, area);

    // Position cursor after the typed text
    let x = area.x + 1 + app.input_buffer.len() as u16;
    let y = area.y + 1;
    f.set_cursor_position((x.min(area.x + area.width.saturating_sub(2)), y));
}
