pub mod command_bar;
pub mod detail_panel;
pub mod file_list;
pub mod footer;
pub mod theme;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::App;

pub fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    // Bottom bar height: command bar (3) when input active, else footer (1)
    let bottom_height = if app.input_active { 3 } else { 1 };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),                // file list + details
            Constraint::Length(bottom_height), // footer or command bar
        ])
        .split(size);

    let main_area = vertical[0];
    let bottom_area = vertical[1];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_area);

    file_list::render(f, horizontal[0], app);
    detail_panel::render(f, horizontal[1], app);

    if app.input_active {
        command_bar::render(f, bottom_area, app);
    } else {
        footer::render(f, bottom_area, app);
    }
}
