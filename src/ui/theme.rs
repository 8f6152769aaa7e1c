use ratatui::style::Color;

use crate::model::entity::EntityKind;
use crate::model::local_file::SyncStatus;

pub fn status_color(status: Option<SyncStatus>) -> Color {
    match status {
        Some(SyncStatus::Synced) => Color::Green,
        Some(SyncStatus::Modified) => Color::Yellow,
        Some(SyncStatus::Outdated) => Color::Blue,
        Some(SyncStatus::Conflict) => Color::Red,
        None => Color::DarkGray,
    }
}

pub fn kind_color(kind: EntityKind) -> Color {
    match kind {
        EntityKind::Issue => Color::Cyan,
        EntityKind::Article => Color::Magenta,
    }
}
