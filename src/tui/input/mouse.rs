use std::time::Instant;

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::controller::ViewMode;
use crate::controller::selection::ClickModifier;
use crate::tui::app::{App, GroupedRow, Mode, grouped_rows};

use super::navigate::{select_in_group, toggle_group};

const WHEEL_STEP: usize = 3;

/// Shift extends the range; any other held modifier toggles like
/// Cmd/Ctrl-click.
pub fn click_modifier(modifiers: KeyModifiers) -> ClickModifier {
    if modifiers.contains(KeyModifiers::SHIFT) {
        ClickModifier::Shift
    } else if modifiers.intersects(
        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META,
    ) {
        ClickModifier::Meta
    } else {
        ClickModifier::None
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    if app.mode != Mode::Navigate {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.status = None;
            click(app, mouse.column, mouse.row, click_modifier(mouse.modifiers));
        }
        MouseEventKind::ScrollDown => {
            let top = app.scroll_top().saturating_add(WHEEL_STEP);
            app.set_scroll_top(top, now);
        }
        MouseEventKind::ScrollUp => {
            let top = app.scroll_top().saturating_sub(WHEEL_STEP);
            app.set_scroll_top(top, now);
        }
        _ => {}
    }
}

fn click(app: &mut App, column: u16, row: u16, modifier: ClickModifier) {
    let Some(area) = app.table_area else {
        return;
    };
    if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
        return;
    }
    let offset = (row - area.y) as usize;

    match app.controller.view_mode() {
        ViewMode::Flat => {
            // First line is the column header
            let Some(data_row) = offset.checked_sub(1) else {
                return;
            };
            let index = app.scroll_offset + data_row;
            if index >= app.controller.displayed_len() {
                return;
            }
            app.cursor = index;
            app.controller.select_row(index, modifier);
        }
        ViewMode::Grouped => {
            let index = app.controller.grouped_scroll() + offset;
            let rows = grouped_rows(&app.controller);
            let Some(target) = rows.get(index).copied() else {
                return;
            };
            app.grouped_cursor = index;
            match target {
                GroupedRow::Header { group } => toggle_group(app, group),
                GroupedRow::Page { group, index } => select_in_group(app, group, index),
            }
        }
    }
}
