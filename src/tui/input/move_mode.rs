use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

use super::navigate::save_order;

pub(super) fn handle_move(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => shift(app, 1, now),
        KeyCode::Char('k') | KeyCode::Up => shift(app, -1, now),
        KeyCode::Char('g') | KeyCode::Home => move_to(app, 0, now),
        KeyCode::Char('G') | KeyCode::End => {
            let last = app.controller.displayed_len().saturating_sub(1);
            move_to(app, last, now);
        }
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            save_order(app);
        }
        KeyCode::Esc => {
            app.mode = Mode::Navigate;
            if app
                .controller
                .active_list()
                .is_some_and(|o| o.has_unsaved_changes())
            {
                app.set_status("order changed locally (s to save)");
            }
        }
        _ => {}
    }
}

fn shift(app: &mut App, delta: isize, now: Instant) {
    if let Some(to) = app.cursor.checked_add_signed(delta) {
        move_to(app, to, now);
    }
}

/// Move the bookmark under the cursor to `to`, keeping the cursor on it.
fn move_to(app: &mut App, to: usize, now: Instant) {
    let from = app.cursor;
    if app.controller.move_bookmark(from, to) {
        app.set_cursor(to, now);
    }
}
