use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, ConfirmDelete, Mode};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('y')) => {
            let pending = app.confirm_delete.take();
            app.mode = Mode::Navigate;
            if let Some(pending) = pending {
                delete_recording(app, &pending);
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('n')) | (_, KeyCode::Esc) => {
            app.confirm_delete = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn delete_recording(app: &mut App, pending: &ConfirmDelete) {
    match app.controller.delete_recording(&pending.rec_id, app.backend.as_mut()) {
        Ok(removed) => {
            app.clamp_cursors();
            let name = if pending.title.is_empty() { &pending.rec_id } else { &pending.title };
            let plural = if removed == 1 { "" } else { "s" };
            app.set_status(format!("Deleted {} ({} page{})", name, removed, plural));
            app.request_reload();
        }
        Err(e) => app.set_error(format!("delete failed: {}", e)),
    }
}
