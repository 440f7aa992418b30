use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::automation::build_automation;
use crate::ops::lists::build_add_to_lists;
use crate::tui::app::{App, AutomationField, Mode};

pub(super) fn handle_add_to_list(app: &mut App, key: KeyEvent) {
    let Some(modal) = app.add_to_list.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };
    let last = modal.checked.len().saturating_sub(1);
    match key.code {
        KeyCode::Esc => {
            app.add_to_list = None;
            app.mode = Mode::Navigate;
        }
        KeyCode::Char('j') | KeyCode::Down => modal.cursor = (modal.cursor + 1).min(last),
        KeyCode::Char('k') | KeyCode::Up => modal.cursor = modal.cursor.saturating_sub(1),
        KeyCode::Char(' ') => {
            if let Some((_, on)) = modal.checked.get_index_mut(modal.cursor) {
                *on = !*on;
            }
        }
        KeyCode::Enter => submit_add_to_list(app),
        _ => {}
    }
}

/// Bookmark the chosen pages into every checked list. Nothing is sent
/// when no list is checked.
fn submit_add_to_list(app: &mut App) {
    let Some(modal) = app.add_to_list.take() else {
        return;
    };
    app.mode = Mode::Navigate;
    let Some(request) = build_add_to_lists(modal.pages, &modal.checked) else {
        return;
    };
    match app.backend.add_pages_to_lists(&request) {
        Ok(added) => {
            let plural = if added == 1 { "" } else { "s" };
            app.set_status(format!("Added {} bookmark{}", added, plural));
            app.request_reload();
        }
        Err(e) => {
            tracing::warn!(error = %e, lists = ?request.lists, "add to list failed");
            app.set_error(format!("add to list failed: {}", e));
        }
    }
}

pub(super) fn handle_automation(app: &mut App, key: KeyEvent) {
    let Some(modal) = app.automation.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };

    if modal.created {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.automation = None;
            app.mode = Mode::Navigate;
        }
        return;
    }

    let field = match modal.field {
        AutomationField::Name => &mut modal.name,
        AutomationField::Links => &mut modal.links,
    };
    match key.code {
        KeyCode::Esc => {
            app.automation = None;
            app.mode = Mode::Navigate;
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            submit_automation(app);
        }
        KeyCode::Tab | KeyCode::BackTab => {
            modal.field = match modal.field {
                AutomationField::Name => AutomationField::Links,
                AutomationField::Links => AutomationField::Name,
            };
        }
        KeyCode::Enter => match modal.field {
            AutomationField::Name => modal.field = AutomationField::Links,
            AutomationField::Links => field.push('\n'),
        },
        KeyCode::Backspace => {
            field.pop();
        }
        KeyCode::Char(c) => field.push(c),
        _ => {}
    }
}

fn submit_automation(app: &mut App) {
    let Some(modal) = &app.automation else {
        return;
    };
    let coll = app.controller.collection();
    let request = build_automation(&coll.user, &coll.id, &modal.name, &modal.links);
    if request.list_title.is_empty() {
        app.set_error("a list name is required");
        return;
    }
    if request.bookmarks.is_empty() {
        app.set_error("add at least one link");
        return;
    }
    match app.backend.start_automation(&request) {
        Ok(automation) => {
            if let Some(modal) = app.automation.as_mut() {
                modal.created = true;
            }
            app.set_status(format!(
                "Automation {} queued with {} links",
                automation.id,
                request.bookmarks.len()
            ));
            app.request_reload();
        }
        Err(e) => {
            tracing::warn!(error = %e, "starting automation failed");
            app.set_error(format!("automation failed: {}", e));
        }
    }
}
