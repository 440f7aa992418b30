use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::controller::ViewMode;
use crate::controller::selection::ClickModifier;
use crate::model::SortColumn;
use crate::tui::app::{AddToListModal, App, ConfirmDelete, GroupedRow, Mode, grouped_rows};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent, now: Instant) {
    app.status = None;
    let grouped = app.controller.view_mode() == ViewMode::Grouped;
    let page = app.table_height.max(1) as isize;

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1, now),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1, now),
        KeyCode::PageDown => app.move_cursor(page, now),
        KeyCode::PageUp => app.move_cursor(-page, now),
        KeyCode::Char('g') | KeyCode::Home => app.set_cursor(0, now),
        KeyCode::Char('G') | KeyCode::End => app.set_cursor(usize::MAX, now),
        KeyCode::Char(' ') => click_cursor(app, ClickModifier::None),
        KeyCode::Char('x') => click_cursor(app, ClickModifier::Meta),
        KeyCode::Char('X') => click_cursor(app, ClickModifier::Shift),
        KeyCode::Enter => activate(app, now),
        KeyCode::Esc => clear(app),
        KeyCode::Char('v') | KeyCode::Tab => toggle_view(app),
        KeyCode::Char('e') if grouped => {
            app.controller.toggle_expand_all();
            app.clamp_cursors();
        }
        KeyCode::Char('/') => {
            app.search_input = app.controller.search_text().to_string();
            app.mode = Mode::Search;
        }
        KeyCode::Char(c @ '1'..='4') if !grouped => {
            let column = SortColumn::ALL[(c as u8 - b'1') as usize];
            sort_by(app, column);
        }
        KeyCode::Char('a') => open_add_to_list(app),
        KeyCode::Char('l') => next_list(app),
        KeyCode::Char('m') => start_move(app),
        KeyCode::Char('s') => save_order(app),
        KeyCode::Char('d') => remove_bookmark(app),
        KeyCode::Char('D') if grouped => confirm_delete_recording(app),
        KeyCode::Char('r') => app.request_reload(),
        _ => {}
    }
}

/// Click the row under the cursor.
fn click_cursor(app: &mut App, modifier: ClickModifier) {
    match app.controller.view_mode() {
        ViewMode::Flat => {
            app.controller.select_row(app.cursor, modifier);
        }
        ViewMode::Grouped => {
            let rows = grouped_rows(&app.controller);
            match rows.get(app.grouped_cursor).copied() {
                Some(GroupedRow::Header { group }) => toggle_group(app, group),
                Some(GroupedRow::Page { group, index }) => select_in_group(app, group, index),
                None => {}
            }
        }
    }
}

/// Expand a collapsed group, or collapse the expanded one.
pub(super) fn toggle_group(app: &mut App, group: usize) {
    let Some(id) = app.controller.groups().get(group).map(|g| g.id().to_string()) else {
        return;
    };
    if app.controller.expand_all() {
        app.set_status("all recordings are expanded (e to collapse)");
        return;
    }
    if app.controller.grouped().expanded_group() == Some(id.as_str()) {
        app.controller.collapse_group();
    } else {
        app.controller.expand_group(&id);
    }
    app.clamp_cursors();
}

pub(super) fn select_in_group(app: &mut App, group: usize, index: usize) {
    if let Some(id) = app.controller.groups().get(group).map(|g| g.id().to_string()) {
        app.controller.select_grouped_row(&id, index);
    }
}

/// Enter: in the grouped view act like a click; on a page of the flat
/// table, show its recording in the grouped view.
fn activate(app: &mut App, now: Instant) {
    if app.controller.view_mode() == ViewMode::Grouped {
        click_cursor(app, ClickModifier::None);
        return;
    }
    if app.controller.active_list().is_some() {
        return;
    }
    let Some(rec) = app.controller.pages().get(app.cursor).map(|p| p.rec.clone()) else {
        return;
    };
    app.controller.reveal_recording(&rec, &mut *app.store);
    if let Some(row) = app.controller.group_row_offset(&rec) {
        app.grouped_cursor = row;
        app.follow_cursor(now);
    }
}

/// Esc: peel back one layer of state
fn clear(app: &mut App) {
    let c = &mut app.controller;
    if !c.selection().is_empty() {
        c.clear_selection();
    } else if !c.grouped().is_empty() {
        c.collapse_group();
        app.clamp_cursors();
    } else if !c.search_text().is_empty() {
        c.search("", &mut *app.store);
        app.cursor = 0;
        app.scroll_offset = 0;
    } else if c.active_list().is_some() {
        c.open_list(None);
        app.cursor = 0;
        app.scroll_offset = 0;
    }
}

fn toggle_view(app: &mut App) {
    app.controller.toggle_view_mode(&mut *app.store);
    app.grouped_cursor = 0;
    app.clamp_cursors();
}

fn sort_by(app: &mut App, column: SortColumn) {
    if app.controller.active_list().is_some() {
        app.set_status("lists keep their own order");
        return;
    }
    app.controller.sort(column);
    app.cursor = 0;
    app.scroll_offset = 0;
}

fn open_add_to_list(app: &mut App) {
    let pages = match app.controller.view_mode() {
        ViewMode::Flat => app.controller.selected_pages(),
        ViewMode::Grouped => app.controller.selected_grouped_page().cloned().into_iter().collect(),
    };
    if pages.is_empty() {
        app.set_status("select pages to add first");
        return;
    }
    let checked = app
        .controller
        .collection()
        .lists
        .iter()
        .map(|l| (l.id.clone(), false))
        .collect();
    app.add_to_list = Some(AddToListModal {
        pages,
        checked,
        cursor: 0,
    });
    app.mode = Mode::AddToList;
}

/// Cycle pages → first list → … → last list → pages
fn next_list(app: &mut App) {
    let lists: Vec<String> = app
        .controller
        .collection()
        .lists
        .iter()
        .map(|l| l.id.clone())
        .collect();
    let next = match app.controller.active_list() {
        None => lists.first(),
        Some(order) => lists
            .iter()
            .position(|id| id == order.list_id())
            .and_then(|i| lists.get(i + 1)),
    };
    if app.controller.view_mode() == ViewMode::Grouped {
        app.controller.set_view_mode(ViewMode::Flat, &mut *app.store);
    }
    app.controller.open_list(next.map(String::as_str));
    app.cursor = 0;
    app.scroll_offset = 0;
}

fn start_move(app: &mut App) {
    let movable = app.controller.view_mode() == ViewMode::Flat
        && app.controller.active_list().is_some_and(|o| o.len() > 1);
    if movable {
        app.mode = Mode::Move;
    } else {
        app.set_status("open a list with two or more bookmarks to reorder");
    }
}

/// Send the open list's order to the backend. A failure keeps the local
/// order and is reported on the status row.
pub(super) fn save_order(app: &mut App) {
    let Some(count) = app.controller.active_list().map(|o| o.len()) else {
        app.set_status("no list open");
        return;
    };
    match app.controller.save_order(&mut *app.backend) {
        Ok(()) => app.set_status(format!("Saved order of {} bookmarks", count)),
        Err(e) => app.set_error(format!("saving order failed: {}", e)),
    }
}

fn remove_bookmark(app: &mut App) {
    let Some(order) = app.controller.active_list() else {
        return;
    };
    let Some(bookmark) = order.bookmarks().get(app.cursor) else {
        return;
    };
    let (list_id, bookmark_id) = (order.list_id().to_string(), bookmark.id.clone());
    match app.backend.remove_bookmark(&list_id, &bookmark_id) {
        Ok(()) => {
            app.set_status(format!("Removed {}", bookmark_id));
            app.request_reload();
        }
        Err(e) => {
            tracing::warn!(list = %list_id, bookmark = %bookmark_id, error = %e, "remove failed");
            app.set_error(format!("remove failed: {}", e));
        }
    }
}

/// Ask before deleting the recording under the grouped cursor.
fn confirm_delete_recording(app: &mut App) {
    let group = match grouped_rows(&app.controller).get(app.grouped_cursor) {
        Some(GroupedRow::Header { group }) | Some(GroupedRow::Page { group, .. }) => *group,
        None => return,
    };
    let Some(group) = app.controller.groups().get(group) else {
        return;
    };
    app.confirm_delete = Some(ConfirmDelete {
        rec_id: group.id().to_string(),
        title: group.recording.title.clone(),
        pages: group.pages.len(),
    });
    app.mode = Mode::ConfirmDelete;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::selection::Selection;
    use crate::tui::app::test_support::app_for;
    use crate::tui::input::tests::press;
    use crate::tui::render::test_helpers::{sample_app, sample_collection};
    use pretty_assertions::assert_eq;

    fn keys(app: &mut App, codes: &[KeyCode]) {
        let now = Instant::now();
        for code in codes {
            press(app, *code, now);
        }
    }

    #[test]
    fn space_x_and_shift_x_drive_selection() {
        let mut app = sample_app();
        keys(&mut app, &[KeyCode::Char(' '), KeyCode::Char('j'), KeyCode::Char('j')]);
        keys(&mut app, &[KeyCode::Char('x')]);
        assert_eq!(app.controller.selection().indices(), vec![0, 2]);
        keys(&mut app, &[KeyCode::Char('j'), KeyCode::Char('X')]);
        assert_eq!(app.controller.selection().indices(), vec![0, 1, 2, 3]);
        keys(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.controller.selection(), &Selection::None);
    }

    #[test]
    fn enter_reveals_recording_of_page() {
        let mut app = sample_app();
        keys(&mut app, &[KeyCode::Char('G'), KeyCode::Enter]);
        assert_eq!(app.controller.view_mode(), ViewMode::Grouped);
        assert_eq!(app.controller.grouped().expanded_group(), Some("r2"));
        assert_eq!(app.grouped_cursor, 1);
    }

    #[test]
    fn grouped_space_toggles_and_selects() {
        let mut app = sample_app();
        keys(&mut app, &[KeyCode::Char('v'), KeyCode::Char(' ')]);
        assert_eq!(app.controller.grouped().expanded_group(), Some("r1"));
        keys(&mut app, &[KeyCode::Char('j'), KeyCode::Char('j'), KeyCode::Char(' ')]);
        assert_eq!(
            app.controller.selected_grouped_page().map(|p| p.id.as_str()),
            Some("p2")
        );
        keys(&mut app, &[KeyCode::Char('k'), KeyCode::Char('k'), KeyCode::Char(' ')]);
        assert_eq!(app.controller.grouped().expanded_group(), None);
    }

    #[test]
    fn number_keys_sort_columns() {
        let mut app = sample_app();
        keys(&mut app, &[KeyCode::Char('2')]);
        assert_eq!(app.controller.pages()[0].title, "Docs");
        keys(&mut app, &[KeyCode::Char('2')]);
        assert_eq!(app.controller.pages()[0].title, "Wiki");
    }

    #[test]
    fn add_to_list_needs_a_selection() {
        let mut app = sample_app();
        keys(&mut app, &[KeyCode::Char('a')]);
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.status.is_some());
        keys(&mut app, &[KeyCode::Char(' '), KeyCode::Char('a')]);
        assert_eq!(app.mode, Mode::AddToList);
        let modal = app.add_to_list.as_ref().unwrap();
        assert_eq!(modal.pages.len(), 1);
        assert_eq!(modal.checked.keys().collect::<Vec<_>>(), vec!["l1", "l2"]);
    }

    #[test]
    fn l_cycles_lists_then_back_to_pages() {
        let mut app = sample_app();
        keys(&mut app, &[KeyCode::Char('l')]);
        assert_eq!(app.controller.active_list().map(|o| o.list_id()), Some("l1"));
        keys(&mut app, &[KeyCode::Char('l')]);
        assert_eq!(app.controller.active_list().map(|o| o.list_id()), Some("l2"));
        keys(&mut app, &[KeyCode::Char('l')]);
        assert!(app.controller.active_list().is_none());
    }

    #[test]
    fn save_order_reports_failure_and_keeps_order() {
        let (mut app, _) = app_for(sample_collection());
        app.backend = Box::new(crate::tui::app::test_support::FakeBackend {
            collection: sample_collection(),
            calls: Default::default(),
            fail: true,
        });
        keys(&mut app, &[KeyCode::Char('l')]);
        app.controller.move_bookmark(0, 2);
        keys(&mut app, &[KeyCode::Char('s')]);
        assert!(app.status.as_ref().is_some_and(|s| s.error));
        let ids: Vec<&str> = app
            .controller
            .active_bookmarks()
            .iter()
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b2", "b3", "b1"]);
    }

    #[test]
    fn remove_bookmark_calls_backend() {
        let (mut app, calls) = app_for(sample_collection());
        keys(&mut app, &[KeyCode::Char('l'), KeyCode::Char('j'), KeyCode::Char('d')]);
        assert_eq!(
            calls.borrow().removed,
            vec![("l1".to_string(), "b2".to_string())]
        );
    }

    #[test]
    fn esc_clears_search_then_list() {
        let mut app = sample_app();
        app.controller.search("docs", &mut *app.store);
        keys(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.controller.pages().len(), 5);
        keys(&mut app, &[KeyCode::Char('l'), KeyCode::Esc]);
        assert!(app.controller.active_list().is_none());
    }

    #[test]
    fn q_quits() {
        let mut app = sample_app();
        keys(&mut app, &[KeyCode::Char('q')]);
        assert!(app.should_quit);
    }
}
