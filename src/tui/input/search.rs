use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

pub(super) fn handle_search(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => {
            app.search_input.clear();
            app.mode = Mode::Navigate;
        }
        KeyCode::Enter => {
            let query = std::mem::take(&mut app.search_input);
            // Search always runs over pages
            if app.controller.active_list().is_some() {
                app.controller.open_list(None);
            }
            app.controller.search(query.trim(), &mut *app.store);
            app.mode = Mode::Navigate;
            app.cursor = 0;
            app.scroll_offset = 0;
            app.follow_cursor(now);
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => app.search_input.push(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ViewMode;
    use crate::tui::input::tests::press;
    use crate::tui::render::test_helpers::sample_app;
    use pretty_assertions::assert_eq;

    fn type_query(app: &mut App, text: &str, now: Instant) {
        press(app, KeyCode::Char('/'), now);
        for c in text.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    #[test]
    fn enter_applies_search() {
        let mut app = sample_app();
        let now = Instant::now();
        type_query(&mut app, "rustt", now);
        press(&mut app, KeyCode::Backspace, now);
        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.controller.search_text(), "rust");
        assert_eq!(app.controller.pages().len(), 1);
    }

    #[test]
    fn esc_cancels_without_searching() {
        let mut app = sample_app();
        let now = Instant::now();
        type_query(&mut app, "docs", now);
        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.controller.pages().len(), 5);
        assert!(app.search_input.is_empty());
    }

    #[test]
    fn searching_from_grouped_returns_to_flat() {
        let mut app = sample_app();
        let now = Instant::now();
        press(&mut app, KeyCode::Char('v'), now);
        type_query(&mut app, "wiki", now);
        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.controller.view_mode(), ViewMode::Flat);
        assert_eq!(app.controller.pages()[0].id, "p5");
    }
}
