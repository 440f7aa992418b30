mod confirm;
mod modals;
mod move_mode;
mod mouse;
mod navigate;
mod search;

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

use super::app::{App, AutomationModal, Mode};

use confirm::handle_confirm;
use modals::{handle_add_to_list, handle_automation};
use move_mode::handle_move;
use navigate::handle_navigate;
use search::handle_search;

pub use mouse::handle_mouse;

/// Browser-style key code for a key event, as fed to the automation key
/// sequence detector. Modifier keys are only seen when the terminal
/// reports them (kitty keyboard protocol).
pub fn key_code(key: &KeyEvent) -> Option<u16> {
    let code = match key.code {
        KeyCode::Modifier(m) => match m {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => 16,
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => 17,
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => 18,
            ModifierKeyCode::LeftSuper
            | ModifierKeyCode::RightSuper
            | ModifierKeyCode::LeftMeta
            | ModifierKeyCode::RightMeta => 91,
            _ => return None,
        },
        KeyCode::Char(c) if c.is_ascii_alphanumeric() => c.to_ascii_uppercase() as u16,
        KeyCode::Char(' ') => 32,
        KeyCode::Backspace => 8,
        KeyCode::Tab => 9,
        KeyCode::Enter => 13,
        KeyCode::Esc => 27,
        KeyCode::Left => 37,
        KeyCode::Up => 38,
        KeyCode::Right => 39,
        KeyCode::Down => 40,
        _ => return None,
    };
    Some(code)
}

/// Shift+letter arrives as either `Char('A')` or `Char('a')` with SHIFT
/// depending on the terminal; normalize to uppercase.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}

/// Open the automation form, unless it is already open.
fn open_automation(app: &mut App) {
    if app.mode == Mode::Automation {
        return;
    }
    tracing::info!("automation key sequence entered");
    app.automation = Some(AutomationModal::default());
    app.mode = Mode::Automation;
}

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    let key = normalize_key(key);

    // The detector only listens while no text field has focus
    if matches!(app.mode, Mode::Navigate | Mode::Move)
        && let Some(code) = key_code(&key)
        && app.controller.press_key(code, now)
    {
        open_automation(app);
        return;
    }

    // Bare modifier presses only feed the detector
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key, now),
        Mode::Search => handle_search(app, key, now),
        Mode::Move => handle_move(app, key, now),
        Mode::AddToList => handle_add_to_list(app, key),
        Mode::Automation => handle_automation(app, key),
        Mode::ConfirmDelete => handle_confirm(app, key),
    }
}
