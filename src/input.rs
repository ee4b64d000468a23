use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::InputEvent;

/// Translate a terminal key press into a game input.
///
/// `typing` is true while a phrase is being typed: space is then a
/// character rather than a confirmation.
pub fn map_key(key: KeyEvent, typing: bool) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(InputEvent::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Enter if !typing => Some(InputEvent::Confirm),
        KeyCode::Char(' ') if !typing => Some(InputEvent::Confirm),
        KeyCode::Char(c) if typing => Some(InputEvent::Char(c)),
        _ => None,
    }
}
