use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode};
use crate::playback::Direction;

use super::intent::Intent;

/// Translate a key press into an intent, given what the UI is doing.
///
/// Only the `gg` chord state lives in `app`; everything else is stateless.
pub fn intent_for(key: KeyEvent, app: &mut App) -> Option<Intent> {
    if app.mode != InputMode::Normal {
        return prompt_intent(key);
    }

    if key.code != KeyCode::Char('g') {
        app.clear_pending_g();
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Intent::Quit),
            _ => None,
        };
    }

    let intent = match key.code {
        KeyCode::Char('q') => Intent::Quit,
        KeyCode::Char('j') | KeyCode::Down => Intent::CursorDown,
        KeyCode::Char('k') | KeyCode::Up => Intent::CursorUp,
        KeyCode::Char('g') => {
            if app.press_g() {
                Intent::CursorTop
            } else {
                return None;
            }
        }
        KeyCode::Char('G') => Intent::CursorBottom,
        KeyCode::Enter => Intent::PlaySelected,
        KeyCode::Char(' ') | KeyCode::Char('p') => Intent::PlayPause,
        KeyCode::Char('x') => Intent::Stop,
        KeyCode::Char('l') | KeyCode::Right => Intent::Next,
        KeyCode::Char('h') | KeyCode::Left => Intent::Prev,
        KeyCode::Char('L') => Intent::Scrub(Direction::Forward),
        KeyCode::Char('H') => Intent::Scrub(Direction::Backward),
        KeyCode::Char(c @ '0'..='9') => Intent::SeekTenth(c as u8 - b'0'),
        KeyCode::Char('+') | KeyCode::Char('=') => Intent::VolumeUp,
        KeyCode::Char('-') => Intent::VolumeDown,
        KeyCode::Char('m') => Intent::ToggleMute,
        KeyCode::Char('r') => Intent::ToggleRepeat,
        KeyCode::Char('s') => Intent::Shuffle,
        KeyCode::Char('/') => Intent::BeginInput(InputMode::Search),
        KeyCode::Char('o') => Intent::BeginInput(InputMode::OpenDir),
        KeyCode::Char('u') => Intent::BeginInput(InputMode::Url),
        _ => return None,
    };
    Some(intent)
}

fn prompt_intent(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Esc => Some(Intent::CancelInput),
        KeyCode::Enter => Some(Intent::SubmitInput),
        KeyCode::Backspace => Some(Intent::InputBackspace),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Intent::CancelInput)
        }
        KeyCode::Char(c) if !c.is_control() => Some(Intent::InputChar(c)),
        _ => None,
    }
}
