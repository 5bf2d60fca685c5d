use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Mode};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Next,
    Previous,
    /// Show or hide the carousel's context
    ToggleVisible,
    ShowHelp,
    ExitMode,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    if app.mode == Mode::Help {
        // Any key exits help
        return match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
            _ => Action::ExitMode,
        };
    }

    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Rotation
        (KeyCode::Char('l'), KeyModifiers::NONE) => Action::Next,
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::Next,
        (KeyCode::Right, _) => Action::Next,
        (KeyCode::Char('h'), KeyModifiers::NONE) => Action::Previous,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::Previous,
        (KeyCode::Left, _) => Action::Previous,

        (KeyCode::Char('p'), KeyModifiers::NONE) => Action::ToggleVisible,
        (KeyCode::Char('?'), _) => Action::ShowHelp,
        (KeyCode::Esc, _) => Action::ExitMode,

        _ => Action::None,
    }
}
