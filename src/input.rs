//! Key bindings: arrows move/rotate, q / Esc / Ctrl-C quit.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Quit,
    None,
}

/// Map key event to game action. Only presses count; release and repeat reports are ignored.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = key;
    if kind != KeyEventKind::Press {
        return Action::None;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    match code {
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Left if no_mod => Action::MoveLeft,
        KeyCode::Right if no_mod => Action::MoveRight,
        KeyCode::Down if no_mod => Action::SoftDrop,
        KeyCode::Up if no_mod => Action::Rotate,
        _ => Action::None,
    }
}
