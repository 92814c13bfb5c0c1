//! Keyboard handling.
//!
//! Frontends work in terms of [`Action`]s rather than raw key codes, so
//! the whole keymap lives in one table.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter/submit
    Submit,
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Move cursor left
    Left,
    /// Move cursor right
    Right,
    /// Move cursor up
    Up,
    /// Move cursor down
    Down,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Escape
    Escape,
    /// Ctrl+C (interrupt)
    Interrupt,
    /// Ctrl+D (EOF)
    Eof,
    /// Ctrl+L (clear screen)
    Clear,
    /// Ctrl+U (clear line)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Paste (from clipboard or bracketed paste)
    Paste(String),
    /// Quit application
    Quit,
    /// Open the knowledge scope selector
    KnowledgeSelect,
    /// Unknown/unhandled
    Unknown,
}

/// Map a key event to an action. Ctrl takes precedence over Alt; bare
/// Alt chords are unbound.
pub fn key_to_action(event: KeyEvent) -> Action {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    if !ctrl && event.modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    match (ctrl, event.code) {
        (true, KeyCode::Char('c')) => Action::Interrupt,
        (true, KeyCode::Char('d')) => Action::Eof,
        (true, KeyCode::Char('l')) => Action::Clear,
        (true, KeyCode::Char('u')) => Action::ClearLine,
        (true, KeyCode::Char('w')) => Action::DeleteWord,
        (true, KeyCode::Char('a')) => Action::Home,
        (true, KeyCode::Char('e')) => Action::End,
        (true, KeyCode::Char('q')) => Action::Quit,
        (true, KeyCode::Char('k')) => Action::KnowledgeSelect,
        (true, _) => Action::Unknown,
        (false, KeyCode::Char(c)) => Action::Char(c),
        (false, KeyCode::Enter) => Action::Submit,
        (false, KeyCode::Backspace) => Action::Backspace,
        (false, KeyCode::Delete) => Action::Delete,
        (false, KeyCode::Left) => Action::Left,
        (false, KeyCode::Right) => Action::Right,
        (false, KeyCode::Up) => Action::Up,
        (false, KeyCode::Down) => Action::Down,
        (false, KeyCode::Home) => Action::Home,
        (false, KeyCode::End) => Action::End,
        (false, KeyCode::PageUp) => Action::PageUp,
        (false, KeyCode::PageDown) => Action::PageDown,
        (false, KeyCode::Esc) => Action::Escape,
        (false, _) => Action::Unknown,
    }
}
