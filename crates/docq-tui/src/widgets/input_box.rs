//! Text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Single-line text input with submit history.
///
/// The cursor is a byte offset into `content` and always sits on a char
/// boundary, so editing never recounts the string.
#[derive(Debug, Default)]
pub struct InputBox {
    /// Current input text
    content: String,
    /// Cursor position, a byte offset into `content`
    cursor: usize,
    /// Horizontal scroll offset (in display columns)
    scroll: usize,
    /// Placeholder text
    placeholder: String,
    /// Whether the input is focused
    focused: bool,
    /// Previously submitted lines, oldest first
    history: Vec<String>,
    /// Index into history while browsing, None when editing a fresh line
    history_pos: Option<usize>,
    /// Draft stashed while browsing history
    stash: String,
}

impl InputBox {
    /// Create a new input box
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set focus state
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content, leaving the cursor at the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.len();
        self.update_scroll(80); // Default width
    }

    /// Clear the content and leave history browsing
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
        self.history_pos = None;
        self.stash.clear();
    }

    /// Record a submitted line for later recall. Consecutive duplicates
    /// are collapsed.
    pub fn push_history(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if entry.is_empty() {
            return;
        }
        if self.history.last() != Some(&entry) {
            self.history.push(entry);
        }
        self.history_pos = None;
    }

    /// Recall the previous history entry (Up). Returns false at the
    /// oldest entry or when there is no history.
    pub fn history_prev(&mut self, width: u16) -> bool {
        let pos = match self.history_pos {
            None if self.history.is_empty() => return false,
            None => {
                self.stash = std::mem::take(&mut self.content);
                self.history.len() - 1
            }
            Some(0) => return false,
            Some(i) => i - 1,
        };
        self.history_pos = Some(pos);
        self.content = self.history[pos].clone();
        self.cursor = self.content.len();
        self.update_scroll(width as usize);
        true
    }

    /// Move towards the newest history entry (Down), restoring the
    /// stashed draft past the end.
    pub fn history_next(&mut self, width: u16) -> bool {
        let Some(pos) = self.history_pos else {
            return false;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            self.content = self.history[pos + 1].clone();
        } else {
            self.history_pos = None;
            self.content = std::mem::take(&mut self.stash);
        }
        self.cursor = self.content.len();
        self.update_scroll(width as usize);
        true
    }

    /// Byte index where the char before the cursor starts
    fn prev_char_start(&self) -> Option<usize> {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Display column of the cursor
    fn cursor_col(&self) -> usize {
        self.content[..self.cursor].width()
    }

    /// Apply an editing action; returns whether the widget consumed it.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let width = width as usize;

        match action {
            Action::Char(c) => {
                self.insert_char(*c);
                self.update_scroll(width);
                true
            }
            Action::Backspace => match self.prev_char_start() {
                Some(start) => {
                    self.content.remove(start);
                    self.cursor = start;
                    self.update_scroll(width);
                    true
                }
                None => false,
            },
            Action::Delete => {
                if self.cursor < self.content.len() {
                    self.content.remove(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => match self.prev_char_start() {
                Some(start) => {
                    self.cursor = start;
                    self.update_scroll(width);
                    true
                }
                None => false,
            },
            Action::Right => match self.content[self.cursor..].chars().next() {
                Some(c) => {
                    self.cursor += c.len_utf8();
                    self.update_scroll(width);
                    true
                }
                None => false,
            },
            Action::Home => {
                self.cursor = 0;
                self.update_scroll(width);
                true
            }
            Action::End => {
                self.cursor = self.content.len();
                self.update_scroll(width);
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                // Drop the word before the cursor along with any spaces
                // between it and the cursor
                let head = self.content[..self.cursor].trim_end_matches(' ');
                let start = head.rfind(' ').map_or(0, |i| i + 1);
                self.content.replace_range(start..self.cursor, "");
                self.cursor = start;
                self.update_scroll(width);
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    // Single line: runs of newlines become one space
                    if c == '\n' || c == '\r' {
                        if self.cursor > 0 && !self.content[..self.cursor].ends_with(' ') {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                self.update_scroll(width);
                true
            }
            _ => false,
        }
    }

    fn update_scroll(&mut self, width: usize) {
        let visible = width.saturating_sub(4); // Borders and padding
        let col = self.cursor_col();

        if col < self.scroll {
            self.scroll = col;
        } else if col >= self.scroll + visible {
            self.scroll = col + 1 - visible;
        }
    }

    /// The slice of `content` on screen after horizontal scrolling.
    fn visible_window(&self, width: usize) -> &str {
        let mut col = 0;
        let mut start = self.content.len();
        for (i, c) in self.content.char_indices() {
            if col >= self.scroll {
                start = i;
                break;
            }
            col += c.width().unwrap_or(0);
        }

        let tail = &self.content[start..];
        let mut taken = 0;
        for (i, c) in tail.char_indices() {
            let w = c.width().unwrap_or(0);
            if taken + w > width {
                return &tail[..i];
            }
            taken += w;
        }
        tail
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });
        let inner = block.inner(area);
        block.render(area, buf);

        let empty = self.content.is_empty();
        let display_text = if empty {
            self.placeholder.as_str()
        } else {
            self.visible_window(inner.width as usize)
        };
        let style = if empty {
            theme.dim_style()
        } else {
            theme.base_style()
        };
        Paragraph::new(display_text).style(style).render(inner, buf);

        // Block cursor, drawn by restyling the cell under it
        if self.focused && inner.width > 0 {
            let cursor_x = self.cursor_col().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                let pos = (inner.x + cursor_x as u16, inner.y);
                if let Some(cell) = buf.cell_mut(pos) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c), 80);
        }
        input
    }

    // --- editing ---

    #[test]
    fn test_backspace_removes_whole_chars() {
        let mut input = typed("héllo");
        for _ in 0..4 {
            assert!(input.handle_action(&Action::Backspace, 80));
        }
        assert_eq!(input.content(), "h");
    }

    #[test]
    fn test_backspace_at_start_is_ignored() {
        let mut input = InputBox::new();
        assert!(!input.handle_action(&Action::Backspace, 80));
    }

    #[test]
    fn test_delete_removes_under_cursor() {
        let mut input = typed("abc");
        input.handle_action(&Action::Home, 80);
        assert!(input.handle_action(&Action::Delete, 80));
        assert_eq!(input.content(), "bc");

        input.handle_action(&Action::End, 80);
        assert!(!input.handle_action(&Action::Delete, 80));
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut input = typed("ab");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Char('x'), 80);
        assert_eq!(input.content(), "axb");
    }

    #[test]
    fn test_delete_word_takes_trailing_spaces() {
        let mut input = typed("upload report.pdf  ");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "upload ");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "");
    }

    #[test]
    fn test_paste_collapses_newlines() {
        let mut input = typed("q:");
        input.handle_action(&Action::Paste(" first\r\nsecond".to_string()), 80);
        assert_eq!(input.content(), "q: first second");
    }

    // --- history recall ---

    #[test]
    fn test_history_recall_preserves_draft() {
        let mut input = InputBox::new();
        input.push_history("first");
        input.push_history("second");
        input.set_content("draft");

        assert!(input.history_prev(80));
        assert_eq!(input.content(), "second");
        assert!(input.history_prev(80));
        assert_eq!(input.content(), "first");
        assert!(!input.history_prev(80));

        assert!(input.history_next(80));
        assert_eq!(input.content(), "second");
        assert!(input.history_next(80));
        assert_eq!(input.content(), "draft");
        assert!(!input.history_next(80));
    }

    #[test]
    fn test_history_collapses_consecutive_duplicates() {
        let mut input = InputBox::new();
        input.push_history("same");
        input.push_history("same");

        assert!(input.history_prev(80));
        assert!(!input.history_prev(80));
    }

    // --- scrolling ---

    #[test]
    fn test_scroll_follows_cursor() {
        let mut input = InputBox::new();
        for _ in 0..40 {
            input.handle_action(&Action::Char('x'), 20);
        }
        assert_eq!(input.scroll, 25);

        input.handle_action(&Action::Home, 20);
        assert_eq!(input.scroll, 0);
    }
}
