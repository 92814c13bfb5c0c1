//! docq-tui: Terminal UI components
//!
//! Lightweight terminal UI building blocks on ratatui and crossterm:
//! a conversation transcript, a single-line input box with history
//! recall, a multi-select popup, and an animated spinner.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
