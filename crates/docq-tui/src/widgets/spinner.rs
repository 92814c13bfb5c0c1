//! Animated activity indicator.

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use std::time::Instant;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_MS: u128 = 80;

/// Pick the braille frame for a point in time, in milliseconds.
pub(crate) fn frame_at(elapsed_ms: u128) -> &'static str {
    FRAMES[(elapsed_ms / FRAME_MS) as usize % FRAMES.len()]
}

/// One-line activity indicator with a label, drawn in the accent color.
pub struct Spinner<'a> {
    label: &'a str,
    theme: &'a Theme,
    start_time: Instant,
}

impl<'a> Spinner<'a> {
    pub fn new(label: &'a str, theme: &'a Theme) -> Self {
        Self {
            label,
            theme,
            start_time: Instant::now(),
        }
    }

    /// Anchor the animation to an external clock so redraws do not
    /// restart it.
    pub fn with_start_time(mut self, start: Instant) -> Self {
        self.start_time = start;
        self
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 {
            return;
        }

        let frame = frame_at(self.start_time.elapsed().as_millis());
        let span = Span::styled(
            format!("{} {}", frame, self.label),
            self.theme.accent_style(),
        );
        buf.set_span(area.x, area.y, &span, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_advances_and_wraps() {
        assert_eq!(frame_at(0), FRAMES[0]);
        assert_ne!(frame_at(0), frame_at(FRAME_MS));
        assert_eq!(frame_at(0), frame_at(FRAME_MS * FRAMES.len() as u128));
    }
}
