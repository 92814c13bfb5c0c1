//! Transcript widget for displaying question/answer exchanges

use crate::theme::Theme;
use crate::widgets::spinner::frame_at;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use textwrap;

/// A single entry in the conversation transcript
#[derive(Debug, Clone)]
pub enum TranscriptEntry {
    /// A question and its (possibly still streaming) answer
    Exchange {
        question: String,
        answer: String,
        streaming: bool,
        response_time_ms: Option<u64>,
    },
    /// A status or error notice interleaved with the conversation
    Notice { text: String, is_error: bool },
}

impl TranscriptEntry {
    /// Create a fresh exchange with an empty, streaming answer
    pub fn exchange(question: impl Into<String>) -> Self {
        Self::Exchange {
            question: question.into(),
            answer: String::new(),
            streaming: true,
            response_time_ms: None,
        }
    }

    /// Create an informational notice
    pub fn notice(text: impl Into<String>) -> Self {
        Self::Notice {
            text: text.into(),
            is_error: false,
        }
    }

    /// Create an error notice
    pub fn error(text: impl Into<String>) -> Self {
        Self::Notice {
            text: text.into(),
            is_error: true,
        }
    }

    /// Whether this entry is an exchange with a live answer stream
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Exchange { streaming: true, .. })
    }
}

/// Render one entry into styled lines. Shared by the widget and the
/// height calculation so the two can never disagree.
fn render_entry(entry: &TranscriptEntry, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let content_width = width.saturating_sub(2);

    match entry {
        TranscriptEntry::Exchange {
            question,
            answer,
            streaming,
            response_time_ms,
        } => {
            lines.push(Line::from(Span::styled("▶ You", theme.accent_bold())));
            for line in textwrap::wrap(question, content_width) {
                lines.push(Line::from(Span::styled(
                    format!("  {}", line),
                    theme.base_style(),
                )));
            }
            lines.push(Line::from(""));

            let header = if *streaming { "◀ DocQ ▌" } else { "◀ DocQ" };
            lines.push(Line::from(Span::styled(
                header,
                theme.success_style().add_modifier(Modifier::BOLD),
            )));

            if answer.is_empty() && *streaming {
                // Animated thinking indicator while no content has arrived
                let now_ms = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis();
                lines.push(Line::from(Span::styled(
                    format!("  {} thinking...", frame_at(now_ms)),
                    theme.warning_style(),
                )));
            } else {
                for line in textwrap::wrap(answer, content_width) {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", line),
                        theme.base_style(),
                    )));
                }
                if let Some(ms) = response_time_ms {
                    lines.push(Line::from(Span::styled(
                        format!("  · {} ms", ms),
                        theme.dim_style(),
                    )));
                }
            }
            lines.push(Line::from(""));
        }
        TranscriptEntry::Notice { text, is_error } => {
            lines.push(Line::from(Span::styled("● docq", theme.dim_style())));
            let style = if *is_error {
                theme.error_style()
            } else {
                theme.base_style()
            };
            for line in textwrap::wrap(text, content_width) {
                lines.push(Line::from(Span::styled(format!("  {}", line), style)));
            }
            lines.push(Line::from(""));
        }
    }

    lines
}

/// Widget for displaying the conversation transcript
pub struct Transcript<'a> {
    entries: &'a [TranscriptEntry],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> Transcript<'a> {
    /// Create a new transcript view
    pub fn new(entries: &'a [TranscriptEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for Transcript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::NONE);

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();

        for entry in self.entries {
            all_lines.extend(render_entry(entry, self.theme, width));
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(inner.height as usize)
            .collect();

        let paragraph = Paragraph::new(visible_lines).wrap(Wrap { trim: false });
        paragraph.render(inner, buf);
    }
}

/// Calculate the total rendered height of the transcript
pub fn calculate_transcript_height(entries: &[TranscriptEntry], width: usize) -> usize {
    let theme = Theme::dark();
    entries
        .iter()
        .map(|entry| render_entry(entry, &theme, width).len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_streaming_exchange_shows_thinking() {
        let entry = TranscriptEntry::exchange("What is X?");
        let lines = render_entry(&entry, &Theme::dark(), 80);
        assert!(lines.iter().any(|l| line_text(l).contains("thinking")));
    }

    #[test]
    fn test_committed_exchange_shows_response_time() {
        let entry = TranscriptEntry::Exchange {
            question: "What is X?".to_string(),
            answer: "X is a thing.".to_string(),
            streaming: false,
            response_time_ms: Some(1532),
        };
        let lines = render_entry(&entry, &Theme::dark(), 80);
        assert!(lines.iter().any(|l| line_text(l).contains("1532 ms")));
    }

    #[test]
    fn test_height_matches_rendered_lines() {
        let entries = vec![
            TranscriptEntry::exchange("short question"),
            TranscriptEntry::notice("scope set to 3 items"),
            TranscriptEntry::error("upload failed"),
        ];
        let total: usize = entries
            .iter()
            .map(|e| render_entry(e, &Theme::dark(), 40).len())
            .sum();
        assert_eq!(calculate_transcript_height(&entries, 40), total);
    }

    #[test]
    fn test_narrow_width_wraps_answer() {
        let entry = TranscriptEntry::Exchange {
            question: "q".to_string(),
            answer: "a long answer that will certainly not fit on one narrow line".to_string(),
            streaming: false,
            response_time_ms: None,
        };
        let narrow = render_entry(&entry, &Theme::dark(), 20).len();
        let wide = render_entry(&entry, &Theme::dark(), 200).len();
        assert!(narrow > wide);
    }
}
