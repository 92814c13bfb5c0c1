//! Multi-select popup widget for scoping questions to knowledge items

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{
        Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, StatefulWidget, Widget,
    },
};

/// Popup width cap
const MAX_POPUP_WIDTH: u16 = 80;

/// An entry in the selector
pub struct SelectorItem {
    /// Display label
    pub label: String,
    /// Optional description
    pub description: Option<String>,
    /// Whether this entry is part of the current selection
    pub checked: bool,
}

/// A popup list where entries can be toggled on and off
pub struct Selector<'a> {
    title: String,
    items: &'a [SelectorItem],
    selected: usize,
    theme: &'a Theme,
}

/// A `width` x `height` rect centered over `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

impl<'a> Selector<'a> {
    /// Create a new selector
    pub fn new(title: impl Into<String>, items: &'a [SelectorItem], theme: &'a Theme) -> Self {
        Self {
            title: title.into(),
            items,
            selected: 0,
            theme,
        }
    }

    /// Set the highlighted index
    pub fn with_selected(mut self, index: usize) -> Self {
        let last = self.items.len().saturating_sub(1);
        self.selected = index.min(last);
        self
    }

    /// Size the popup to the widest label, within limits
    fn popup_size(&self) -> (u16, u16) {
        let mut want = self.title.len() + 4;
        for item in self.items {
            want = want.max(item.label.len() + 6);
            if let Some(ref d) = item.description {
                want = want.max(d.len() + 8);
            }
        }
        let width = (want as u16).clamp(20, MAX_POPUP_WIDTH);
        let height = (self.items.len() as u16 + 2).min(20);
        (width, height)
    }

    /// One styled row: a check marker, the label, then the description
    fn row(&self, item: &SelectorItem, is_highlighted: bool) -> ListItem<'static> {
        let marker = if item.checked { "● " } else { "○ " };
        let style = if is_highlighted {
            Style::default()
                .bg(self.theme.accent)
                .fg(self.theme.bg)
                .add_modifier(Modifier::BOLD)
        } else if item.checked {
            self.theme.accent_style()
        } else {
            self.theme.base_style()
        };
        let content = match item.description {
            Some(ref d) => format!("{}{}  {}", marker, item.label, d),
            None => format!("{}{}", marker, item.label),
        };
        ListItem::new(Span::styled(content, style))
    }

    /// Draw the popup centered over `area`
    pub fn render_centered(&self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.popup_size();
        let popup = centered(area, width, height);

        Clear.render(popup, buf);

        let rows: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| self.row(item, i == self.selected))
            .collect();

        let list = List::new(rows)
            .block(
                Block::default()
                    .title(format!(" {} ", self.title))
                    .title_style(self.theme.accent_bold())
                    .borders(Borders::ALL)
                    .border_style(self.theme.accent_style()),
            )
            .highlight_spacing(HighlightSpacing::Always);

        let mut cursor = ListState::default();
        cursor.select(Some(self.selected));
        StatefulWidget::render(list, popup, buf, &mut cursor);
    }
}

/// Open/closed state of the popup plus the highlight position
#[derive(Default)]
pub struct SelectorState {
    /// Currently highlighted index
    pub selected: usize,
    /// Whether the popup is open
    pub visible: bool,
}

impl SelectorState {
    /// Open the popup with the highlight at the top
    pub fn show(&mut self) {
        self.selected = 0;
        self.visible = true;
    }

    /// Close the popup
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Move the highlight up, wrapping at the top
    pub fn up(&mut self, item_count: usize) {
        if item_count > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(item_count - 1);
        }
    }

    /// Move the highlight down, wrapping at the bottom
    pub fn down(&mut self, item_count: usize) {
        if item_count > 0 {
            self.selected = (self.selected + 1) % item_count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_wraps_both_directions() {
        let mut state = SelectorState::default();
        state.show();

        state.up(3);
        assert_eq!(state.selected, 2);
        state.down(3);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_empty_listing_is_inert() {
        let mut state = SelectorState::default();
        state.up(0);
        state.down(0);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_with_selected_clamps_to_last_item() {
        let theme = Theme::dark();
        let items = vec![
            SelectorItem {
                label: "[3] quarterly report".to_string(),
                description: None,
                checked: false,
            },
            SelectorItem {
                label: "[9] onboarding guide".to_string(),
                description: None,
                checked: true,
            },
        ];
        let selector = Selector::new("pick", &items, &theme).with_selected(10);
        assert_eq!(selector.selected, 1);
    }
}
