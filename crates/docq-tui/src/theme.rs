//! Terminal color palette.

use ratatui::style::{Color, Modifier, Style};

/// Palette shared by every widget.
///
/// Widgets take a `&Theme` at render time instead of owning colors, so a
/// frontend can swap palettes without rebuilding its widget tree.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (highlights, prompts)
    pub accent: Color,
    /// Error color
    pub error: Color,
    /// Success color
    pub success: Color,
    /// Warning color
    pub warning: Color,
    /// Border color
    pub border: Color,
}

fn tint(color: Color) -> Style {
    Style::default().fg(color)
}

impl Theme {
    /// Dark palette, used unless the config says otherwise. `bg` stays
    /// `Reset` so the terminal's own background shows through.
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            border: Color::DarkGray,
        }
    }

    /// Palette for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            // Plain yellow is unreadable on white
            warning: Color::Rgb(180, 120, 0),
            border: Color::Gray,
            ..Self::dark()
        }
    }

    /// Look up a palette by its config name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Get base style
    pub fn base_style(&self) -> Style {
        tint(self.fg).bg(self.bg)
    }

    /// Get dimmed style
    pub fn dim_style(&self) -> Style {
        tint(self.dim)
    }

    /// Get accent style
    pub fn accent_style(&self) -> Style {
        tint(self.accent)
    }

    /// Get bold accent style
    pub fn accent_bold(&self) -> Style {
        tint(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Get error style
    pub fn error_style(&self) -> Style {
        tint(self.error)
    }

    /// Get success style
    pub fn success_style(&self) -> Style {
        tint(self.success)
    }

    /// Get warning style
    pub fn warning_style(&self) -> Style {
        tint(self.warning)
    }

    /// Get border style
    pub fn border_style(&self) -> Style {
        tint(self.border)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_resolves_known_palettes() {
        assert_eq!(Theme::from_name("dark").unwrap().fg, Color::White);
        assert_eq!(Theme::from_name("light").unwrap().fg, Color::Black);
        assert!(Theme::from_name("solarized").is_none());
    }

    #[test]
    fn test_default_is_dark() {
        assert_eq!(Theme::default().bg, Color::Reset);
    }
}
