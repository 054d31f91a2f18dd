use crate::app::StatusLevel;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub title: Color,
    pub url_accent: Color,
    pub url_border: Color,
    pub preset_accent: Color,
    pub preset_border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self {
            text: Color::Rgb(231, 235, 243),
            muted: Color::Rgb(170, 170, 170),
            border: Color::Rgb(88, 98, 120),
            title: Color::Rgb(4, 85, 221),
            url_accent: Color::Rgb(4, 245, 117),
            url_border: Color::Rgb(4, 213, 117),
            preset_accent: Color::Rgb(245, 4, 4),
            preset_border: Color::Rgb(213, 4, 4),
            success: Color::Rgb(103, 212, 142),
            warning: Color::Rgb(255, 198, 109),
            error: Color::Rgb(255, 121, 134),
        }
    }
}

impl ThemePalette {
    pub fn status_color(&self, level: StatusLevel) -> Color {
        match level {
            StatusLevel::Info => self.muted,
            StatusLevel::Success => self.success,
            StatusLevel::Warning => self.warning,
            StatusLevel::Error => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_colors_are_distinct() {
        let palette = ThemePalette::default();
        let colors = [
            StatusLevel::Info,
            StatusLevel::Success,
            StatusLevel::Warning,
            StatusLevel::Error,
        ]
        .map(|level| palette.status_color(level));
        for (idx, color) in colors.iter().enumerate() {
            assert!(!colors[idx + 1..].contains(color));
        }
        assert_eq!(palette.status_color(StatusLevel::Error), palette.error);
    }
}
