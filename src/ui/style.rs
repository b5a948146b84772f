//! Theming and color definitions.
//!
//! Preview lines arrive as flattened text, so styling keys off the
//! markers the flattener leaves behind (`#` prefixes, bullets). Colors are
//! ANSI so they follow the terminal's palette.

use ratatui::style::{Color, Modifier, Style};

use crate::highlight::HighlightBackground;

/// Style for one flattened preview line.
pub fn style_for_preview_line(line: &str, background: HighlightBackground) -> Style {
    let light_bg = background == HighlightBackground::Light;
    match heading_level(line) {
        Some(1) => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Cyan
            })
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        Some(2) => Style::default()
            .fg(if light_bg {
                Color::Indexed(22)
            } else {
                Color::Green
            })
            .add_modifier(Modifier::BOLD),
        Some(3) => Style::default()
            .fg(if light_bg {
                Color::Indexed(58)
            } else {
                Color::Yellow
            })
            .add_modifier(Modifier::BOLD),
        Some(_) => Style::default()
            .fg(if light_bg {
                Color::Indexed(54)
            } else {
                Color::Magenta
            })
            .add_modifier(Modifier::BOLD),
        None if line.starts_with("• ") => Style::default().fg(if light_bg {
            Color::Indexed(238)
        } else {
            Color::Indexed(252)
        }),
        None => Style::default(),
    }
}

/// Inline error block shown in place of a preview.
pub fn error_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub fn empty_state_style() -> Style {
    Style::default()
        .fg(Color::Indexed(245))
        .add_modifier(Modifier::ITALIC)
}

/// Selected text in the editor.
pub fn selection_style() -> Style {
    Style::default().bg(Color::Blue).fg(Color::White)
}

pub fn cursor_style() -> Style {
    Style::default().bg(Color::White).fg(Color::Black)
}

pub fn gutter_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn heading_level(line: &str) -> Option<usize> {
    let level = line.chars().take_while(|&c| c == '#').count();
    ((1..=6).contains(&level) && line[level..].starts_with(' ')).then_some(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels_get_distinct_styles() {
        let dark = HighlightBackground::Dark;
        let h1 = style_for_preview_line("# Title", dark);
        let h2 = style_for_preview_line("## Section", dark);
        assert_eq!(h1.fg, Some(Color::Cyan));
        assert!(h1.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(h2.fg, Some(Color::Green));
    }

    #[test]
    fn test_hash_without_space_is_not_a_heading() {
        let style = style_for_preview_line("#hashtag", HighlightBackground::Dark);
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_light_background_uses_indexed_colors() {
        let style = style_for_preview_line("# Title", HighlightBackground::Light);
        assert_eq!(style.fg, Some(Color::Indexed(24)));
    }
}
