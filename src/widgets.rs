//! Reusable UI helpers for the form renderer.
//!
//! These extract the styling patterns shared by the search-select widgets and
//! the plain pickers so every field looks and behaves consistently.

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Padding},
};
use ratatui_themes::ThemePalette;

/// Semantic color palette derived from the active theme.
/// Maps abstract UI roles to concrete `Color` values.
pub struct UiColors {
    pub field: Color,
    pub value: Color,
    pub required: Color,
    pub help: Color,
    pub active_border: Color,
    pub inactive_border: Color,
    pub selected_bg: Color,
    pub chip_bg: Color,
    pub preview: Color,
    pub bg: Color,
    pub bar_bg: Color,
}

impl UiColors {
    pub fn from_palette(p: &ThemePalette) -> Self {
        let bar_bg = match p.bg {
            Color::Rgb(r, g, b) => Color::Rgb(
                r.saturating_add(10),
                g.saturating_add(10),
                b.saturating_add(15),
            ),
            _ => Color::Rgb(30, 30, 40),
        };

        let selected_bg = match p.selection {
            Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
            _ => Color::Rgb(40, 40, 60),
        };

        let chip_bg = match p.selection {
            Color::Rgb(r, g, b) => Color::Rgb(
                r.saturating_sub(10),
                g.saturating_add(5),
                b.saturating_add(10),
            ),
            _ => Color::Rgb(30, 45, 55),
        };

        Self {
            field: p.info,
            value: p.accent,
            required: p.error,
            help: p.muted,
            active_border: p.accent,
            inactive_border: p.muted,
            selected_bg,
            chip_bg,
            preview: p.fg,
            bg: p.bg,
            bar_bg,
        }
    }
}

/// Build a field title, appending the required marker when the field still
/// needs a value.
pub fn field_title(name: &str, needs_value: bool) -> String {
    if needs_value {
        format!(" {name} * ")
    } else {
        format!(" {name} ")
    }
}

/// Styled `Block` for a form field with consistent border and title styling.
pub fn field_block(title: String, focused: bool, colors: &UiColors) -> Block<'static> {
    let border = if focused {
        colors.active_border
    } else {
        colors.inactive_border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
        .title_style(Style::default().fg(border).add_modifier(Modifier::BOLD))
        .padding(Padding::horizontal(1))
}

/// Push the highlight indicator (`▶ ` or `  `) onto spans.
pub fn push_selection_cursor<'a>(spans: &mut Vec<Span<'a>>, is_selected: bool, colors: &UiColors) {
    if is_selected {
        spans.push(Span::styled(
            "▶ ",
            Style::default()
                .fg(colors.active_border)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled("  ", Style::default()));
    }
}

/// Push the search buffer with a caret at `cursor_pos` (a char index).
pub fn push_input_caret(
    spans: &mut Vec<Span<'static>>,
    text: &str,
    cursor_pos: usize,
    colors: &UiColors,
) {
    let chars: Vec<char> = text.chars().collect();
    let split = cursor_pos.min(chars.len());
    let before: String = chars[..split].iter().collect();
    let after: String = chars[split..].iter().collect();

    spans.push(Span::styled(before, Style::default().fg(colors.value)));
    spans.push(Span::styled(
        "▎",
        Style::default()
            .fg(colors.value)
            .add_modifier(Modifier::SLOW_BLINK),
    ));
    spans.push(Span::styled(after, Style::default().fg(colors.value)));
}

/// First case-insensitive occurrence of `needle` in `haystack`, as char
/// indices. Empty needles never match.
fn find_ci(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
    })
}

/// Build spans with the matched substring highlighted.
///
/// The filter matches on a single contiguous case-insensitive substring, so
/// the highlight is at most one range.
pub fn highlight_substring(
    text: &str,
    pattern: &str,
    normal_style: Style,
    highlight_style: Style,
) -> Vec<Span<'static>> {
    let chars: Vec<char> = text.chars().collect();
    let needle: Vec<char> = pattern.chars().collect();

    let Some(start) = find_ci(&chars, &needle) else {
        return vec![Span::styled(text.to_string(), normal_style)];
    };
    let end = start + needle.len();

    let mut spans = Vec::new();
    if start > 0 {
        let before: String = chars[..start].iter().collect();
        spans.push(Span::styled(before, normal_style));
    }
    let matched: String = chars[start..end].iter().collect();
    spans.push(Span::styled(matched, highlight_style));
    if end < chars.len() {
        let after: String = chars[end..].iter().collect();
        spans.push(Span::styled(after, normal_style));
    }
    spans
}
