use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, ChipSpan, Field, HitTarget};
use crate::catalog::Catalogs;
use crate::select::{Choice, SearchSelect, Selection};
use crate::widgets::{
    field_block, field_title, highlight_substring, push_input_caret, push_selection_cursor,
    UiColors,
};

/// Main render function called from the event loop.
///
/// Takes the app mutably so click regions and chip spans can be registered
/// from the same geometry that gets drawn.
pub fn render(frame: &mut Frame, app: &mut App) {
    let colors = UiColors::from_palette(&app.palette());
    let area = frame.area();

    app.click_regions.clear();
    app.chip_spans.clear();

    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        area,
    );

    // Top-level vertical layout:
    //   [title bar]
    //   [form]
    //   [help / status bar]
    //   [session preview]
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(2),
            Constraint::Length(3),
        ])
        .split(area);

    render_title_bar(frame, &colors, outer[0]);
    render_form(frame, app, &colors, outer[1]);
    render_help_bar(frame, app, &colors, outer[2]);
    render_preview(frame, app, &colors, outer[3]);
}

fn render_title_bar(frame: &mut Frame, colors: &UiColors, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " Interview Coach ",
            Style::default()
                .fg(colors.field)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "· set up a practice session",
            Style::default().fg(colors.help),
        ),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().bg(colors.bar_bg));
    frame.render_widget(paragraph, area);
}

fn render_form(frame: &mut Frame, app: &mut App, colors: &UiColors, area: Rect) {
    // Center the form in a fixed-width column.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(64),
            Constraint::Min(0),
        ])
        .split(area);
    let form = columns[1];

    let role_panel = panel_height(&app.role_select, &app.catalogs.roles, &app.role);
    let stack_panel = panel_height(&app.stack_select, &app.catalogs.stacks, &app.stack);
    let chips = if app.stack.is_empty() { 0 } else { 1 };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(role_panel),
            Constraint::Length(app.catalogs.levels.len() as u16 + 2),
            Constraint::Length(3),
            Constraint::Length(stack_panel),
            Constraint::Length(chips),
            Constraint::Length(app.catalogs.modes.len() as u16 + 2),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(form);

    render_role_field(frame, app, colors, rows[0], rows[1]);
    render_level_list(frame, app, colors, rows[2]);
    render_stack_field(frame, app, colors, rows[3], rows[4], rows[5]);
    render_mode_list(frame, app, colors, rows[6]);
    render_start_button(frame, app, colors, rows[7]);
}

/// Rows needed for a widget's suggestion panel: the visible options (or the
/// single placeholder row) plus borders, zero when closed.
fn panel_height(select: &SearchSelect, catalog: &[Choice], value: &Selection) -> u16 {
    if !select.is_open() {
        return 0;
    }
    select.visible(catalog, value).len().max(1) as u16 + 2
}

fn render_role_field(
    frame: &mut Frame,
    app: &mut App,
    colors: &UiColors,
    input_area: Rect,
    panel_area: Rect,
) {
    let focused = app.focus() == Field::Role;
    let needs_value = app.role_select.is_required() && app.role.is_empty();

    let mut spans = Vec::new();
    if focused {
        push_input_caret(
            &mut spans,
            app.role_select.buffer(),
            app.role_select.input.cursor_pos,
            colors,
        );
    } else if !app.role_select.buffer().is_empty() {
        spans.push(Span::styled(
            app.role_select.buffer().to_string(),
            Style::default().fg(colors.value),
        ));
    }
    if app.role_select.buffer().is_empty() {
        match &app.role {
            Selection::Single(Some(id)) => spans.push(Span::styled(
                Catalogs::label_for(&app.catalogs.roles, id).to_string(),
                Style::default().fg(colors.value),
            )),
            _ => spans.push(Span::styled(
                "Search roles...",
                Style::default().fg(colors.help),
            )),
        }
    }

    let block = field_block(field_title("Role", needs_value), focused, colors);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), input_area);
    app.click_regions.register(input_area, HitTarget::RoleInput);

    if app.role_select.is_open() && panel_area.height > 0 {
        let items = option_items(
            &app.role_select,
            &app.catalogs.roles,
            &app.role,
            colors,
        );
        let block = Block::bordered().border_style(Style::default().fg(colors.active_border));
        frame.render_widget(List::new(items).block(block), panel_area);
        app.click_regions.register(panel_area, HitTarget::RolePanel);
    }
}

fn render_stack_field(
    frame: &mut Frame,
    app: &mut App,
    colors: &UiColors,
    input_area: Rect,
    panel_area: Rect,
    chips_area: Rect,
) {
    let focused = app.focus() == Field::Stack;
    let needs_value = app.stack_select.is_required() && app.stack.is_empty();

    let mut spans = Vec::new();
    if focused {
        push_input_caret(
            &mut spans,
            app.stack_select.buffer(),
            app.stack_select.input.cursor_pos,
            colors,
        );
    } else if !app.stack_select.buffer().is_empty() {
        spans.push(Span::styled(
            app.stack_select.buffer().to_string(),
            Style::default().fg(colors.value),
        ));
    }
    if app.stack_select.buffer().is_empty() {
        spans.push(Span::styled(
            "Search tech stacks...",
            Style::default().fg(colors.help),
        ));
    }

    let block = field_block(field_title("Tech Stack", needs_value), focused, colors);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), input_area);
    app.click_regions.register(input_area, HitTarget::StackInput);

    if app.stack_select.is_open() && panel_area.height > 0 {
        let items = option_items(
            &app.stack_select,
            &app.catalogs.stacks,
            &app.stack,
            colors,
        );
        let block = Block::bordered().border_style(Style::default().fg(colors.active_border));
        frame.render_widget(List::new(items).block(block), panel_area);
        app.click_regions
            .register(panel_area, HitTarget::StackPanel);
    }

    if chips_area.height > 0 {
        render_stack_chips(frame, app, colors, chips_area);
    }
}

/// Rows for a suggestion panel: matched options with the highlight cursor,
/// or one non-interactive placeholder row explaining why the list is empty.
fn option_items(
    select: &SearchSelect,
    catalog: &[Choice],
    value: &Selection,
    colors: &UiColors,
) -> Vec<ListItem<'static>> {
    let visible = select.visible(catalog, value);
    if visible.is_empty() {
        let reason = select.empty_reason(catalog, value);
        return vec![ListItem::new(Line::from(Span::styled(
            format!("  {}", reason.message()),
            Style::default()
                .fg(colors.help)
                .add_modifier(Modifier::ITALIC),
        )))];
    }

    visible
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let is_highlighted = select.cursor() == Some(i);
            let mut spans = Vec::new();
            push_selection_cursor(&mut spans, is_highlighted, colors);

            let normal = Style::default().fg(colors.preview);
            let matched = Style::default()
                .fg(colors.value)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            spans.extend(highlight_substring(
                &choice.label,
                select.buffer(),
                normal,
                matched,
            ));

            let mut item = ListItem::new(Line::from(spans));
            if is_highlighted {
                item = item.style(Style::default().bg(colors.selected_bg));
            }
            item
        })
        .collect()
}

fn render_stack_chips(frame: &mut Frame, app: &mut App, colors: &UiColors, area: Rect) {
    let chip_style = Style::default().fg(colors.preview).bg(colors.chip_bg);
    let remove_style = Style::default()
        .fg(colors.required)
        .bg(colors.chip_bg)
        .add_modifier(Modifier::BOLD);

    let mut spans: Vec<Span> = Vec::new();
    let mut chips = Vec::new();
    let mut col = area.x;
    for id in app.stack.ids() {
        // Chips render in selection order; a stale id falls back to itself.
        let label = Catalogs::label_for(&app.catalogs.stacks, id);
        let width = label.chars().count() as u16;

        spans.push(Span::styled(format!(" {label} "), chip_style));
        spans.push(Span::styled("✕", remove_style));
        spans.push(Span::styled(" ", chip_style));
        spans.push(Span::raw(" "));

        let remove_col = col + width + 2;
        if remove_col < area.x + area.width {
            chips.push(ChipSpan {
                id: id.to_string(),
                remove_col,
            });
        }
        col += width + 5;
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
    app.chip_spans = chips;
    app.click_regions.register(area, HitTarget::StackChips);
}

fn render_level_list(frame: &mut Frame, app: &mut App, colors: &UiColors, area: Rect) {
    let focused = app.focus() == Field::Level;

    let items: Vec<ListItem> = app
        .catalogs
        .levels
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let is_selected = i == app.level_state.selected_index;
            let is_chosen = app.level.as_deref() == Some(choice.id.as_str());

            let mut spans = Vec::new();
            push_selection_cursor(&mut spans, is_selected && focused, colors);
            if is_chosen {
                spans.push(Span::styled(
                    "✓ ",
                    Style::default()
                        .fg(colors.value)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::raw("  "));
            }
            let mut style = Style::default().fg(colors.preview);
            if is_chosen {
                style = style.add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(choice.label.clone(), style));

            let mut item = ListItem::new(Line::from(spans));
            if is_selected && focused {
                item = item.style(Style::default().bg(colors.selected_bg));
            }
            item
        })
        .collect();

    let needs_value = app.level.is_none();
    let block = field_block(field_title("Level", needs_value), focused, colors);
    frame.render_widget(List::new(items).block(block), area);
    app.click_regions.register(area, HitTarget::LevelList);
}

fn render_mode_list(frame: &mut Frame, app: &mut App, colors: &UiColors, area: Rect) {
    let focused = app.focus() == Field::Mode;

    let items: Vec<ListItem> = app
        .catalogs
        .modes
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let is_selected = i == app.mode_state.selected_index;
            let is_chosen = app.mode.as_deref() == Some(mode.id.as_str());

            let mut spans = Vec::new();
            push_selection_cursor(&mut spans, is_selected && focused, colors);
            spans.push(Span::styled(
                if is_chosen { "◉ " } else { "○ " },
                Style::default().fg(mode.color),
            ));
            spans.push(Span::styled(
                mode.label.clone(),
                Style::default()
                    .fg(mode.color)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!("  {}", mode.description),
                Style::default().fg(colors.help),
            ));

            let mut item = ListItem::new(Line::from(spans));
            if is_selected && focused {
                item = item.style(Style::default().bg(colors.selected_bg));
            }
            item
        })
        .collect();

    let needs_value = app.mode.is_none();
    let block = field_block(field_title("Mode", needs_value), focused, colors);
    frame.render_widget(List::new(items).block(block), area);
    app.click_regions.register(area, HitTarget::ModeList);
}

fn render_start_button(frame: &mut Frame, app: &mut App, colors: &UiColors, area: Rect) {
    let focused = app.focus() == Field::Start;
    let ready = app.missing_fields().is_empty();

    let style = if ready {
        Style::default()
            .fg(colors.value)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.help)
    };
    let label = Paragraph::new(Line::from(Span::styled("Start Interview", style)))
        .alignment(Alignment::Center)
        .block(field_block(String::new(), focused, colors));
    frame.render_widget(label, area);
    app.click_regions.register(area, HitTarget::StartButton);
}

fn render_help_bar(frame: &mut Frame, app: &App, colors: &UiColors, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let hints = Line::from(Span::styled(
        " Tab fields · ↑/↓ move · Enter select · Esc close · Backspace remove · Ctrl+S start · q quit",
        Style::default().fg(colors.help),
    ));
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().bg(colors.bar_bg)),
        rows[0],
    );

    if let Some(status) = &app.status {
        let line = Line::from(Span::styled(
            format!(" {status}"),
            Style::default()
                .fg(colors.required)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), rows[1]);
    }
}

fn render_preview(frame: &mut Frame, app: &App, colors: &UiColors, area: Rect) {
    let line = match app.summary() {
        Some(summary) => Line::from(Span::styled(
            summary,
            Style::default()
                .fg(colors.preview)
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            "Fill the required fields to start",
            Style::default().fg(colors.help),
        )),
    };

    let block = Block::bordered()
        .border_style(Style::default().fg(colors.inactive_border))
        .title(" Session ")
        .title_style(Style::default().fg(colors.field).add_modifier(Modifier::BOLD));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Action;
    use crate::catalog::Catalogs;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn sample_app() -> App {
        App::new(Catalogs::builtin())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn render_to_string(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut output = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                let cell = &buffer[(x, y)];
                output.push_str(cell.symbol());
            }
            let trimmed = output.trim_end();
            output = trimmed.to_string();
            output.push('\n');
        }
        output
    }

    #[test]
    fn renders_the_full_form() {
        let mut app = sample_app();
        let output = render_to_string(&mut app, 100, 45);

        assert!(output.contains("Interview Coach"));
        assert!(output.contains("Role"));
        assert!(output.contains("Level"));
        assert!(output.contains("Tech Stack"));
        assert!(output.contains("Mode"));
        assert!(output.contains("Start Interview"));
        assert!(output.contains("Session"));
    }

    #[test]
    fn open_role_panel_lists_the_catalog() {
        let mut app = sample_app();
        let output = render_to_string(&mut app, 100, 45);

        assert!(output.contains("Frontend Developer"));
        assert!(output.contains("Security Engineer"));
    }

    #[test]
    fn required_markers_show_until_fields_are_filled() {
        let mut app = sample_app();
        let output = render_to_string(&mut app, 100, 45);
        assert!(output.contains("Role *"));

        app.set_role("backend");
        let output = render_to_string(&mut app, 100, 45);
        assert!(!output.contains("Role *"));
        assert!(output.contains("Backend Developer"));
    }

    #[test]
    fn unmatched_search_shows_the_no_options_placeholder() {
        let mut app = sample_app();
        type_str(&mut app, "zzz");
        let output = render_to_string(&mut app, 100, 45);
        assert!(output.contains("No options found"));
    }

    #[test]
    fn exhausted_multi_catalog_shows_the_all_selected_placeholder() {
        let mut app = sample_app();
        let all: Vec<String> = app.catalogs.stacks.iter().map(|c| c.id.clone()).collect();
        for id in all {
            app.add_stack(&id);
        }
        app.set_focus(Field::Stack);
        let output = render_to_string(&mut app, 100, 48);
        assert!(output.contains("All options already selected"));
    }

    #[test]
    fn chips_render_with_a_raw_id_fallback() {
        let mut app = sample_app();
        app.add_stack("go");
        app.add_stack("cobol");
        let output = render_to_string(&mut app, 100, 45);
        assert!(output.contains("Go"));
        assert!(output.contains("cobol"));
        assert_eq!(app.chip_spans.len(), 2);
    }

    #[test]
    fn preview_shows_the_summary_once_complete() {
        let mut app = sample_app();
        app.set_role("backend");
        app.set_level("senior");
        app.add_stack("go");
        app.set_mode("drill");
        let output = render_to_string(&mut app, 100, 45);
        assert!(output.contains("Senior Backend Developer · Go · Drill mode"));
    }

    #[test]
    fn status_line_reports_missing_fields() {
        let mut app = sample_app();
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Action::None
        );
        let output = render_to_string(&mut app, 100, 45);
        assert!(output.contains("Required:"));
    }

    #[test]
    fn clicking_a_rendered_option_row_commits_it() {
        let mut app = sample_app();
        // Render to register the real panel geometry, then press inside it.
        render_to_string(&mut app, 100, 45);
        let panel = app
            .click_regions
            .regions()
            .iter()
            .find(|r| r.data == HitTarget::RolePanel)
            .map(|r| r.area)
            .expect("open role panel registers a region");

        let press = crossterm::event::MouseEvent {
            kind: crossterm::event::MouseEventKind::Down(crossterm::event::MouseButton::Left),
            column: panel.x + 3,
            row: panel.y + 1,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(press);
        assert_eq!(app.role, Selection::Single(Some("frontend".into())));
    }
}
