use crate::app::App;
use crate::input::{InputKind, TextField};
use crate::selection::Selection;
use crate::theme::ThemePalette;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

const GLYPH_ACTIVE: &str = "▸";
const GLYPH_CONFIRMED: &str = "◉";
const GLYPH_BULLET: &str = "•";

/// Renders the whole screen from the current session state.
pub fn draw(frame: &mut Frame<'_>, app: &App, theme: &ThemePalette) {
    match app.mode().input() {
        Some((kind, field)) => draw_input(frame, kind, field, theme),
        None => draw_lists(frame, app, theme),
    }
}

fn draw_lists(frame: &mut Frame<'_>, app: &App, theme: &ThemePalette) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Quick Stream",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        layout[0],
    );

    draw_list_panel(
        frame,
        layout[1],
        app.urls(),
        ("Stream URLs", "-No urls-"),
        (theme.url_accent, theme.url_border),
        theme,
    );
    draw_list_panel(
        frame,
        layout[2],
        app.presets(),
        ("Presets", "-No presets-"),
        (theme.preset_accent, theme.preset_border),
        theme,
    );

    frame.render_widget(status_panel(app, theme), layout[3]);

    let footer = Paragraph::new(Line::from(action_hint_spans(
        &[
            ("w/s", "url"),
            ("↑/↓", "preset"),
            ("enter", "start"),
            ("a/p", "add"),
            ("shift+a/p", "delete"),
            ("q", "quit"),
        ],
        theme,
    )))
    .block(panel_block("Actions", theme.border, theme));
    frame.render_widget(footer, layout[4]);
}

/// The list state follows the cursor so the active row stays in view.
fn draw_list_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    list: &Selection,
    (title, empty_label): (&str, &str),
    (accent, border): (Color, Color),
    theme: &ThemePalette,
) {
    let panel = List::new(list_items(list, empty_label, accent, theme))
        .block(panel_block(title, border, theme));
    let mut state = ListState::default().with_selected(list.cursor());
    frame.render_stateful_widget(panel, area, &mut state);
}

fn list_items<'a>(
    list: &'a Selection,
    empty_label: &'a str,
    accent: Color,
    theme: &ThemePalette,
) -> Vec<ListItem<'a>> {
    if list.is_empty() {
        return vec![ListItem::new(Span::styled(
            empty_label,
            Style::default().fg(theme.muted),
        ))];
    }

    list.items()
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let active = list.cursor() == Some(idx);
            let confirmed = list.confirmed() == Some(idx);
            let marker = if active { GLYPH_ACTIVE } else { " " };
            let check = if confirmed { GLYPH_CONFIRMED } else { " " };
            let style = if active {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker} "), style),
                Span::styled(format!("{check} "), Style::default().fg(theme.success)),
                Span::styled(item.as_str(), style),
            ]))
        })
        .collect()
}

fn status_panel<'a>(app: &'a App, theme: &ThemePalette) -> Paragraph<'a> {
    let mut spans = Vec::new();
    match app.supervisor().active() {
        Some(active) => {
            spans.push(Span::styled(
                format!("{GLYPH_BULLET} live "),
                Style::default()
                    .fg(theme.success)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(
                    "pid {} -> {} ({}s)  ",
                    active.pid,
                    active.url,
                    active.started_at.elapsed().as_secs()
                ),
                Style::default().fg(theme.text),
            ));
        }
        None => spans.push(Span::styled(
            format!("{GLYPH_BULLET} idle  "),
            Style::default().fg(theme.muted),
        )),
    }
    if !app.status().is_empty() {
        spans.push(Span::styled(
            app.status(),
            Style::default().fg(theme.status_color(app.status_level())),
        ));
    }

    Paragraph::new(Line::from(spans)).block(panel_block(
        app.supervisor().options().encoder.as_str(),
        theme.border,
        theme,
    ))
}

fn draw_input(frame: &mut Frame<'_>, kind: InputKind, field: &TextField, theme: &ThemePalette) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(Span::styled(
            kind.title(),
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        layout[0],
    );

    let (text, style) = if field.value().is_empty() {
        (field.placeholder(), Style::default().fg(theme.muted))
    } else {
        (field.value(), Style::default().fg(theme.text))
    };
    let border = match kind {
        InputKind::Url => theme.url_border,
        InputKind::Preset => theme.preset_border,
    };
    let input_area = layout[2];
    let inner_width = usize::from(input_area.width.saturating_sub(2));
    let lines: Vec<Line<'_>> = wrap_chars(text, inner_width)
        .into_iter()
        .map(|row| Line::from(Span::styled(row, style)))
        .collect();
    let placement = cursor_placement(input_area, field.cursor());
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .scroll((placement.map_or(0, |place| place.scroll), 0)),
        input_area,
    );
    if let Some(place) = placement {
        frame.set_cursor_position((place.x, place.y));
    }

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Press Enter to save, Esc to cancel",
            Style::default().fg(theme.muted),
        )),
        layout[3],
    );
}

/// Breaks `text` every `width` chars. `cursor_placement` assumes this rule,
/// so the input box must not use word wrapping.
fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|row| row.iter().collect())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CursorPlacement {
    x: u16,
    y: u16,
    /// Rows scrolled off the top so the cursor row stays inside the box.
    scroll: u16,
}

/// Terminal cell for a char-indexed cursor inside a bordered box whose text
/// is laid out by `wrap_chars`.
fn cursor_placement(area: Rect, cursor: usize) -> Option<CursorPlacement> {
    let inner_width = usize::from(area.width.checked_sub(2)?);
    let inner_height = usize::from(area.height.checked_sub(2)?);
    if inner_width == 0 || inner_height == 0 {
        return None;
    }
    let row = cursor / inner_width;
    let scroll = row.saturating_sub(inner_height - 1);
    Some(CursorPlacement {
        x: area.x + 1 + u16::try_from(cursor % inner_width).ok()?,
        y: area.y + 1 + u16::try_from(row - scroll).ok()?,
        scroll: u16::try_from(scroll).ok()?,
    })
}

fn panel_block<'a>(title: &'a str, border: Color, theme: &ThemePalette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        ))
}

fn action_hint_spans(
    hints: &[(&'static str, &'static str)],
    theme: &ThemePalette,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (idx, (key, label)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(theme.border)));
        }
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(": {label}"),
            Style::default().fg(theme.muted),
        ));
    }
    spans
}
