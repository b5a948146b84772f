use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::{FORMAT_SHORTCUTS, Model};
use crate::editor::{EditorBuffer, EditorSurface};
use crate::render::Preview;
use crate::viewer::EMPTY_STATE;

use super::{DOCUMENT_LEFT_PADDING, HEADER_ROWS, overlays, preview_lines, status, style};

/// Editor text on the left, live preview on the right.
pub fn split_editor_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let [header_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(HEADER_ROWS),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(Clear, body_area);
    if model.editing() {
        status::render_toolbar(model, frame, header_area);
        render_editor(model, frame, body_area);
        status::render_editor_status_bar(model, frame, status_area);
    } else {
        status::render_viewer_header(model, frame, header_area);
        render_viewer(model, frame, body_area);
        status::render_status_bar(model, frame, status_area);
    }

    if model.active_toast().is_some() && body_area.height > 0 {
        let toast_area = Rect {
            y: body_area.y + body_area.height - 1,
            height: 1,
            ..body_area
        };
        status::render_toast_bar(model, frame, toast_area);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_viewer(model: &Model, frame: &mut Frame, area: Rect) {
    let viewer = model.coordinator.viewer();
    let block = Block::default()
        .borders(Borders::NONE)
        .padding(Padding::left(DOCUMENT_LEFT_PADDING));

    if !viewer.has_file() {
        let empty = Paragraph::new(Line::styled(EMPTY_STATE, style::empty_state_style()))
            .alignment(Alignment::Center)
            .block(block);
        let middle = Rect {
            y: area.y + area.height / 2,
            height: area.height.min(1),
            ..area
        };
        frame.render_widget(empty, middle);
        return;
    }

    let lines = preview_content(
        viewer.preview().preview(),
        model,
        viewer.scroll_offset(),
        area.height as usize,
    );
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(editor) = model.coordinator.editor() else {
        return;
    };
    let columns = split_editor_columns(area);
    render_editor_text(editor, frame, columns[0]);

    let preview_block = Block::default()
        .title(" Preview ")
        .borders(Borders::LEFT)
        .border_style(style::gutter_style())
        .padding(Padding::left(1));
    let inner_height = preview_block.inner(columns[1]).height as usize;
    let lines = preview_content(editor.preview().preview(), model, 0, inner_height);
    frame.render_widget(Paragraph::new(lines).block(preview_block), columns[1]);
}

fn render_editor_text(editor: &EditorSurface, frame: &mut Frame, area: Rect) {
    let buf = editor.buffer();
    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines) as usize;

    let start = editor.scroll_offset();
    let end = (start + area.height as usize).min(total_lines);
    let cursor = buf.cursor();

    let content: Vec<Line> = (start..end)
        .map(|line_idx| {
            let line_num = format!("{:>gutter_width$} ", line_idx + 1);
            let mut spans = vec![Span::styled(line_num, style::gutter_style())];
            let caret_col = (line_idx == cursor.line).then_some(cursor.col);
            spans.extend(editor_line_spans(buf, line_idx, caret_col));
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(content), area);
}

/// Spans for one buffer line with the selection and caret painted in.
fn editor_line_spans(
    buf: &EditorBuffer,
    line_idx: usize,
    caret_col: Option<usize>,
) -> Vec<Span<'static>> {
    let text: Vec<char> = buf.line_at(line_idx).unwrap_or_default().chars().collect();
    let line_start = buf.line_start(line_idx);
    let (sel_start, sel_end) = buf.selection();
    let selected = |col: usize| {
        let offset = line_start + col;
        offset >= sel_start && offset < sel_end
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();
    for (col, &ch) in text.iter().enumerate() {
        let cell_style = if caret_col == Some(col) {
            style::cursor_style()
        } else if selected(col) {
            style::selection_style()
        } else {
            Style::default()
        };
        if cell_style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = cell_style;
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    // Caret past the last char sits on a blank cell.
    if caret_col.is_some_and(|col| col >= text.len()) {
        spans.push(Span::styled(" ", style::cursor_style()));
    }
    spans
}

/// Visible slice of a preview as styled lines.
fn preview_content(
    preview: &Preview,
    model: &Model,
    offset: usize,
    height: usize,
) -> Vec<Line<'static>> {
    let is_error = matches!(preview, Preview::Error(_));
    preview_lines(preview)
        .into_iter()
        .skip(offset)
        .take(height)
        .map(|line| {
            let line_style = if is_error {
                style::error_style()
            } else {
                style::style_for_preview_line(&line, model.background)
            };
            Line::styled(line, line_style)
        })
        .collect()
}

/// Toolbar labels with their shortcuts, in display order.
pub fn toolbar_labels() -> Vec<String> {
    FORMAT_SHORTCUTS
        .iter()
        .map(|(key, action)| format!("{}[M-{key}]", action.label()))
        .collect()
}

/// Char column under a display offset into `line`; wide chars span
/// several cells. Offsets past the end land after the last char.
pub fn char_column_at(line: &str, display_offset: usize) -> usize {
    let mut width = 0;
    for (col, ch) in line.chars().enumerate() {
        width += ch.width().unwrap_or(0);
        if width > display_offset {
            return col;
        }
    }
    line.chars().count()
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
