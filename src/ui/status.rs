use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

use super::render::toolbar_labels;

pub fn render_viewer_header(model: &Model, frame: &mut Frame, area: Rect) {
    let viewer = model.coordinator.viewer();
    let hint = if viewer.has_file() { "  [e] Edit" } else { "" };
    let header = Paragraph::new(format!(" {}{hint}", viewer.title())).style(
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(header, area);
}

pub fn render_toolbar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(editor) = model.coordinator.editor() else {
        return;
    };
    let mut spans = vec![Span::raw(" ")];
    // The indicator leads so a narrow terminal clips labels, not it.
    let indicator = editor.dirty_indicator();
    if !indicator.is_empty() {
        spans.push(Span::styled(
            format!(" {indicator} "),
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }
    for label in toolbar_labels() {
        spans.push(Span::raw(label));
        spans.push(Span::raw(" "));
    }
    let toolbar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(toolbar, area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let viewer = model.coordinator.viewer();
    let filename = viewer
        .file_path()
        .and_then(|p| p.file_name())
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());

    let total = model.viewer_lines().len();
    let line_info = format!(
        "Line {}/{}",
        (viewer.scroll_offset() + 1).min(total.max(1)),
        total
    );
    let watch_indicator = if model.coordinator.is_watching() {
        " [watching]"
    } else {
        ""
    };

    let status = format!(" {filename}  {line_info}{watch_indicator}  Ctrl+click:edit here  ?:help");
    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_editor_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(editor) = model.coordinator.editor() else {
        return;
    };
    let filename = editor
        .file_path()
        .and_then(|p| p.file_name())
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());
    let cursor = editor.buffer().cursor();
    let actions = if editor.can_save() {
        "  Ctrl+S:save  Ctrl+R:revert"
    } else {
        ""
    };

    let status = editor.status().map_or_else(
        || {
            format!(
                " EDIT  {filename}  Ln {}, Col {}{actions}  Ctrl+D:done  Esc:view",
                cursor.line + 1,
                cursor.col + 1
            )
        },
        |message| format!(" EDIT  {filename}  {message}"),
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::Magenta).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
