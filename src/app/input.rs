use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::app::{App, Message, Model};
use crate::debounce::Debouncer;
use crate::editor::Direction;
use crate::format::FormatAction;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut Debouncer<(u16, u16)>,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue((*w, *h), now_ms);
                None
            }
            Event::Paste(text) if model.editing() => Some(Message::InsertText(text.clone())),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) => Some(Message::HideHelp),
                _ => None,
            };
        }
        if model.editing() {
            return editor_key(key);
        }
        viewer_key(key, model)
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        let body = body_area(model);
        if model.editing() {
            return editor_mouse(mouse, model, body);
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(3)),
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(3)),
            // Ctrl+click jumps into the editor at the clicked text.
            MouseEventKind::Up(MouseButton::Left)
                if mouse.modifiers.contains(KeyModifiers::CONTROL)
                    && point_in_rect(mouse.column, mouse.row, body) =>
            {
                let line =
                    model.coordinator.viewer().scroll_offset() + usize::from(mouse.row - body.y);
                Some(Message::OpenEditorAtLine(line))
            }
            _ => None,
        }
    }
}

fn viewer_key(key: KeyEvent, model: &Model) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => Some(Message::Quit),
        KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
        KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(1)),
        KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
        KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
        KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
        KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
        KeyCode::Char('e') => Some(Message::OpenEditor),
        KeyCode::Enter => Some(Message::OpenEditorAtLine(
            model.coordinator.viewer().scroll_offset(),
        )),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
        KeyCode::Char('q') => Some(Message::Quit),
        _ => None,
    }
}

fn editor_key(key: KeyEvent) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if alt && let KeyCode::Char(c) = key.code {
        return format_shortcut(c).map(Message::Format);
    }

    match key.code {
        KeyCode::Char('s') if ctrl => Some(Message::Save),
        KeyCode::Char('r') if ctrl => Some(Message::Revert),
        KeyCode::Char('d') if ctrl => Some(Message::Done),
        KeyCode::Enter if ctrl => Some(Message::Done),
        KeyCode::Char('a') if ctrl => Some(Message::SelectAll),
        KeyCode::Char('c' | 'q') if ctrl => Some(Message::Quit),
        KeyCode::Esc => Some(Message::CloseEditor),
        KeyCode::F(1) => Some(Message::ToggleHelp),

        KeyCode::Left if ctrl => Some(Message::MoveWordLeft(shift)),
        KeyCode::Right if ctrl => Some(Message::MoveWordRight(shift)),
        KeyCode::Home if ctrl => Some(Message::MoveToStart(shift)),
        KeyCode::End if ctrl => Some(Message::MoveToEnd(shift)),
        KeyCode::Left => Some(Message::MoveCursor(Direction::Left, shift)),
        KeyCode::Right => Some(Message::MoveCursor(Direction::Right, shift)),
        KeyCode::Up => Some(Message::MoveCursor(Direction::Up, shift)),
        KeyCode::Down => Some(Message::MoveCursor(Direction::Down, shift)),
        KeyCode::Home => Some(Message::MoveHome(shift)),
        KeyCode::End => Some(Message::MoveEnd(shift)),

        KeyCode::Enter => Some(Message::InsertNewline),
        KeyCode::Backspace => Some(Message::DeleteBack),
        KeyCode::Delete => Some(Message::DeleteForward),
        KeyCode::Char(c) if !ctrl => Some(Message::InsertChar(c)),
        _ => None,
    }
}

/// Alt shortcuts for the formatting toolbar, in toolbar order.
pub const FORMAT_SHORTCUTS: [(char, FormatAction); 7] = [
    ('b', FormatAction::Bold),
    ('i', FormatAction::Italic),
    ('h', FormatAction::Heading),
    ('l', FormatAction::List),
    ('q', FormatAction::Quote),
    ('c', FormatAction::CodeBlock),
    ('k', FormatAction::Link),
];

pub(super) fn format_shortcut(c: char) -> Option<FormatAction> {
    FORMAT_SHORTCUTS
        .iter()
        .find(|(key, _)| *key == c)
        .map(|&(_, action)| action)
}

fn editor_mouse(mouse: MouseEvent, model: &Model, body: Rect) -> Option<Message> {
    let editor = model.coordinator.editor()?;
    let text_area = crate::ui::split_editor_columns(body)[0];
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Message::MoveCursor(Direction::Down, false)),
        MouseEventKind::ScrollUp => Some(Message::MoveCursor(Direction::Up, false)),
        MouseEventKind::Down(MouseButton::Left)
            if point_in_rect(mouse.column, mouse.row, text_area) =>
        {
            let gutter = crate::ui::line_number_width(editor.buffer().line_count()) + 1;
            let line = editor.scroll_offset() + usize::from(mouse.row - text_area.y);
            let display_col = usize::from(mouse.column.saturating_sub(text_area.x + gutter));
            let text = editor.buffer().line_at(line).unwrap_or_default();
            Some(Message::MoveTo(line, crate::ui::char_column_at(&text, display_col)))
        }
        _ => None,
    }
}

/// Rows between the header and the status bar.
fn body_area(model: &Model) -> Rect {
    Rect::new(
        0,
        crate::ui::HEADER_ROWS,
        model.width,
        model.height.saturating_sub(crate::ui::HEADER_ROWS + 1),
    )
}

const fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}
