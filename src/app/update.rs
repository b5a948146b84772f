use crate::app::{Model, ToastLevel};
use crate::coordinator::OpenEditorRequest;
use crate::editor::{Direction, EditorBuffer};
use crate::format::FormatAction;
use crate::viewer::ViewerSurface;

/// Every user action the terminal host understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Viewer
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    /// Open the editor without a caret hint (the Edit button).
    OpenEditor,
    /// Open the editor at the source of a preview line.
    OpenEditorAtLine(usize),

    // Editor
    InsertChar(char),
    /// Bracketed paste.
    InsertText(String),
    InsertNewline,
    DeleteBack,
    DeleteForward,
    MoveCursor(Direction, bool),
    MoveHome(bool),
    MoveEnd(bool),
    MoveWordLeft(bool),
    MoveWordRight(bool),
    MoveToStart(bool),
    MoveToEnd(bool),
    /// Place the caret at a line and column, e.g. from a mouse click.
    MoveTo(usize, usize),
    SelectAll,
    Format(FormatAction),
    Save,
    Revert,
    Done,
    /// Close the editor keeping unsaved edits as the draft.
    CloseEditor,

    // Application
    Resize(u16, u16),
    ToggleHelp,
    HideHelp,
    Quit,
}

/// Apply `msg` to the model. `now_ms` drives the editor's render debounce.
pub fn update(model: &mut Model, msg: Message, now_ms: u64) {
    if !matches!(msg, Message::Quit) {
        model.quit_confirmation_pending = false;
    }
    match msg {
        Message::ScrollUp(n) => scroll_viewer(model, |offset, _| offset.saturating_sub(n)),
        Message::ScrollDown(n) => scroll_viewer(model, |offset, max| (offset + n).min(max)),
        Message::PageUp => {
            let page = model.body_height().max(1);
            scroll_viewer(model, |offset, _| offset.saturating_sub(page));
        }
        Message::PageDown => {
            let page = model.body_height().max(1);
            scroll_viewer(model, |offset, max| (offset + page).min(max));
        }
        Message::GoToTop => scroll_viewer(model, |_, _| 0),
        Message::GoToBottom => scroll_viewer(model, |_, max| max),
        Message::OpenEditor => open_editor(model, &OpenEditorRequest::default()),
        Message::OpenEditorAtLine(line) => {
            let fragment = model
                .viewer_lines()
                .get(line)
                .map(|text| ViewerSurface::fragment_at(text))
                .filter(|f| !f.is_empty());
            let request = OpenEditorRequest {
                source_text: fragment,
            };
            open_editor(model, &request);
        }

        Message::InsertChar(ch) => edit(model, now_ms, |b| b.insert_char(ch)),
        Message::InsertText(text) => edit(model, now_ms, |b| b.insert_str(&text)),
        Message::InsertNewline => edit(model, now_ms, EditorBuffer::split_line),
        Message::DeleteBack => edit(model, now_ms, |b| {
            b.delete_back();
        }),
        Message::DeleteForward => edit(model, now_ms, |b| {
            b.delete_forward();
        }),
        Message::MoveCursor(direction, extend) => navigate(model, |b| b.move_cursor(direction, extend)),
        Message::MoveHome(extend) => navigate(model, |b| b.move_home(extend)),
        Message::MoveEnd(extend) => navigate(model, |b| b.move_end(extend)),
        Message::MoveWordLeft(extend) => navigate(model, |b| b.move_word_left(extend)),
        Message::MoveWordRight(extend) => navigate(model, |b| b.move_word_right(extend)),
        Message::MoveToStart(extend) => navigate(model, |b| b.move_to_start(extend)),
        Message::MoveToEnd(extend) => navigate(model, |b| b.move_to_end(extend)),
        Message::MoveTo(line, col) => navigate(model, |b| b.move_to(line, col)),
        Message::SelectAll => navigate(model, EditorBuffer::select_all),
        Message::Format(action) => {
            if let Some(editor) = model.coordinator.editor_mut() {
                editor.apply_format(action, now_ms);
            }
            model.scroll_editor_to_cursor();
        }
        Message::Save => match model.coordinator.save_editor() {
            Ok(true) => model.show_toast(ToastLevel::Info, "Saved"),
            Ok(false) => {}
            Err(err) => model.show_toast(ToastLevel::Error, err.to_string()),
        },
        Message::Revert => {
            if model.coordinator.revert_editor() {
                model.show_toast(ToastLevel::Info, "Reverted");
            }
        }
        Message::Done => {
            if let Err(err) = model.coordinator.done_editing() {
                model.show_toast(ToastLevel::Error, err.to_string());
            }
        }
        Message::CloseEditor => model.coordinator.finish_editing(),

        Message::Resize(width, height) => {
            model.width = width;
            model.height = height;
            model.scroll_editor_to_cursor();
        }
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Quit => {
            if model.has_unsaved_work() && !model.quit_confirmation_pending {
                model.quit_confirmation_pending = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes. Press q again to quit without saving.",
                );
            } else {
                model.should_quit = true;
            }
        }
    }
}

fn scroll_viewer(model: &mut Model, next: impl FnOnce(usize, usize) -> usize) {
    let max = model
        .viewer_lines()
        .len()
        .saturating_sub(model.body_height().max(1));
    let viewer = model.coordinator.viewer_mut();
    let offset = next(viewer.scroll_offset(), max);
    viewer.set_scroll_offset(offset);
}

fn open_editor(model: &mut Model, request: &OpenEditorRequest) {
    if let Err(err) = model.coordinator.open_editor(request) {
        model.show_toast(ToastLevel::Error, err.to_string());
    }
}

fn edit(model: &mut Model, now_ms: u64, change: impl FnOnce(&mut EditorBuffer)) {
    if let Some(editor) = model.coordinator.editor_mut() {
        editor.edit(now_ms, change);
    }
    model.scroll_editor_to_cursor();
}

fn navigate(model: &mut Model, movement: impl FnOnce(&mut EditorBuffer)) {
    if let Some(editor) = model.coordinator.editor_mut() {
        movement(editor.buffer_mut());
    }
    model.scroll_editor_to_cursor();
}
