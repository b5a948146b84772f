use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tempfile::{TempDir, tempdir};

use crate::coordinator::{Coordinator, Surface};
use crate::debounce::Debouncer;
use crate::editor::Direction;
use crate::format::FormatAction;
use crate::render::{NativeRenderer, RenderClient};
use crate::session::DocumentSession;

use super::input::format_shortcut;
use super::{App, FORMAT_SHORTCUTS, Message, Model, ToastLevel, update};

fn model_for(content: &str, size: (u16, u16)) -> (TempDir, PathBuf, Model) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, content).unwrap();
    let client = RenderClient::inline(Arc::new(NativeRenderer::new()));
    let mut coordinator = Coordinator::new(DocumentSession::init(Some(path.clone())), client, 120);
    coordinator.start();
    coordinator.tick(0);
    (dir, path, Model::new(coordinator, size))
}

fn create_test_model() -> (TempDir, PathBuf, Model) {
    model_for("# Test\n\nHello world\n", (80, 24))
}

fn create_long_test_model() -> (TempDir, PathBuf, Model) {
    let mut md = String::from("# Test Document\n\n");
    for i in 1..=50 {
        md.push_str(&format!("Line {i} of content.\n\n"));
    }
    model_for(&md, (80, 24))
}

fn empty_model() -> Model {
    let client = RenderClient::inline(Arc::new(NativeRenderer::new()));
    let mut coordinator = Coordinator::new(DocumentSession::init(None), client, 120);
    coordinator.start();
    coordinator.tick(0);
    Model::new(coordinator, (80, 24))
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn key_with(code: KeyCode, modifiers: KeyModifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

fn handle(model: &Model, event: &Event) -> Option<Message> {
    let mut resize = Debouncer::new(100);
    App::handle_event(event, model, 0, &mut resize)
}

/// Apply a message and run the coordinator so posted messages land.
fn step(model: &mut Model, msg: Message, now_ms: u64) {
    update(model, msg, now_ms);
    model.coordinator.tick(now_ms);
}

fn open_editor(model: &mut Model) {
    step(model, Message::OpenEditor, 0);
    assert!(model.editing());
}

fn type_text(model: &mut Model, text: &str, now_ms: u64) {
    for ch in text.chars() {
        step(model, Message::InsertChar(ch), now_ms);
    }
}

#[test]
fn test_scroll_down_updates_viewer_offset() {
    let (_dir, _path, mut model) = create_long_test_model();
    update(&mut model, Message::ScrollDown(5), 0);
    assert_eq!(model.coordinator.viewer().scroll_offset(), 5);
}

#[test]
fn test_scroll_up_saturates_at_top() {
    let (_dir, _path, mut model) = create_long_test_model();
    update(&mut model, Message::ScrollDown(2), 0);
    update(&mut model, Message::ScrollUp(10), 0);
    assert_eq!(model.coordinator.viewer().scroll_offset(), 0);
}

#[test]
fn test_go_to_bottom_stops_at_last_page() {
    let (_dir, _path, mut model) = create_long_test_model();
    update(&mut model, Message::GoToBottom, 0);
    let lines = model.viewer_lines().len();
    assert_eq!(
        model.coordinator.viewer().scroll_offset(),
        lines - model.body_height()
    );
    update(&mut model, Message::ScrollDown(3), 0);
    assert_eq!(
        model.coordinator.viewer().scroll_offset(),
        lines - model.body_height()
    );
}

#[test]
fn test_short_document_does_not_scroll() {
    let (_dir, _path, mut model) = create_test_model();
    update(&mut model, Message::PageDown, 0);
    assert_eq!(model.coordinator.viewer().scroll_offset(), 0);
}

#[test]
fn test_e_key_opens_editor() {
    let (_dir, _path, mut model) = create_test_model();
    let msg = handle(&model, &key(KeyCode::Char('e')));
    assert_eq!(msg, Some(Message::OpenEditor));
    step(&mut model, Message::OpenEditor, 0);
    assert!(model.editing());
    assert_eq!(
        model.coordinator.editor().unwrap().text(),
        "# Test\n\nHello world\n"
    );
}

#[test]
fn test_open_editor_without_file_shows_error_toast() {
    let mut model = empty_model();
    step(&mut model, Message::OpenEditor, 0);
    assert!(!model.editing());
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert_eq!(message, "No file path set.");
}

#[test]
fn test_open_editor_at_line_places_caret_at_clicked_text() {
    let (_dir, _path, mut model) = model_for("# Intro\n\nHello world, this is a test.\n", (80, 24));
    let lines = model.viewer_lines();
    let line = lines
        .iter()
        .position(|l| l.starts_with("Hello world"))
        .unwrap();

    step(&mut model, Message::OpenEditorAtLine(line), 0);

    let editor = model.coordinator.editor().unwrap();
    assert_eq!(editor.buffer().cursor_offset(), 9);
}

#[test]
fn test_ctrl_click_in_viewer_body_opens_editor_at_row() {
    let (_dir, _path, model) = create_test_model();
    let click = Event::Mouse(MouseEvent {
        kind: MouseEventKind::Up(MouseButton::Left),
        column: 4,
        row: 3,
        modifiers: KeyModifiers::CONTROL,
    });
    assert_eq!(handle(&model, &click), Some(Message::OpenEditorAtLine(2)));

    let plain = Event::Mouse(MouseEvent {
        kind: MouseEventKind::Up(MouseButton::Left),
        column: 4,
        row: 3,
        modifiers: KeyModifiers::NONE,
    });
    assert_eq!(handle(&model, &plain), None);
}

#[test]
fn test_editor_keys_map_to_editing_messages() {
    let (_dir, _path, mut model) = create_test_model();
    open_editor(&mut model);

    assert_eq!(
        handle(&model, &key(KeyCode::Char('x'))),
        Some(Message::InsertChar('x'))
    );
    assert_eq!(
        handle(&model, &key_with(KeyCode::Char('s'), KeyModifiers::CONTROL)),
        Some(Message::Save)
    );
    assert_eq!(
        handle(&model, &key_with(KeyCode::Char('b'), KeyModifiers::ALT)),
        Some(Message::Format(FormatAction::Bold))
    );
    assert_eq!(
        handle(&model, &key_with(KeyCode::Left, KeyModifiers::SHIFT)),
        Some(Message::MoveCursor(Direction::Left, true))
    );
    assert_eq!(handle(&model, &key(KeyCode::Esc)), Some(Message::CloseEditor));
    // `q` types in the editor instead of quitting.
    assert_eq!(
        handle(&model, &key(KeyCode::Char('q'))),
        Some(Message::InsertChar('q'))
    );
}

#[test]
fn test_every_toolbar_action_has_a_shortcut() {
    for action in FormatAction::ALL {
        let found = FORMAT_SHORTCUTS
            .iter()
            .any(|&(key, a)| a == action && format_shortcut(key) == Some(action));
        assert!(found, "{action:?} has no shortcut");
    }
}

#[test]
fn test_typing_marks_dirty_and_save_writes_file() {
    let (_dir, path, mut model) = create_test_model();
    open_editor(&mut model);
    step(&mut model, Message::MoveToEnd(false), 0);
    type_text(&mut model, "More.", 10);
    assert!(model.editor_is_dirty());

    step(&mut model, Message::Save, 20);
    assert!(!model.editor_is_dirty());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "# Test\n\nHello world\nMore."
    );
    assert_eq!(model.active_toast().map(|(m, _)| m), Some("Saved"));
}

#[test]
fn test_edits_reach_viewer_before_save() {
    let (_dir, _path, mut model) = create_test_model();
    open_editor(&mut model);
    step(&mut model, Message::MoveToEnd(false), 0);
    step(&mut model, Message::InsertNewline, 0);
    type_text(&mut model, "Draft line", 0);

    step(&mut model, Message::CloseEditor, 0);
    assert!(!model.editing());
    assert!(model.viewer_lines().iter().any(|l| l == "Draft line"));
}

#[test]
fn test_done_saves_and_returns_to_viewer() {
    let (_dir, path, mut model) = create_test_model();
    open_editor(&mut model);
    step(&mut model, Message::MoveToStart(false), 0);
    type_text(&mut model, "X", 0);

    step(&mut model, Message::Done, 0);
    assert_eq!(model.coordinator.visible(), Surface::Viewer);
    assert!(model.coordinator.editor().is_none());
    assert!(std::fs::read_to_string(&path).unwrap().starts_with("X# Test"));
}

#[test]
fn test_revert_restores_disk_text() {
    let (_dir, _path, mut model) = create_test_model();
    open_editor(&mut model);
    type_text(&mut model, "junk", 0);
    step(&mut model, Message::Revert, 0);
    assert!(!model.editor_is_dirty());
    assert_eq!(
        model.coordinator.editor().unwrap().text(),
        "# Test\n\nHello world\n"
    );
}

#[test]
fn test_format_message_wraps_selection() {
    let (_dir, _path, mut model) = model_for("word\n", (80, 24));
    open_editor(&mut model);
    step(&mut model, Message::MoveEnd(true), 0);
    step(&mut model, Message::Format(FormatAction::Bold), 0);
    assert_eq!(model.coordinator.editor().unwrap().text(), "**word**\n");
}

#[test]
fn test_paste_inserts_whole_text() {
    let (_dir, _path, mut model) = model_for("", (80, 24));
    open_editor(&mut model);
    let paste = Event::Paste("line one\nline two".to_string());
    let msg = handle(&model, &paste).unwrap();
    step(&mut model, msg, 0);
    assert_eq!(
        model.coordinator.editor().unwrap().text(),
        "line one\nline two"
    );
}

#[test]
fn test_quit_with_unsaved_edits_requires_confirmation() {
    let (_dir, _path, mut model) = create_test_model();
    open_editor(&mut model);
    type_text(&mut model, "x", 0);

    update(&mut model, Message::Quit, 0);
    assert!(!model.should_quit);
    assert!(model.quit_confirmation_pending);
    assert_eq!(model.active_toast().map(|(_, l)| l), Some(ToastLevel::Warning));

    update(&mut model, Message::Quit, 0);
    assert!(model.should_quit);
}

#[test]
fn test_other_message_cancels_quit_confirmation() {
    let (_dir, _path, mut model) = create_test_model();
    open_editor(&mut model);
    type_text(&mut model, "x", 0);

    update(&mut model, Message::Quit, 0);
    update(&mut model, Message::MoveCursor(Direction::Left, false), 0);
    update(&mut model, Message::Quit, 0);
    assert!(!model.should_quit);
}

#[test]
fn test_quit_after_closing_editor_with_draft_requires_confirmation() {
    let (_dir, _path, mut model) = create_test_model();
    open_editor(&mut model);
    type_text(&mut model, "x", 0);
    let close = handle(&model, &key(KeyCode::Esc)).unwrap();
    assert_eq!(close, Message::CloseEditor);
    step(&mut model, close, 0);
    assert!(!model.editing());

    let quit = handle(&model, &key(KeyCode::Char('q'))).unwrap();
    step(&mut model, quit, 0);
    assert!(!model.should_quit);
    assert!(model.quit_confirmation_pending);

    step(&mut model, Message::Quit, 0);
    assert!(model.should_quit);
}

#[test]
fn test_quit_after_reverted_edits_is_immediate() {
    let (_dir, _path, mut model) = create_test_model();
    open_editor(&mut model);
    type_text(&mut model, "x", 0);
    step(&mut model, Message::Revert, 0);
    step(&mut model, Message::CloseEditor, 0);

    update(&mut model, Message::Quit, 0);
    assert!(model.should_quit);
}

#[test]
fn test_quit_without_edits_is_immediate() {
    let (_dir, _path, mut model) = create_test_model();
    update(&mut model, Message::Quit, 0);
    assert!(model.should_quit);
}

#[test]
fn test_editor_scrolls_to_keep_caret_visible() {
    let mut content = String::new();
    for i in 0..40 {
        content.push_str(&format!("line {i}\n"));
    }
    let (_dir, _path, mut model) = model_for(&content, (80, 12));
    open_editor(&mut model);
    for _ in 0..15 {
        update(&mut model, Message::MoveCursor(Direction::Down, false), 0);
    }
    let editor = model.coordinator.editor().unwrap();
    assert_eq!(editor.buffer().cursor().line, 15);
    assert_eq!(editor.scroll_offset(), 15 + 1 - model.body_height());
}

#[test]
fn test_click_in_editor_moves_caret() {
    let (_dir, _path, mut model) = model_for("alpha\nbeta\ngamma\n", (80, 24));
    open_editor(&mut model);
    // Gutter is one digit plus a space.
    let click = Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 5,
        row: 2,
        modifiers: KeyModifiers::NONE,
    });
    let msg = handle(&model, &click).unwrap();
    assert_eq!(msg, Message::MoveTo(1, 3));
    step(&mut model, msg, 0);
    let cursor = model.coordinator.editor().unwrap().buffer().cursor();
    assert_eq!((cursor.line, cursor.col), (1, 3));
}

#[test]
fn test_resize_is_debounced() {
    let (_dir, _path, model) = create_test_model();
    let mut resize = Debouncer::new(100);
    assert_eq!(
        App::handle_event(&Event::Resize(100, 30), &model, 0, &mut resize),
        None
    );
    assert_eq!(resize.take_ready(50), None);
    assert_eq!(resize.take_ready(100), Some((100, 30)));
}

#[test]
fn test_help_captures_keys() {
    let (_dir, _path, mut model) = create_test_model();
    update(&mut model, Message::ToggleHelp, 0);
    assert_eq!(handle(&model, &key(KeyCode::Char('e'))), None);
    assert_eq!(handle(&model, &key(KeyCode::Esc)), Some(Message::HideHelp));
}
