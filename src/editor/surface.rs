use std::path::{Path, PathBuf};

use super::EditorBuffer;
use crate::bus::{BusMessage, BusSender, EditorState, Endpoint};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::format::{self, FormatAction};
use crate::render::{PreviewPane, PreviewTarget, RenderClient, RenderRequest, RenderResponse};
use crate::session::FileType;
use crate::store::DraftStore;

pub const DEFAULT_RENDER_DEBOUNCE_MS: u64 = 120;

pub const DIRTY_INDICATOR: &str = "Unsaved changes";

/// What an `EditorSync` did to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The event named another file while this one has unsaved edits.
    Dropped,
    Reloaded,
    CursorOnly,
}

/// Editing surface with a live preview.
///
/// `current_content` is what the editor considers clean: the last content
/// loaded, saved or re-read. Every edit recomputes dirtiness against it,
/// restarts the preview debounce and sends the draft to the store.
#[derive(Debug)]
pub struct EditorSurface {
    file_path: Option<PathBuf>,
    file_type: FileType,
    current_content: String,
    buffer: EditorBuffer,
    file_dirty: bool,
    preview: PreviewPane,
    render_timer: Debouncer<String>,
    bus: BusSender,
    status: Option<String>,
    scroll_offset: usize,
}

impl EditorSurface {
    pub fn new(bus: BusSender, debounce_ms: u64) -> Self {
        Self {
            file_path: None,
            file_type: FileType::default(),
            current_content: String::new(),
            buffer: EditorBuffer::empty(),
            file_dirty: false,
            preview: PreviewPane::new(PreviewTarget::Editor),
            render_timer: Debouncer::new(debounce_ms),
            bus,
            status: None,
            scroll_offset: 0,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub const fn file_type(&self) -> FileType {
        self.file_type
    }

    pub const fn is_dirty(&self) -> bool {
        self.file_dirty
    }

    pub fn current_content(&self) -> &str {
        &self.current_content
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    /// Buffer access for caret movement. Text changes go through
    /// [`EditorSurface::edit`].
    pub const fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    pub const fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Save and Revert are only offered for a file with unsaved edits.
    pub const fn can_save(&self) -> bool {
        self.file_path.is_some() && self.file_dirty
    }

    pub const fn dirty_indicator(&self) -> &'static str {
        if self.file_dirty { DIRTY_INDICATOR } else { "" }
    }

    /// Last save failure, shown in the editor's status line.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub const fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
    }

    pub const fn render_pending(&self) -> bool {
        self.render_timer.is_pending()
    }

    /// First load after the editor opens: always a full reload.
    pub fn apply_init(&mut self, state: EditorState, client: &mut RenderClient) {
        tracing::info!(path = ?state.file_path, cursor = ?state.cursor_offset, "editor init");
        self.apply_state(state.file_path, state.content, state.cursor_offset, client);
    }

    /// Re-sync an already open editor.
    pub fn apply_sync(&mut self, state: EditorState, client: &mut RenderClient) -> SyncOutcome {
        if let Some(path) = &state.file_path
            && self.file_path.as_ref() != Some(path)
            && self.file_dirty
        {
            tracing::debug!(
                incoming = %path.display(),
                loaded = ?self.file_path,
                "dropping sync for another file while dirty"
            );
            return SyncOutcome::Dropped;
        }
        if !self.file_dirty && state.content.is_some() {
            let path = state.file_path.or_else(|| self.file_path.clone());
            self.apply_state(path, state.content, state.cursor_offset, client);
            return SyncOutcome::Reloaded;
        }
        self.place_cursor(state.cursor_offset);
        SyncOutcome::CursorOnly
    }

    fn apply_state(
        &mut self,
        file_path: Option<PathBuf>,
        content: Option<String>,
        cursor_offset: Option<usize>,
        client: &mut RenderClient,
    ) {
        self.file_type = file_path
            .as_deref()
            .map(FileType::from_path)
            .unwrap_or_default();
        self.preview.set_source_path(file_path.as_deref());
        self.file_path = file_path;
        self.current_content = content.unwrap_or_default();
        self.buffer.set_text(&self.current_content);
        self.file_dirty = false;
        self.status = None;
        self.render_now(self.current_content.clone(), client);
        self.place_cursor(cursor_offset);
    }

    fn place_cursor(&mut self, offset: Option<usize>) {
        if let Some(offset) = offset {
            self.buffer.set_cursor_offset(offset);
        }
    }

    /// Apply a text change to the buffer and propagate it.
    pub fn edit<R>(&mut self, now_ms: u64, change: impl FnOnce(&mut EditorBuffer) -> R) -> R {
        let result = change(&mut self.buffer);
        self.on_edit(now_ms);
        result
    }

    /// Run a toolbar formatting action on the current selection.
    pub fn apply_format(&mut self, action: FormatAction, now_ms: u64) {
        let (start, end) = self.buffer.selection();
        let out = format::apply(action, &self.buffer.text(), start, end);
        tracing::debug!(?action, start, end, "format");
        self.edit(now_ms, |buffer| {
            buffer.set_text(&out.text);
            if out.selection_start == out.selection_end {
                buffer.set_cursor_offset(out.selection_end);
            } else {
                buffer.select(out.selection_start, out.selection_end);
            }
        });
    }

    fn on_edit(&mut self, now_ms: u64) {
        let next = self.buffer.text();
        self.file_dirty = next != self.current_content;
        self.render_timer.queue(next.clone(), now_ms);
        if let Some(path) = &self.file_path {
            self.bus.post(
                Endpoint::Store,
                BusMessage::DraftUpdated {
                    path: path.clone(),
                    content: next,
                },
            );
        }
    }

    /// Fire the debounced preview render once the buffer has been quiet
    /// long enough.
    pub fn poll_render(&mut self, now_ms: u64, client: &mut RenderClient) -> bool {
        let Some(content) = self.render_timer.take_ready(now_ms) else {
            return false;
        };
        self.request_render(content, client);
        true
    }

    fn render_now(&mut self, content: String, client: &mut RenderClient) {
        self.render_timer.cancel();
        self.request_render(content, client);
    }

    fn request_render(&mut self, content: String, client: &mut RenderClient) {
        let request = RenderRequest::for_content(self.file_type, content, self.file_path.as_deref());
        self.preview.request(client, request);
    }

    pub fn accept_render(&mut self, response: RenderResponse) -> bool {
        self.preview.accept(response)
    }

    /// The file changed on disk. A clean editor picks up the new content
    /// and drops the store's draft; a dirty one keeps its edits.
    pub fn on_file_changed(&mut self, store: &mut DraftStore, client: &mut RenderClient) {
        if self.file_path.is_none() || self.file_dirty {
            tracing::debug!(dirty = self.file_dirty, "editor ignoring file change");
            return;
        }
        match store.read_persisted() {
            Ok(content) => {
                // A clean editor's draft only mirrors the old disk text.
                store.clear_draft();
                self.current_content = content;
                self.buffer.set_text(&self.current_content);
                self.render_now(self.current_content.clone(), client);
            }
            Err(err) => {
                tracing::warn!(%err, "editor reload failed");
                self.render_timer.cancel();
                self.preview.show_error(err.to_string());
            }
        }
    }

    /// Save when there is something to save. Returns whether a write
    /// happened.
    ///
    /// # Errors
    /// Propagates the store's `Persistence` error; the edits and dirty
    /// state are kept.
    pub fn save(&mut self, store: &mut DraftStore) -> Result<bool> {
        if !self.can_save() {
            return Ok(false);
        }
        let text = self.buffer.text();
        if let Err(err) = store.save(self.file_path.as_deref(), &text) {
            tracing::warn!(%err, "save failed");
            self.status = Some(err.to_string());
            return Err(err);
        }
        self.current_content = text;
        self.file_dirty = false;
        self.status = None;
        Ok(true)
    }

    /// Throw away edits since the last clean state.
    pub fn revert(&mut self, client: &mut RenderClient) -> bool {
        let Some(path) = self.file_path.clone() else {
            return false;
        };
        if !self.file_dirty {
            return false;
        }
        self.buffer.set_text(&self.current_content);
        self.file_dirty = false;
        self.render_now(self.current_content.clone(), client);
        self.bus.post(
            Endpoint::Store,
            BusMessage::DraftUpdated {
                path,
                content: self.current_content.clone(),
            },
        );
        true
    }

    /// Ask the coordinator to close this editor.
    pub fn request_finish(&self) {
        self.bus.post(Endpoint::Coordinator, BusMessage::FinishEditing);
    }
}
