//! Synchronization coordinator: owns the store and both surfaces and
//! routes messages between them.
//!
//! Everything runs on one cooperative loop. The host calls
//! [`Coordinator::tick`] on every iteration; each tick polls the watcher,
//! delivers bus messages, fires due debounced renders and applies
//! finished render responses.

use std::path::PathBuf;

use crate::bus::{Bus, BusMessage, EditorState, Endpoint, Envelope};
use crate::editor::EditorSurface;
use crate::error::{Error, Result};
use crate::locator::find_cursor_offset;
use crate::render::{PreviewTarget, RenderClient, RenderResponse};
use crate::session::DocumentSession;
use crate::store::DraftStore;
use crate::viewer::ViewerSurface;
use crate::watcher::FileChangeWatcher;

/// Arguments for opening the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenEditorRequest {
    /// Text the user clicked in the viewer; used to place the caret.
    pub source_text: Option<String>,
}

impl OpenEditorRequest {
    pub fn at_text(text: impl Into<String>) -> Self {
        Self {
            source_text: Some(text.into()),
        }
    }
}

/// Which surface is on screen. Only one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    #[default]
    Viewer,
    Editor,
}

#[derive(Debug)]
pub struct Coordinator {
    store: DraftStore,
    viewer: ViewerSurface,
    editor: Option<EditorSurface>,
    client: RenderClient,
    bus: Bus,
    watcher: Option<FileChangeWatcher>,
    debounce_ms: u64,
    visible: Surface,
}

impl Coordinator {
    pub fn new(session: DocumentSession, client: RenderClient, debounce_ms: u64) -> Self {
        let bus = Bus::new();
        let viewer = ViewerSurface::new(&session);
        let store = DraftStore::new(session, bus.sender());
        Self {
            store,
            viewer,
            editor: None,
            client,
            bus,
            watcher: None,
            debounce_ms,
            visible: Surface::Viewer,
        }
    }

    #[must_use]
    pub fn with_watcher(mut self, watcher: FileChangeWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Initial viewer load.
    pub fn start(&mut self) {
        self.viewer.load(&mut self.store, &mut self.client);
    }

    pub const fn store(&self) -> &DraftStore {
        &self.store
    }

    pub const fn viewer(&self) -> &ViewerSurface {
        &self.viewer
    }

    pub const fn viewer_mut(&mut self) -> &mut ViewerSurface {
        &mut self.viewer
    }

    pub const fn editor(&self) -> Option<&EditorSurface> {
        self.editor.as_ref()
    }

    pub const fn editor_mut(&mut self) -> Option<&mut EditorSurface> {
        self.editor.as_mut()
    }

    pub const fn visible(&self) -> Surface {
        self.visible
    }

    pub const fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Open the editor, or re-focus and re-sync the one already open.
    ///
    /// The editor receives the store's baseline and, when the request
    /// carries clicked text, the caret offset the locator found for it.
    ///
    /// # Errors
    /// `NoFileSelected` without a managed file; `FileNotFound` when the
    /// file is gone from disk.
    pub fn open_editor(&mut self, request: &OpenEditorRequest) -> Result<()> {
        let path = self
            .store
            .session()
            .file_path()
            .map(std::path::Path::to_path_buf)
            .ok_or(Error::NoFileSelected)?;
        if !path.exists() {
            return Err(Error::FileNotFound(path));
        }
        let content = self.store.baseline()?;
        let cursor_offset = request
            .source_text
            .as_deref()
            .and_then(|text| find_cursor_offset(&content, text));
        let state = EditorState {
            file_path: Some(path),
            content: Some(content),
            cursor_offset,
        };

        let message = if self.editor.is_some() {
            tracing::debug!(?cursor_offset, "re-syncing open editor");
            BusMessage::EditorSync(state)
        } else {
            tracing::info!(?cursor_offset, "opening editor");
            self.editor = Some(EditorSurface::new(self.bus.sender(), self.debounce_ms));
            BusMessage::EditorInit(state)
        };
        self.bus.sender().post(Endpoint::Editor, message);
        self.visible = Surface::Editor;
        Ok(())
    }

    /// Close the editor and bring the viewer back. Safe to call when no
    /// editor is open.
    pub fn finish_editing(&mut self) {
        if self.editor.take().is_some() {
            tracing::info!("editor closed");
        }
        self.visible = Surface::Viewer;
    }

    /// Save the editor's buffer if it has unsaved edits.
    ///
    /// # Errors
    /// The store's `Persistence` error when the write fails.
    pub fn save_editor(&mut self) -> Result<bool> {
        match self.editor.as_mut() {
            Some(editor) => editor.save(&mut self.store),
            None => Ok(false),
        }
    }

    pub fn revert_editor(&mut self) -> bool {
        let reverted = self
            .editor
            .as_mut()
            .is_some_and(|editor| editor.revert(&mut self.client));
        self.pump_bus();
        reverted
    }

    /// Save if dirty, then close the editor. A failed save keeps the
    /// editor open.
    ///
    /// # Errors
    /// The store's `Persistence` error when the write fails.
    pub fn done_editing(&mut self) -> Result<()> {
        self.save_editor()?;
        if let Some(editor) = &self.editor {
            editor.request_finish();
        }
        self.pump_bus();
        Ok(())
    }

    /// One pass of the cooperative loop. Returns whether any state
    /// changed, so the host knows to redraw.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        if let Some(watcher) = self.watcher.as_mut()
            && watcher.poll(now_ms)
        {
            tracing::info!(path = %watcher.target_path().display(), "file changed on disk");
            self.post_file_changed();
        }

        changed |= self.pump_bus();

        if let Some(editor) = self.editor.as_mut() {
            changed |= editor.poll_render(now_ms, &mut self.client);
        }

        while let Some(response) = self.client.try_recv() {
            changed |= self.route_render(response);
        }
        changed
    }

    /// Whether anything will happen on a later tick without new input.
    pub fn has_pending_work(&self) -> bool {
        self.viewer.preview().is_pending()
            || self
                .editor
                .as_ref()
                .is_some_and(|e| e.render_pending() || e.preview().is_pending())
    }

    /// Tell both surfaces the file changed on disk. The editor goes
    /// first so a clean editor can drop the draft before the viewer
    /// reloads its baseline.
    pub fn post_file_changed(&self) {
        let sender = self.bus.sender();
        sender.post(Endpoint::Editor, BusMessage::FileChanged);
        sender.post(Endpoint::Viewer, BusMessage::FileChanged);
    }

    /// The file the watcher reports on, if watching.
    pub fn watched_path(&self) -> Option<PathBuf> {
        self.watcher
            .as_ref()
            .map(|w| w.target_path().to_path_buf())
    }

    fn pump_bus(&mut self) -> bool {
        let mut routed = false;
        loop {
            let batch = self.bus.drain();
            if batch.is_empty() {
                return routed;
            }
            routed = true;
            for envelope in batch {
                self.route(envelope);
            }
        }
    }

    fn route(&mut self, envelope: Envelope) {
        let Envelope { to, message } = envelope;
        tracing::debug!(?to, kind = message.kind(), "routing");
        match (to, message) {
            (Endpoint::Store, BusMessage::DraftUpdated { path, content }) => {
                self.store.update_draft(&path, content);
            }
            (Endpoint::Viewer, BusMessage::MarkdownUpdated(content)) => {
                self.viewer.on_markdown_updated(content, &mut self.client);
            }
            (Endpoint::Viewer, BusMessage::FileChanged) => {
                self.viewer.on_file_changed(&mut self.store, &mut self.client);
            }
            (Endpoint::Editor, message) => self.route_to_editor(message),
            (Endpoint::Coordinator, BusMessage::FinishEditing) => self.finish_editing(),
            (to, message) => {
                tracing::warn!(?to, kind = message.kind(), "no handler for message");
            }
        }
    }

    fn route_to_editor(&mut self, message: BusMessage) {
        let Some(editor) = self.editor.as_mut() else {
            tracing::debug!(kind = message.kind(), "no editor open; dropping");
            return;
        };
        match message {
            BusMessage::EditorInit(state) => editor.apply_init(state, &mut self.client),
            BusMessage::EditorSync(state) => {
                let outcome = editor.apply_sync(state, &mut self.client);
                tracing::debug!(?outcome, "editor sync");
            }
            BusMessage::FileChanged => editor.on_file_changed(&mut self.store, &mut self.client),
            other => tracing::warn!(kind = other.kind(), "editor cannot handle message"),
        }
    }

    fn route_render(&mut self, response: RenderResponse) -> bool {
        match response.target {
            PreviewTarget::Viewer => self.viewer.accept_render(response),
            PreviewTarget::Editor => self
                .editor
                .as_mut()
                .is_some_and(|editor| editor.accept_render(response)),
        }
    }
}
