//! Typed message bus between the viewer, the editor and the store.
//!
//! Messages are fire-and-forget: senders post an [`Envelope`] and the
//! coordinator drains and routes them on its next tick.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

/// Payload pushed to the editor on open and on re-sync.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorState {
    pub file_path: Option<PathBuf>,
    pub content: Option<String>,
    pub cursor_offset: Option<usize>,
}

/// Every message that crosses a surface boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    /// Coordinator → editor, once the editor has finished loading.
    EditorInit(EditorState),
    /// Coordinator → editor, when an open editor is re-focused.
    EditorSync(EditorState),
    /// Editor → store, on every edit.
    DraftUpdated { path: PathBuf, content: String },
    /// Store → viewer, after an accepted draft update.
    MarkdownUpdated(String),
    /// Watcher → viewer and editor.
    FileChanged,
    /// Editor → coordinator.
    FinishEditing,
}

impl BusMessage {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EditorInit(_) => "editor-init",
            Self::EditorSync(_) => "editor-sync",
            Self::DraftUpdated { .. } => "markdown-draft-updated",
            Self::MarkdownUpdated(_) => "markdown-updated",
            Self::FileChanged => "file-changed",
            Self::FinishEditing => "finish-editing",
        }
    }
}

/// Where a message is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Viewer,
    Editor,
    Store,
    Coordinator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub to: Endpoint,
    pub message: BusMessage,
}

/// Cloneable posting handle.
#[derive(Debug, Clone)]
pub struct BusSender {
    tx: Sender<Envelope>,
}

impl BusSender {
    pub fn post(&self, to: Endpoint, message: BusMessage) {
        tracing::debug!(?to, kind = message.kind(), "bus post");
        // The receiver lives as long as the coordinator; a closed bus only
        // happens during shutdown, where dropping the message is correct.
        let _ = self.tx.send(Envelope { to, message });
    }
}

/// Receiving half, owned by the coordinator.
#[derive(Debug)]
pub struct Bus {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
}

impl Bus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> BusSender {
        BusSender {
            tx: self.tx.clone(),
        }
    }

    /// Take everything posted so far, in posting order.
    pub fn drain(&self) -> Vec<Envelope> {
        self.rx.try_iter().collect()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_posting_order() {
        let bus = Bus::new();
        let sender = bus.sender();
        sender.post(Endpoint::Viewer, BusMessage::FileChanged);
        sender.post(Endpoint::Coordinator, BusMessage::FinishEditing);

        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].to, Endpoint::Viewer);
        assert_eq!(drained[1].message, BusMessage::FinishEditing);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_message_kinds_match_wire_names() {
        let update = BusMessage::DraftUpdated {
            path: PathBuf::from("a.md"),
            content: String::new(),
        };
        assert_eq!(update.kind(), "markdown-draft-updated");
        assert_eq!(
            BusMessage::EditorSync(EditorState::default()).kind(),
            "editor-sync"
        );
    }
}
