use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::coordinator::{Coordinator, Surface};
use crate::highlight::HighlightBackground;
use crate::ui::preview_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Terminal-side state wrapped around the coordinator.
///
/// The coordinator owns the document state; this adds what only the
/// terminal needs: dimensions, toasts, help and quit confirmation.
#[derive(Debug)]
pub struct Model {
    pub coordinator: Coordinator,
    pub width: u16,
    pub height: u16,
    pub help_visible: bool,
    pub should_quit: bool,
    /// Set after a quit attempt with unsaved edits; a second quit proceeds.
    pub quit_confirmation_pending: bool,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    pub background: HighlightBackground,
    toast: Option<Toast>,
}

impl Model {
    pub const fn new(coordinator: Coordinator, size: (u16, u16)) -> Self {
        Self {
            coordinator,
            width: size.0,
            height: size.1,
            help_visible: false,
            should_quit: false,
            quit_confirmation_pending: false,
            config_global_path: None,
            config_local_path: None,
            background: HighlightBackground::Dark,
            toast: None,
        }
    }

    /// Rows available to a surface body: everything but the header and
    /// status rows.
    pub const fn body_height(&self) -> usize {
        self.height.saturating_sub(2) as usize
    }

    pub fn viewer_lines(&self) -> Vec<String> {
        preview_lines(self.coordinator.viewer().preview().preview())
    }

    pub fn editor_preview_lines(&self) -> Vec<String> {
        self.coordinator
            .editor()
            .map(|e| preview_lines(e.preview().preview()))
            .unwrap_or_default()
    }

    pub fn editor_is_dirty(&self) -> bool {
        self.coordinator.editor().is_some_and(|e| e.is_dirty())
    }

    /// Edits that quitting now would lose: a dirty editor, or a draft
    /// left behind when the editor was closed.
    pub fn has_unsaved_work(&self) -> bool {
        self.editor_is_dirty() || self.coordinator.store().has_unsaved_draft()
    }

    pub fn editing(&self) -> bool {
        self.coordinator.visible() == Surface::Editor && self.coordinator.editor().is_some()
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Keep the editor caret inside the visible rows.
    pub fn scroll_editor_to_cursor(&mut self) {
        let height = self.body_height().max(1);
        if let Some(editor) = self.coordinator.editor_mut() {
            let line = editor.buffer().cursor().line;
            let offset = editor.scroll_offset();
            if line < offset {
                editor.set_scroll_offset(line);
            } else if line >= offset + height {
                editor.set_scroll_offset(line + 1 - height);
            }
        }
    }
}
