//! Read-only preview surface.

use std::path::{Path, PathBuf};

use crate::render::{PreviewPane, PreviewTarget, RenderClient, RenderRequest, RenderResponse};
use crate::session::{DocumentSession, FileType};
use crate::store::DraftStore;

pub const EMPTY_STATE: &str = "No file loaded";

/// Longest fragment forwarded for cursor placement.
pub const MAX_FRAGMENT_CHARS: usize = 140;

#[derive(Debug)]
pub struct ViewerSurface {
    file_path: Option<PathBuf>,
    file_type: FileType,
    preview: PreviewPane,
    scroll_offset: usize,
}

impl ViewerSurface {
    pub fn new(session: &DocumentSession) -> Self {
        let mut preview = PreviewPane::new(PreviewTarget::Viewer);
        preview.set_source_path(session.file_path());
        Self {
            file_path: session.file_path().map(Path::to_path_buf),
            file_type: session.file_type(),
            preview,
            scroll_offset: 0,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub const fn has_file(&self) -> bool {
        self.file_path.is_some()
    }

    /// Header text: the managed path, or the empty-state message.
    pub fn title(&self) -> String {
        self.file_path
            .as_ref()
            .map_or_else(|| EMPTY_STATE.to_string(), |p| p.display().to_string())
    }

    pub const fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub const fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
    }

    /// Load the current baseline and render it. Without a file the
    /// preview is cleared and the empty state shows.
    pub fn load(&mut self, store: &mut DraftStore, client: &mut RenderClient) {
        if self.file_path.is_none() {
            self.preview.clear();
            return;
        }
        let _scope = crate::perf::scope("viewer.load");
        match store.baseline() {
            Ok(content) => self.render(content, client),
            Err(err) => {
                tracing::warn!(%err, "viewer load failed");
                self.preview.show_error(err.to_string());
            }
        }
    }

    /// A draft arrived from the store.
    pub fn on_markdown_updated(&mut self, content: String, client: &mut RenderClient) {
        self.render(content, client);
    }

    pub fn on_file_changed(&mut self, store: &mut DraftStore, client: &mut RenderClient) {
        self.load(store, client);
    }

    fn render(&mut self, content: String, client: &mut RenderClient) {
        let request = RenderRequest::for_content(self.file_type, content, self.file_path.as_deref());
        self.preview.request(client, request);
    }

    pub fn accept_render(&mut self, response: RenderResponse) -> bool {
        self.preview.accept(response)
    }

    /// Normalize clicked preview text into a locator fragment.
    pub fn fragment_at(text: &str) -> String {
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(MAX_FRAGMENT_CHARS)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::render::{NativeRenderer, Preview};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn pump(viewer: &mut ViewerSurface, client: &RenderClient) {
        while let Some(response) = client.try_recv() {
            viewer.accept_render(response);
        }
    }

    #[test]
    fn test_no_file_shows_empty_state() {
        let bus = Bus::new();
        let session = DocumentSession::init(None);
        let mut store = DraftStore::new(session.clone(), bus.sender());
        let mut client = RenderClient::inline(Arc::new(NativeRenderer::new()));
        let mut viewer = ViewerSurface::new(&session);

        viewer.load(&mut store, &mut client);
        assert!(!viewer.has_file());
        assert_eq!(viewer.title(), EMPTY_STATE);
        assert_eq!(viewer.preview().preview(), &Preview::Empty);
        assert!(client.try_recv().is_none());
    }

    #[test]
    fn test_load_renders_by_file_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Line one\nLine two\n").unwrap();
        let bus = Bus::new();
        let session = DocumentSession::init(Some(path));
        let mut store = DraftStore::new(session.clone(), bus.sender());
        let mut client = RenderClient::inline(Arc::new(NativeRenderer::new()));
        let mut viewer = ViewerSurface::new(&session);

        viewer.load(&mut store, &mut client);
        pump(&mut viewer, &client);
        let html = viewer.preview().html().unwrap();
        assert!(html.contains("<pre class=\"preformatted\">Line one\nLine two\n</pre>"));
    }

    #[test]
    fn test_missing_file_shows_inline_error() {
        let dir = tempdir().unwrap();
        let session = DocumentSession::init(Some(dir.path().join("gone.md")));
        let bus = Bus::new();
        let mut store = DraftStore::new(session.clone(), bus.sender());
        let mut client = RenderClient::inline(Arc::new(NativeRenderer::new()));
        let mut viewer = ViewerSurface::new(&session);

        viewer.load(&mut store, &mut client);
        assert!(viewer.preview().error().unwrap().contains("gone.md"));
    }

    #[test]
    fn test_markdown_update_rerenders() {
        let session = DocumentSession::init(Some(PathBuf::from("/docs/a.md")));
        let mut client = RenderClient::inline(Arc::new(NativeRenderer::new()));
        let mut viewer = ViewerSurface::new(&session);

        viewer.on_markdown_updated("# Draft".to_string(), &mut client);
        pump(&mut viewer, &client);
        assert!(viewer.preview().html().unwrap().contains("<h1>Draft</h1>"));
    }

    #[test]
    fn test_fragment_is_collapsed_and_truncated() {
        assert_eq!(
            ViewerSurface::fragment_at("  Hello \n\t world  "),
            "Hello world"
        );
        let long = "word ".repeat(60);
        assert_eq!(ViewerSurface::fragment_at(&long).chars().count(), MAX_FRAGMENT_CHARS);
        assert_eq!(ViewerSurface::fragment_at("   "), "");
    }
}
