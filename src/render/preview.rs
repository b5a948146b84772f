use std::path::{Path, PathBuf};

use super::{PreviewTarget, RenderClient, RenderRequest, RenderResponse, resolve_asset_urls};

/// What a preview area currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Empty,
    Html(String),
    /// Inline error block with the diagnostic text.
    Error(String),
}

/// A preview area that only accepts the response to its latest request.
///
/// Render calls are not cancellable, so an older request can finish after
/// a newer one. Each request's sequence number is remembered and anything
/// else is dropped on arrival.
#[derive(Debug)]
pub struct PreviewPane {
    target: PreviewTarget,
    latest: Option<u64>,
    source_path: Option<PathBuf>,
    preview: Preview,
}

impl PreviewPane {
    pub const fn new(target: PreviewTarget) -> Self {
        Self {
            target,
            latest: None,
            source_path: None,
            preview: Preview::Empty,
        }
    }

    /// Relative links in rendered output resolve against this file.
    pub fn set_source_path(&mut self, path: Option<&Path>) {
        self.source_path = path.map(Path::to_path_buf);
    }

    pub const fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn html(&self) -> Option<&str> {
        match &self.preview {
            Preview::Html(html) => Some(html),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.preview {
            Preview::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Submit `request`, superseding anything still in flight.
    pub fn request(&mut self, client: &mut RenderClient, request: RenderRequest) {
        self.latest = Some(client.submit(self.target, request));
    }

    /// Apply a response. Returns `false` when it was stale and dropped.
    pub fn accept(&mut self, response: RenderResponse) -> bool {
        if response.target != self.target || self.latest != Some(response.seq) {
            tracing::debug!(
                target_pane = ?self.target,
                seq = response.seq,
                latest = ?self.latest,
                "dropping stale render response"
            );
            return false;
        }
        self.latest = None;
        self.preview = match response.result {
            Ok(html) => Preview::Html(resolve_asset_urls(&html, self.source_path.as_deref())),
            Err(err) => {
                tracing::warn!(pane = ?self.target, %err, "render failed");
                Preview::Error(err.to_string())
            }
        };
        true
    }

    /// Replace the preview with an error; in-flight renders are abandoned.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.latest = None;
        self.preview = Preview::Error(message.into());
    }

    pub fn clear(&mut self) {
        self.latest = None;
        self.preview = Preview::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn response(target: PreviewTarget, seq: u64, html: &str) -> RenderResponse {
        RenderResponse {
            target,
            seq,
            result: Ok(html.to_string()),
        }
    }

    #[test]
    fn test_out_of_order_response_is_dropped() {
        let mut pane = PreviewPane::new(PreviewTarget::Editor);
        pane.latest = Some(7);

        assert!(!pane.accept(response(PreviewTarget::Editor, 6, "<p>old</p>")));
        assert_eq!(pane.preview(), &Preview::Empty);
        assert!(pane.accept(response(PreviewTarget::Editor, 7, "<p>new</p>")));
        assert_eq!(pane.html(), Some("<p>new</p>"));
        assert!(!pane.is_pending());
    }

    #[test]
    fn test_response_for_other_pane_is_dropped() {
        let mut pane = PreviewPane::new(PreviewTarget::Viewer);
        pane.latest = Some(1);
        assert!(!pane.accept(response(PreviewTarget::Editor, 1, "x")));
    }

    #[test]
    fn test_failure_becomes_inline_error() {
        let mut pane = PreviewPane::new(PreviewTarget::Viewer);
        pane.latest = Some(3);
        pane.accept(RenderResponse {
            target: PreviewTarget::Viewer,
            seq: 3,
            result: Err(Error::Render("converter crashed".to_string())),
        });
        assert_eq!(pane.error(), Some("converter crashed"));
    }

    #[test]
    fn test_show_error_abandons_in_flight_render() {
        let mut pane = PreviewPane::new(PreviewTarget::Editor);
        pane.latest = Some(4);
        pane.show_error("File not found.");
        assert!(!pane.accept(response(PreviewTarget::Editor, 4, "late")));
        assert_eq!(pane.error(), Some("File not found."));
    }

    #[test]
    fn test_accepted_html_has_assets_resolved() {
        let mut pane = PreviewPane::new(PreviewTarget::Viewer);
        pane.set_source_path(Some(Path::new("/notes/today.md")));
        pane.latest = Some(1);
        pane.accept(response(PreviewTarget::Viewer, 1, r#"<img src="pic.png">"#));
        assert_eq!(pane.html(), Some(r#"<img src="file:///notes/pic.png">"#));
    }
}
