//! Render client: turns raw content into previewable HTML.
//!
//! The conversion itself sits behind the [`Renderer`] trait so the core
//! only depends on the request/response contract. Two backends exist:
//! - [`NativeRenderer`]: comrak and syntect in-process
//! - [`ProcessRenderer`]: an external converter command
//!
//! [`RenderClient`] dispatches requests and hands back tagged responses;
//! [`PreviewPane`] decides which of them are still current.

mod assets;
mod native;
mod preview;
mod process;

pub use assets::{is_relative_asset, resolve_asset_urls, to_file_url};
pub use native::NativeRenderer;
pub use preview::{Preview, PreviewPane};
pub use process::ProcessRenderer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::error::Result;
use crate::session::FileType;

/// One conversion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderRequest {
    /// Read a file and render it according to its extension.
    File(PathBuf),
    /// Raw markdown with no file backing.
    Markdown(String),
    /// Source code; the path, when known, picks the language.
    Code {
        content: String,
        source_path: Option<PathBuf>,
    },
    /// Plain text shown preformatted.
    Text(String),
    /// HTML shown as-is.
    Html(String),
}

impl RenderRequest {
    /// The request that renders `content` as a file of `file_type`.
    pub fn for_content(file_type: FileType, content: String, source_path: Option<&Path>) -> Self {
        match file_type {
            FileType::Markdown => Self::Markdown(content),
            FileType::Html => Self::Html(content),
            FileType::Text => Self::Text(content),
            FileType::Code => Self::Code {
                content,
                source_path: source_path.map(Path::to_path_buf),
            },
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Markdown(_) => "markdown",
            Self::Code { .. } => "code",
            Self::Text(_) => "text",
            Self::Html(_) => "html",
        }
    }
}

/// Converts a request into an HTML fragment.
///
/// Implementations must be callable from several threads at once; no call
/// may influence another.
pub trait Renderer: Send + Sync {
    /// # Errors
    /// `Render` with the converter's diagnostic text, or `FileNotFound` for
    /// a [`RenderRequest::File`] whose path is gone.
    fn render(&self, request: &RenderRequest) -> Result<String>;
}

/// Which surface a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewTarget {
    Viewer,
    Editor,
}

#[derive(Debug)]
pub struct RenderResponse {
    pub target: PreviewTarget,
    pub seq: u64,
    pub result: Result<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    /// One worker thread per request.
    Threaded,
    /// Render during `submit`; responses are still delivered through the
    /// channel so callers see the same flow.
    Inline,
}

pub struct RenderClient {
    renderer: Arc<dyn Renderer>,
    dispatch: Dispatch,
    tx: Sender<RenderResponse>,
    rx: Receiver<RenderResponse>,
    next_seq: u64,
}

impl RenderClient {
    pub fn threaded(renderer: Arc<dyn Renderer>) -> Self {
        Self::with_dispatch(renderer, Dispatch::Threaded)
    }

    pub fn inline(renderer: Arc<dyn Renderer>) -> Self {
        Self::with_dispatch(renderer, Dispatch::Inline)
    }

    fn with_dispatch(renderer: Arc<dyn Renderer>, dispatch: Dispatch) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            renderer,
            dispatch,
            tx,
            rx,
            next_seq: 0,
        }
    }

    /// Start rendering `request` for `target`; returns its sequence number.
    pub fn submit(&mut self, target: PreviewTarget, request: RenderRequest) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        tracing::debug!(?target, seq, kind = request.kind(), "render submitted");
        crate::perf::log_event("render.submit", format!("target={target:?} seq={seq} kind={}", request.kind()));

        let renderer = Arc::clone(&self.renderer);
        let tx = self.tx.clone();
        let job = move || {
            let result = {
                let _scope = crate::perf::scope("render.request");
                renderer.render(&request)
            };
            let _ = tx.send(RenderResponse {
                target,
                seq,
                result,
            });
        };
        match self.dispatch {
            Dispatch::Inline => job(),
            Dispatch::Threaded => {
                std::thread::spawn(job);
            }
        }
        seq
    }

    /// A finished response, if one is waiting.
    pub fn try_recv(&self) -> Option<RenderResponse> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<RenderResponse> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl std::fmt::Debug for RenderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderClient")
            .field("dispatch", &self.dispatch)
            .field("next_seq", &self.next_seq)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct Echo;

    impl Renderer for Echo {
        fn render(&self, request: &RenderRequest) -> Result<String> {
            match request {
                RenderRequest::Markdown(text) if text == "fail" => {
                    Err(Error::Render("bad input".to_string()))
                }
                RenderRequest::Markdown(text) => Ok(format!("<p>{text}</p>")),
                other => Ok(other.kind().to_string()),
            }
        }
    }

    #[test]
    fn test_for_content_dispatches_by_file_type() {
        let code = RenderRequest::for_content(
            FileType::Code,
            "x = 1".to_string(),
            Some(Path::new("/a/b.py")),
        );
        assert_eq!(
            code,
            RenderRequest::Code {
                content: "x = 1".to_string(),
                source_path: Some(PathBuf::from("/a/b.py")),
            }
        );
        assert_eq!(
            RenderRequest::for_content(FileType::Text, "t".to_string(), None).kind(),
            "text"
        );
        assert_eq!(
            RenderRequest::for_content(FileType::Html, "h".to_string(), None).kind(),
            "html"
        );
    }

    #[test]
    fn test_inline_client_tags_responses_with_increasing_seq() {
        let mut client = RenderClient::inline(Arc::new(Echo));
        let first = client.submit(PreviewTarget::Viewer, RenderRequest::Markdown("a".into()));
        let second = client.submit(PreviewTarget::Editor, RenderRequest::Markdown("b".into()));
        assert!(second > first);

        let r1 = client.try_recv().unwrap();
        assert_eq!((r1.target, r1.seq), (PreviewTarget::Viewer, first));
        assert_eq!(r1.result.unwrap(), "<p>a</p>");
        let r2 = client.try_recv().unwrap();
        assert_eq!(r2.seq, second);
        assert!(client.try_recv().is_none());
    }

    #[test]
    fn test_threaded_client_delivers_failures() {
        let mut client = RenderClient::threaded(Arc::new(Echo));
        let seq = client.submit(PreviewTarget::Editor, RenderRequest::Markdown("fail".into()));
        let response = client.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(response.seq, seq);
        assert_eq!(response.result.unwrap_err().to_string(), "bad input");
    }
}
