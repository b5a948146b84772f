use std::path::Path;

use comrak::nodes::{NodeHtmlBlock, NodeValue};
use comrak::{Arena, Options, format_html, markdown_to_html, parse_document};

use super::{RenderRequest, Renderer};
use crate::error::{Error, Result};
use crate::highlight::{escape_html, highlight_fenced, highlight_to_html};
use crate::session::FileType;

/// In-process renderer: comrak for markdown, syntect for code.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRenderer;

impl NativeRenderer {
    pub const fn new() -> Self {
        Self
    }

    fn markdown_options() -> Options {
        let mut options = Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.shortcodes = true;
        // Markdown files routinely embed raw HTML (badges, <details>).
        options.render.unsafe_ = true;
        options
    }

    /// Markdown to HTML, with fenced code in a known language highlighted.
    pub fn markdown(content: &str) -> String {
        let _scope = crate::perf::scope("render.native.markdown");
        let options = Self::markdown_options();
        let arena = Arena::new();
        let root = parse_document(&arena, content, &options);

        for node in root.descendants() {
            let mut data = node.data.borrow_mut();
            let highlighted = match &data.value {
                NodeValue::CodeBlock(block) if block.fenced => {
                    let lang = block.info.split_whitespace().next().unwrap_or_default();
                    highlight_fenced(&block.literal, lang)
                }
                _ => None,
            };
            if let Some(literal) = highlighted {
                data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
                    block_type: 0,
                    literal,
                });
            }
        }

        let mut html = Vec::new();
        if let Err(err) = format_html(root, &options, &mut html) {
            tracing::warn!(%err, "formatting highlighted markdown failed");
            return markdown_to_html(content, &options);
        }
        String::from_utf8_lossy(&html).into_owned()
    }

    pub fn text(content: &str) -> String {
        format!("<pre class=\"preformatted\">{}</pre>\n", escape_html(content))
    }

    pub fn code(content: &str, source_path: Option<&Path>) -> String {
        highlight_to_html(content, source_path)
    }

    fn file(path: &Path) -> Result<String> {
        let content =
            std::fs::read_to_string(path).map_err(|err| Error::from_read(path.to_path_buf(), err))?;
        Ok(match FileType::from_path(path) {
            FileType::Markdown => Self::markdown(&content),
            FileType::Html => content,
            FileType::Text => Self::text(&content),
            FileType::Code => Self::code(&content, Some(path)),
        })
    }
}

impl Renderer for NativeRenderer {
    fn render(&self, request: &RenderRequest) -> Result<String> {
        match request {
            RenderRequest::File(path) => Self::file(path),
            RenderRequest::Markdown(content) => Ok(Self::markdown(content)),
            RenderRequest::Code {
                content,
                source_path,
            } => Ok(Self::code(content, source_path.as_deref())),
            RenderRequest::Text(content) => Ok(Self::text(content)),
            RenderRequest::Html(content) => Ok(content.clone()),
        }
    }
}
