//! Flatten preview HTML into terminal lines.
//!
//! The terminal cannot show HTML, so rendered output is reduced to its
//! text with block boundaries as line breaks. Whitespace collapses as in
//! a browser except inside `<pre>`. Code tables lose their line number
//! column.

use std::sync::LazyLock;

use regex::Regex;

use crate::render::Preview;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").expect("html tag regex")
});

/// Comments, doctype declarations and processing instructions.
static MARKUP_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<![^>]*>|<\?.*?\?>").expect("html markup noise regex")
});

/// Text lines for a preview, as the terminal shows them.
pub fn preview_lines(preview: &Preview) -> Vec<String> {
    match preview {
        Preview::Empty => Vec::new(),
        Preview::Html(html) => html_to_lines(html),
        Preview::Error(message) => message.lines().map(str::to_string).collect(),
    }
}

#[derive(Default)]
struct Flattener {
    out: String,
    pre_depth: usize,
    skipping_cell: bool,
    /// Element whose content is not shown, until its closing tag.
    hidden: Option<String>,
}

impl Flattener {
    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn end_line(&mut self) {
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    fn end_block(&mut self) {
        self.end_line();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn text(&mut self, raw: &str) {
        if self.skipping_cell || self.hidden.is_some() || raw.is_empty() {
            return;
        }
        let decoded = decode_entities(raw);
        if self.pre_depth > 0 {
            self.out.push_str(&decoded);
            return;
        }
        let mut collapsed = String::with_capacity(decoded.len());
        for (i, word) in decoded.split_whitespace().enumerate() {
            if i > 0 {
                collapsed.push(' ');
            }
            collapsed.push_str(word);
        }
        let leading = decoded.starts_with(char::is_whitespace) && !self.at_line_start();
        let trailing = decoded.ends_with(char::is_whitespace) && !collapsed.is_empty();
        if leading {
            self.out.push(' ');
        }
        self.out.push_str(&collapsed);
        if trailing {
            self.out.push(' ');
        }
    }

    fn tag(&mut self, closing: bool, name: &str, attrs: &str) {
        if let Some(hidden) = &self.hidden {
            if closing && hidden == name {
                self.hidden = None;
            }
            return;
        }
        if !closing && is_hidden(name) && !attrs.trim_end().ends_with('/') {
            self.hidden = Some(name.to_string());
            return;
        }
        if self.skipping_cell {
            if closing && name == "td" {
                self.skipping_cell = false;
            }
            return;
        }
        match (closing, name) {
            (false, "td") if attrs.contains("linenos") => self.skipping_cell = true,
            (_, "br") => self.out.push('\n'),
            (false, "pre") => self.pre_depth += 1,
            (true, "pre") => {
                self.pre_depth = self.pre_depth.saturating_sub(1);
                self.end_block();
            }
            (false, "li") => {
                self.end_line();
                self.out.push_str("• ");
            }
            (false, h) if is_heading(h) => {
                self.end_line();
                let level = h[1..].parse::<usize>().unwrap_or(1);
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
            }
            (true, "p" | "blockquote" | "table" | "ul" | "ol") => self.end_block(),
            (true, h) if is_heading(h) => self.end_block(),
            (true, "li" | "tr" | "div") => self.end_line(),
            _ => {}
        }
    }

    fn finish(self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        for line in self.out.lines() {
            let line = line.trim_end();
            if line.is_empty() && lines.last().is_none_or(String::is_empty) {
                continue;
            }
            lines.push(line.to_string());
        }
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines
    }
}

fn is_hidden(name: &str) -> bool {
    matches!(name, "head" | "title" | "style" | "script" | "template")
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

pub fn html_to_lines(html: &str) -> Vec<String> {
    let html = MARKUP_NOISE.replace_all(html, "");
    let html = html.as_ref();
    let mut flat = Flattener::default();
    let mut last = 0;
    for caps in TAG.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        flat.text(&html[last..whole.start()]);
        let name = caps[2].to_ascii_lowercase();
        flat.tag(&caps[1] == "/", &name, &caps[3]);
        last = whole.end();
    }
    flat.text(&html[last..]);
    flat.finish()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
