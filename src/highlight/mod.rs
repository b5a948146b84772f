//! Syntax highlighting for code previews.
//!
//! Uses syntect with Sublime Text syntax definitions and emits class-based
//! HTML, so the look comes from the stylesheet rather than inline colors.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::OnceLock;

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const CLASS_STYLE: ClassStyle = ClassStyle::Spaced;

/// Background the stylesheet should suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightBackground {
    Light,
    Dark,
}

impl HighlightBackground {
    /// Guess from the `COLORFGBG` convention (`fg;bg`), defaulting to dark.
    pub fn from_colorfgbg(colorfgbg: Option<&str>) -> Self {
        let Some(value) = colorfgbg else {
            return Self::Dark;
        };
        let bg_str = value.rsplit(';').next().unwrap_or(value);
        match bg_str.parse::<u8>() {
            Ok(bg) if bg >= 7 => Self::Light,
            _ => Self::Dark,
        }
    }

    pub fn detect() -> Self {
        Self::from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
    }
}

/// Find the syntax for a source path, by extension first and then by the
/// first line of `code`.
pub fn syntax_for(source_path: Option<&Path>, code: &str) -> Option<&'static SyntaxReference> {
    let syntax_set = syntax_set();
    let by_extension = source_path
        .and_then(|p| p.extension())
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let ext = ext.to_ascii_lowercase();
            syntax_set
                .find_syntax_by_extension(&ext)
                .or_else(|| fallback_extension(&ext).and_then(|e| syntax_set.find_syntax_by_extension(e)))
        });
    by_extension.or_else(|| {
        code.lines()
            .next()
            .and_then(|first| syntax_set.find_syntax_by_first_line(first))
    })
}

/// Extensions the default syntax set lacks, mapped to a close relative.
fn fallback_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "ts" | "tsx" | "mjs" | "cjs" => Some("js"),
        "mdx" | "mdown" => Some("md"),
        _ => None,
    }
}

/// Render `code` as a two-column table of line numbers and highlighted
/// source.
pub fn highlight_to_html(code: &str, source_path: Option<&Path>) -> String {
    let _scope = crate::perf::scope("highlight.to_html");
    let syntax = syntax_for(source_path, code);
    let language = syntax.map_or("text", |s| s.name.as_str());
    let body = syntax
        .and_then(|syntax| classed_lines(syntax, code))
        .unwrap_or_else(|| escape_html(code));

    let line_count = LinesWithEndings::from(code).count().max(1);
    let mut numbers = String::new();
    for n in 1..=line_count {
        let _ = writeln!(numbers, "{n}");
    }

    format!(
        "<table class=\"codehilitetable\"><tr>\
         <td class=\"linenos\"><div class=\"linenodiv\"><pre>{numbers}</pre></div></td>\
         <td class=\"code\"><div class=\"codehilite\"><pre><code class=\"language-{}\">{body}</code></pre></div></td>\
         </tr></table>\n",
        escape_html(&language.to_ascii_lowercase())
    )
}

/// Highlight a fenced code block whose info string starts with `lang`.
///
/// Returns `None` when the language is unknown, so the caller can keep
/// its plain rendering.
pub fn highlight_fenced(code: &str, lang: &str) -> Option<String> {
    let lang = lang.trim();
    if lang.is_empty() {
        return None;
    }
    let syntax_set = syntax_set();
    let syntax = syntax_set.find_syntax_by_token(lang).or_else(|| {
        fallback_extension(&lang.to_ascii_lowercase())
            .and_then(|ext| syntax_set.find_syntax_by_token(ext))
    })?;
    let body = classed_lines(syntax, code)?;
    Some(format!(
        "<div class=\"codehilite\"><pre><code class=\"language-{}\">{body}</code></pre></div>\n",
        escape_html(&lang.to_ascii_lowercase())
    ))
}

fn classed_lines(syntax: &SyntaxReference, code: &str) -> Option<String> {
    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set(), CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::warn!(syntax = %syntax.name, %err, "highlighting failed, falling back to plain");
            return None;
        }
    }
    Some(generator.finalize())
}

/// CSS for the highlight classes, themed for `background`.
///
/// # Errors
/// Returns an error if syntect cannot express the theme as CSS.
pub fn stylesheet(background: HighlightBackground) -> Result<String, syntect::Error> {
    css_for_theme_with_class_style(theme_for(background), CLASS_STYLE)
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        ThemeSet::load_defaults()
    })
}

fn theme_for(background: HighlightBackground) -> &'static Theme {
    static FALLBACK: OnceLock<Theme> = OnceLock::new();
    let themes = &theme_set().themes;
    let preferred = match background {
        HighlightBackground::Dark => [
            "Monokai Extended",
            "Dracula",
            "Solarized (dark)",
            "base16-ocean.dark",
        ]
        .as_slice(),
        HighlightBackground::Light => {
            ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"].as_slice()
        }
    };
    preferred
        .iter()
        .find_map(|name| themes.get(*name))
        .or_else(|| themes.values().next())
        .unwrap_or_else(|| FALLBACK.get_or_init(Theme::default))
}

/// Minimal HTML text escaping for element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
