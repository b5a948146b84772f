//! Rewrite relative asset references in rendered HTML so they resolve
//! against the source file's directory.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static ASSET_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?P<attr>src|href)="(?P<url>[^"]*)""#).expect("asset attribute regex")
});

/// Scheme (`https:`, `data:`), protocol-relative (`//`), or fragment (`#`).
static NON_RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z\d+\-.]*:|//|#)").expect("non-relative url regex")
});

/// Whether an attribute value is a path relative to the document.
pub fn is_relative_asset(value: &str) -> bool {
    !value.is_empty() && !NON_RELATIVE.is_match(value)
}

/// `file://` URL for a filesystem path; backslashes become slashes.
pub fn to_file_url(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{normalized}")
    } else {
        format!("file:///{normalized}")
    }
}

fn parent_dir_url(source_path: &Path) -> Option<String> {
    let parent = source_path.parent().filter(|p| !p.as_os_str().is_empty())?;
    let mut dir = parent.to_string_lossy().replace('\\', "/");
    if !dir.ends_with('/') {
        dir.push('/');
    }
    Some(to_file_url(&dir))
}

/// Point relative `src`/`href` attributes at the directory of
/// `source_path`. Without a usable directory the HTML is returned as-is.
pub fn resolve_asset_urls(html: &str, source_path: Option<&Path>) -> String {
    let Some(base) = source_path.and_then(parent_dir_url) else {
        return html.to_string();
    };
    ASSET_ATTR
        .replace_all(html, |caps: &Captures<'_>| {
            let attr = &caps["attr"];
            let url = &caps["url"];
            if is_relative_asset(url) {
                let relative = url.strip_prefix("./").unwrap_or(url);
                format!("{attr}=\"{base}{relative}\"")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
