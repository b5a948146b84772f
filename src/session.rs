//! The document session: which file is managed and how it renders.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extensions accepted on the command line.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "md", "markdown", "mdown", "mdx", "txt", "js", "ts", "py", "json", "yaml", "yml", "html",
    "htm",
];

/// How a file's content is turned into a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Markdown,
    Html,
    Code,
    Text,
}

impl FileType {
    /// Classify a path by its extension alone.
    ///
    /// Unknown or missing extensions render as markdown, which is the
    /// viewer's native format.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(OsStr::to_str)
            .map_or(Self::Markdown, Self::from_extension)
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Self::Html,
            "txt" => Self::Text,
            "js" | "ts" | "py" | "json" | "yaml" | "yml" => Self::Code,
            _ => Self::Markdown,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Code => "code",
            Self::Text => "text",
        }
    }
}

/// Whether `path` has one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Pick the first supported path from `args` and make it absolute.
pub fn resolve_file_path<I, S>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let candidate = args
        .into_iter()
        .map(|arg| PathBuf::from(arg.as_ref()))
        .find(|path| !path.as_os_str().is_empty() && is_supported(path))?;
    Some(absolutize(&candidate))
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The single file managed for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSession {
    file_path: Option<PathBuf>,
    file_type: FileType,
}

impl DocumentSession {
    /// Start a session for `file_path`, or an empty one.
    pub fn init(file_path: Option<PathBuf>) -> Self {
        let file_type = file_path
            .as_deref()
            .map(FileType::from_path)
            .unwrap_or_default();
        tracing::info!(
            path = ?file_path,
            file_type = file_type.label(),
            "document session started"
        );
        Self {
            file_path,
            file_type,
        }
    }

    /// End the session, returning the path it managed.
    pub fn teardown(self) -> Option<PathBuf> {
        tracing::info!(path = ?self.file_path, "document session ended");
        self.file_path
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub const fn file_type(&self) -> FileType {
        self.file_type
    }

    pub const fn has_file(&self) -> bool {
        self.file_path.is_some()
    }

    /// Whether `path` names the managed file.
    pub fn is_managed(&self, path: &Path) -> bool {
        self.file_path.as_deref() == Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_by_extension() {
        assert_eq!(FileType::from_path(Path::new("a.md")), FileType::Markdown);
        assert_eq!(FileType::from_path(Path::new("a.MDX")), FileType::Markdown);
        assert_eq!(FileType::from_path(Path::new("a.htm")), FileType::Html);
        assert_eq!(FileType::from_path(Path::new("a.txt")), FileType::Text);
        assert_eq!(FileType::from_path(Path::new("a.py")), FileType::Code);
        assert_eq!(FileType::from_path(Path::new("a.yml")), FileType::Code);
        assert_eq!(FileType::from_path(Path::new("README")), FileType::Markdown);
    }

    #[test]
    fn test_resolve_skips_unsupported_arguments() {
        let resolved = resolve_file_path(["mdview", "--watch", "notes.png", "/tmp/notes.md"]);
        assert_eq!(resolved, Some(PathBuf::from("/tmp/notes.md")));
    }

    #[test]
    fn test_resolve_makes_relative_paths_absolute() {
        let resolved = resolve_file_path(["doc.TXT"]).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("doc.TXT"));
    }

    #[test]
    fn test_resolve_without_supported_path_is_none() {
        assert_eq!(resolve_file_path(["mdview", "image.png", ""]), None);
    }

    #[test]
    fn test_session_tracks_type_and_path() {
        let session = DocumentSession::init(Some(PathBuf::from("/x/page.html")));
        assert_eq!(session.file_type(), FileType::Html);
        assert!(session.is_managed(Path::new("/x/page.html")));
        assert!(!session.is_managed(Path::new("/x/other.html")));
        assert_eq!(session.teardown(), Some(PathBuf::from("/x/page.html")));
    }

    #[test]
    fn test_empty_session_has_no_file() {
        let session = DocumentSession::init(None);
        assert!(!session.has_file());
        assert!(session.file_path().is_none());
    }
}
