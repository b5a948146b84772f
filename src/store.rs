//! Draft state store: the authority on what the managed file looks like
//! right now.
//!
//! The store outlives any editor, so closing and reopening the editor
//! recovers unsaved work from here.

use std::path::Path;

use crate::bus::{BusMessage, BusSender, Endpoint};
use crate::error::{Error, Result};
use crate::session::DocumentSession;

#[derive(Debug)]
pub struct DraftStore {
    session: DocumentSession,
    persisted: Option<String>,
    draft: Option<String>,
    bus: BusSender,
}

impl DraftStore {
    pub const fn new(session: DocumentSession, bus: BusSender) -> Self {
        Self {
            session,
            persisted: None,
            draft: None,
            bus,
        }
    }

    pub const fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub const fn has_draft(&self) -> bool {
        self.draft.is_some()
    }

    /// Whether the draft holds text that is not on disk.
    pub fn has_unsaved_draft(&self) -> bool {
        self.draft
            .as_deref()
            .is_some_and(|draft| self.persisted.as_deref() != Some(draft))
    }

    /// Forget the draft so the next baseline comes from disk.
    pub fn clear_draft(&mut self) {
        if self.draft.take().is_some() {
            tracing::debug!("draft cleared");
        }
    }

    /// Last content read from or written to disk.
    pub fn persisted(&self) -> Option<&str> {
        self.persisted.as_deref()
    }

    /// The content to show absent further edits: the draft when one
    /// exists, otherwise the file on disk.
    ///
    /// # Errors
    /// `NoFileSelected` without a managed path, `FileNotFound` when the
    /// file is gone and there is no draft.
    pub fn baseline(&mut self) -> Result<String> {
        if let Some(draft) = &self.draft {
            return Ok(draft.clone());
        }
        self.read_persisted()
    }

    /// Re-read the managed file from disk, ignoring any draft.
    ///
    /// # Errors
    /// `NoFileSelected`, `FileNotFound`, or `Io` for other read failures.
    pub fn read_persisted(&mut self) -> Result<String> {
        let path = self.session.file_path().ok_or(Error::NoFileSelected)?;
        let _scope = crate::perf::scope("store.read_persisted");
        let content =
            std::fs::read_to_string(path).map_err(|err| Error::from_read(path.to_path_buf(), err))?;
        self.persisted = Some(content.clone());
        Ok(content)
    }

    /// Record an unsaved edit and forward it to the viewer.
    ///
    /// Updates for any path other than the managed one are stale and
    /// ignored. Returns whether the update was accepted.
    pub fn update_draft(&mut self, path: &Path, content: String) -> bool {
        if !self.session.is_managed(path) {
            tracing::debug!(path = %path.display(), "ignoring draft for unmanaged path");
            return false;
        }
        self.draft = Some(content.clone());
        self.bus
            .post(Endpoint::Viewer, BusMessage::MarkdownUpdated(content));
        true
    }

    /// Write `content` to `path` and drop the draft.
    ///
    /// # Errors
    /// `NoFileSelected` when `path` is `None`; `Persistence` when the write
    /// fails, in which case the draft is left as it was.
    pub fn save(&mut self, path: Option<&Path>, content: &str) -> Result<()> {
        let path = path.ok_or(Error::NoFileSelected)?;
        let _scope = crate::perf::scope("store.save");
        std::fs::write(path, content).map_err(|source| Error::Persistence {
            path: path.to_path_buf(),
            source,
        })?;
        if self.session.is_managed(path) {
            self.persisted = Some(content.to_string());
        }
        self.draft = None;
        tracing::info!(path = %path.display(), bytes = content.len(), "saved");
        crate::perf::log_event("store.save", format!("path={} bytes={}", path.display(), content.len()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn store_for(path: &Path, bus: &Bus) -> DraftStore {
        DraftStore::new(DocumentSession::init(Some(path.to_path_buf())), bus.sender())
    }

    #[test]
    fn test_baseline_prefers_latest_draft() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "on disk").unwrap();
        let bus = Bus::new();
        let mut store = store_for(&path, &bus);

        assert_eq!(store.baseline().unwrap(), "on disk");
        assert!(store.update_draft(&path, "first".to_string()));
        assert!(store.update_draft(&path, "second".to_string()));
        assert_eq!(store.baseline().unwrap(), "second");
    }

    #[test]
    fn test_unsaved_draft_compares_against_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "on disk").unwrap();
        let bus = Bus::new();
        let mut store = store_for(&path, &bus);
        store.baseline().unwrap();

        store.update_draft(&path, "on disk".to_string());
        assert!(store.has_draft());
        assert!(!store.has_unsaved_draft());

        store.update_draft(&path, "edited".to_string());
        assert!(store.has_unsaved_draft());

        store.clear_draft();
        assert!(!store.has_draft());
        assert_eq!(store.baseline().unwrap(), "on disk");
    }

    #[test]
    fn test_draft_update_is_forwarded_to_viewer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "x").unwrap();
        let bus = Bus::new();
        let mut store = store_for(&path, &bus);

        store.update_draft(&path, "live".to_string());
        let sent = bus.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, Endpoint::Viewer);
        assert_eq!(sent[0].message, BusMessage::MarkdownUpdated("live".to_string()));
    }

    #[test]
    fn test_foreign_draft_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "x").unwrap();
        let bus = Bus::new();
        let mut store = store_for(&path, &bus);

        assert!(!store.update_draft(&dir.path().join("other.md"), "nope".to_string()));
        assert!(!store.has_draft());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_save_clears_draft_and_accepts_later_drafts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "old").unwrap();
        let bus = Bus::new();
        let mut store = store_for(&path, &bus);

        store.update_draft(&path, "edited".to_string());
        store.save(Some(&path), "edited").unwrap();
        assert!(!store.has_draft());
        assert_eq!(store.baseline().unwrap(), "edited");
        assert_eq!(store.persisted(), Some("edited"));

        assert!(store.update_draft(&path, "stale".to_string()));
        assert_eq!(store.baseline().unwrap(), "stale");
    }

    #[test]
    fn test_save_without_path_is_no_file_selected() {
        let bus = Bus::new();
        let mut store = DraftStore::new(DocumentSession::init(None), bus.sender());
        assert!(matches!(store.save(None, "x"), Err(Error::NoFileSelected)));
    }

    #[test]
    fn test_failed_save_keeps_draft() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "x").unwrap();
        let bus = Bus::new();
        let mut store = store_for(&path, &bus);
        store.update_draft(&path, "precious".to_string());

        let unwritable = dir.path().join("missing-dir").join("doc.md");
        let err = store.save(Some(&unwritable), "precious").unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));
        assert_eq!(store.draft(), Some("precious"));
    }

    #[test]
    fn test_baseline_of_deleted_file_is_file_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        let bus = Bus::new();
        let mut store = store_for(&path, &bus);
        assert!(matches!(store.baseline(), Err(Error::FileNotFound(p)) if p == path));
    }

    #[test]
    fn test_baseline_without_file_is_no_file_selected() {
        let bus = Bus::new();
        let mut store = DraftStore::new(DocumentSession::init(None), bus.sender());
        assert!(matches!(store.baseline(), Err(Error::NoFileSelected)));
        assert!(!store.update_draft(&PathBuf::from("a.md"), "x".to_string()));
    }
}
