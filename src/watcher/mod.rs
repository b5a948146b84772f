//! File change watcher for the managed document.
//!
//! Uses the notify crate for cross-platform file system events. Editors
//! usually save through a temp file and rename, so the parent directory is
//! watched and events are filtered down to the target.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::debounce::Debouncer;

/// Watches one file and reports coalesced change notifications.
pub struct FileChangeWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    burst: Debouncer<()>,
}

impl FileChangeWatcher {
    /// Watch `path`, coalescing bursts of events that arrive within
    /// `quiet_ms` of each other into one notification.
    ///
    /// # Errors
    /// Returns an error if the watcher cannot be created or the directory
    /// cannot be watched.
    pub fn new(path: impl AsRef<Path>, quiet_ms: u64) -> notify::Result<Self> {
        // Event paths from the OS are canonical; match them against a
        // canonical target.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        tracing::info!(target = %target_path.display(), root = %watch_root.display(), "watching");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            burst: Debouncer::new(quiet_ms),
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Drain pending OS events; returns true once a change has been quiet
    /// for the coalescing window.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => tracing::warn!(%err, "watch error"),
            }
        }

        if relevant + ignored > 0 {
            tracing::debug!(relevant, ignored, target = %self.target_path.display(), "watch events");
            crate::perf::log_event("watcher.poll", format!("relevant={relevant} ignored={ignored}"));
        }
        if relevant > 0 {
            self.burst.queue((), now_ms);
        }
        self.burst.take_ready(now_ms).is_some()
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

impl std::fmt::Debug for FileChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileChangeWatcher")
            .field("target_path", &self.target_path)
            .field("watch_root", &self.watch_root)
            .field("pending", &self.burst.is_pending())
            .finish_non_exhaustive()
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
