//! Timing scopes and an optional render debug log.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: LazyLock<Mutex<Option<DebugLog>>> = LazyLock::new(|| Mutex::new(None));

/// Guard that reports its lifetime when timing is enabled.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(target: "mdview::perf", scope = self.name, elapsed_ms, "timing");
        log_event(self.name, format!("{elapsed_ms:.2} ms"));
    }
}

#[derive(Debug)]
struct DebugLog {
    start: Instant,
    writer: BufWriter<File>,
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Route [`log_event`] output to `path`, or switch it off with `None`.
///
/// # Errors
/// Returns an error if the log file cannot be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut guard = DEBUG_LOG.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            writeln!(writer, "mdview render debug log start")?;
            writer.flush()?;
            Some(DebugLog {
                start: Instant::now(),
                writer,
            })
        }
        None => None,
    };
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    DEBUG_LOG
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let mut guard = DEBUG_LOG.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(log) = guard.as_mut() else {
        return;
    };
    let elapsed_ms = log.start.elapsed().as_secs_f64() * 1000.0;
    let _ = writeln!(log.writer, "[{elapsed_ms:>10.3} ms] {name}: {}", detail.as_ref());
    let _ = log.writer.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_enabled_toggles_runtime_flag() {
        set_enabled(true);
        assert!(is_enabled());

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_debug_log_path_enables_logging_and_writes() {
        let temp_file = NamedTempFile::new().unwrap();
        set_debug_log_path(Some(temp_file.path())).unwrap();
        assert!(is_debug_log_enabled());
        log_event("render.editor", "seq=3 bytes=120");
        set_debug_log_path(None).unwrap();
        assert!(!is_debug_log_enabled());

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("mdview render debug log start"));
        assert!(content.contains("render.editor: seq=3 bytes=120"));
    }

    #[test]
    fn test_debug_log_in_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("render.log");
        assert!(set_debug_log_path(Some(&path)).is_err());
    }
}
