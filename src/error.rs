//! Error taxonomy shared by the store, the render client and the surfaces.
//!
//! Every variant is recoverable: surfaces turn them into an inline error
//! block instead of tearing anything down.

use std::path::PathBuf;

/// Errors raised by document operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The managed file does not exist at the time of the operation.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// An edit or save was attempted with no managed file.
    #[error("No file path set.")]
    NoFileSelected,

    /// Writing the file failed. The in-memory draft is left intact.
    #[error("Failed to save {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The converter failed; carries its diagnostic text verbatim.
    #[error("{0}")]
    Render(String),

    /// Reading the file failed for a reason other than it being missing.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Classify a read failure, keeping `NotFound` distinct.
    pub(crate) fn from_read(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
