//! Error types for page store operations

use crate::path::PagePath;
use folio_babel::FormatError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors from loading, saving and materializing pages
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing a backing file failed
    Io { path: PathBuf, source: io::Error },
    /// The backing file changed since it was last loaded or saved
    Conflict { path: PagePath, file: PathBuf },
    /// No materialized page at this path
    NotFound(PagePath),
    /// A backing file already exists for this path
    AlreadyExists(PagePath),
    /// Saving with a dialect other than the one the page was created with
    DialectMismatch {
        path: PagePath,
        page: String,
        requested: String,
    },
    /// Text that is not a valid page path or link target
    InvalidPath(String),
    Format(FormatError),
    InvalidSettings(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => {
                write!(f, "I/O error on {}: {source}", path.display())
            }
            StoreError::Conflict { path, file } => write!(
                f,
                "Page '{path}' was modified on disk ({}) since it was last read",
                file.display()
            ),
            StoreError::NotFound(path) => write!(f, "Page '{path}' does not exist"),
            StoreError::AlreadyExists(path) => write!(f, "Page '{path}' already exists"),
            StoreError::DialectMismatch {
                path,
                page,
                requested,
            } => write!(
                f,
                "Page '{path}' is stored as '{page}', cannot save it as '{requested}'"
            ),
            StoreError::InvalidPath(msg) => write!(f, "Invalid page path: {msg}"),
            StoreError::Format(err) => write!(f, "{err}"),
            StoreError::InvalidSettings(msg) => write!(f, "Invalid notebook settings: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Format(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormatError> for StoreError {
    fn from(err: FormatError) -> Self {
        StoreError::Format(err)
    }
}
