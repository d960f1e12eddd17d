//! File modification signatures
//!
//! A page file is considered unchanged while its modification time and length
//! match the values recorded when it was last read or written.

use serde::Serialize;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileSignature {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl FileSignature {
    pub fn of(path: &Path) -> io::Result<Self> {
        Ok(Self::from_metadata(&std::fs::metadata(path)?))
    }

    pub fn from_metadata(metadata: &Metadata) -> Self {
        FileSignature {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        }
    }
}
