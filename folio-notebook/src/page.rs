//! Pages and page existence

use crate::path::PagePath;
use crate::signature::FileSignature;
use serde::Serialize;
use std::path::PathBuf;

/// A page backed by a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub path: PagePath,
    /// Dialect id, fixed when the file was created.
    pub dialect: String,
    pub file: PathBuf,
    pub attachments: PathBuf,
    #[serde(skip)]
    pub signature: Option<FileSignature>,
}

/// A page path is either backed by a file or only referenced by links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "page", rename_all = "snake_case")]
pub enum PageRef {
    Materialized(Page),
    Placeholder(PagePath),
}

impl PageRef {
    pub fn path(&self) -> &PagePath {
        match self {
            PageRef::Materialized(page) => &page.path,
            PageRef::Placeholder(path) => path,
        }
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self, PageRef::Materialized(_))
    }

    pub fn as_page(&self) -> Option<&Page> {
        match self {
            PageRef::Materialized(page) => Some(page),
            PageRef::Placeholder(_) => None,
        }
    }
}
