//! Mapping between page paths and files on disk
//!
//! `Projects:Plan` lives in `<root>/Projects/Plan.<ext>`; its attachments and
//! child pages live in the folder `<root>/Projects/Plan/`. Spaces in page
//! names are written as `_` in file and folder names.

use crate::path::PagePath;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesLayout {
    root: PathBuf,
}

impl FilesLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Backing file of a page with the given extension (no leading dot).
    /// The extension is appended, so a `.` inside the page name is kept.
    pub fn page_file(&self, path: &PagePath, extension: &str) -> PathBuf {
        let mut file = self.page_dir(&path.parent().unwrap_or_default());
        file.push(format!("{}.{extension}", encode_name(path.name())));
        file
    }

    /// Folder holding a page's attachments and child pages. For the root
    /// this is the notebook folder itself.
    pub fn page_dir(&self, path: &PagePath) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in path.segments() {
            dir.push(encode_name(segment));
        }
        dir
    }

    /// Page path and extension of a file inside the notebook. Only the last
    /// `.` suffix is the extension; `Release_v1.2.txt` is `Release v1.2`.
    pub fn page_for_file(&self, file: &Path) -> Option<(PagePath, String)> {
        let file_name = file.file_name()?.to_str()?;
        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        let namespace = self.page_for_dir(file.parent()?)?;
        let path = namespace.child(&decode_name(stem)).ok()?;
        Some((path, extension.to_string()))
    }

    /// Namespace path of a folder inside the notebook.
    pub fn page_for_dir(&self, dir: &Path) -> Option<PagePath> {
        let relative = dir.strip_prefix(&self.root).ok()?;
        let mut names = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => names.push(decode_name(name.to_str()?)),
                _ => return None,
            }
        }
        PagePath::from_segments(names).ok()
    }
}

/// File name for a page name.
pub fn encode_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Page name for a file name.
pub fn decode_name(name: &str) -> String {
    name.replace('_', " ")
}

/// Resolve `.` and `..` components without touching the filesystem.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
