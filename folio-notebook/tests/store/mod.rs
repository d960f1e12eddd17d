//! Page store tests
//!
//! Every test works on a fresh notebook in a temporary folder.

mod concurrency;
mod links;
mod markdown_links;
mod materialize;

use folio_babel::DialectRegistry;
use folio_notebook::{NotebookSettings, PagePath, PageStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn path(text: &str) -> PagePath {
    PagePath::parse(text).unwrap()
}

pub fn notebook() -> (TempDir, PageStore) {
    notebook_with(NotebookSettings::default())
}

pub fn markdown_notebook() -> (TempDir, PageStore) {
    let settings = NotebookSettings::for_dialect(&DialectRegistry::default(), "markdown").unwrap();
    notebook_with(settings)
}

pub fn notebook_with(settings: NotebookSettings) -> (TempDir, PageStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = PageStore::open(dir.path(), settings, DialectRegistry::default()).unwrap();
    (dir, store)
}

/// Write page files under `root` before opening a store on it.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let file = root.join(name);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }
}

pub fn open(root: &Path) -> PageStore {
    PageStore::open(root, NotebookSettings::default(), DialectRegistry::default()).unwrap()
}
