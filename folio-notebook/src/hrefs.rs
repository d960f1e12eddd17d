//! Page links stored as relative file paths
//!
//! Dialects with inline links (Markdown) store a labelled link to another
//! page as a path to its file, `[plan](Projects/Plan.md#goals)`, so other
//! Markdown tools can follow it. In the tree the same link targets the page,
//! `:Projects:Plan#goals`. Unlabelled links keep the `[[Page]]` form and are
//! never converted.

use crate::index::PageIndex;
use crate::layout::{normalize_path, FilesLayout};
use crate::page::PageRef;
use crate::path::PagePath;
use crate::resolver::{resolve, ResolvedTarget};
use folio_babel::common::links::has_url_scheme;
use folio_babel::Document;
use std::path::Path;

/// Rewrite links to `*.{extension}` files next to `page_file` into absolute
/// page links. Returns the number of rewritten links.
pub fn file_targets_to_pages(
    doc: &mut Document,
    layout: &FilesLayout,
    page_file: &Path,
    extension: &str,
) -> usize {
    let suffix = format!(".{extension}");
    let base = page_file.parent().unwrap_or(layout.root()).to_path_buf();
    doc.rewrite_link_targets(|link| {
        if has_url_scheme(&link.target) {
            return None;
        }
        let (file, anchor) = split_anchor(&link.target);
        if !file.ends_with(&suffix) {
            return None;
        }
        let target = normalize_path(&base.join(file));
        let (path, found) = layout.page_for_file(&target)?;
        (found == extension).then(|| format!(":{path}{anchor}"))
    })
}

/// Rewrite labelled links to pages stored with `extension` (or not stored
/// yet) into file paths relative to `page_file`. Returns the number of
/// rewritten links.
pub fn page_targets_to_files(
    doc: &mut Document,
    source: &PagePath,
    index: &dyn PageIndex,
    layout: &FilesLayout,
    page_file: &Path,
    extension: &str,
) -> usize {
    let base = page_file.parent().unwrap_or(layout.root()).to_path_buf();
    doc.rewrite_link_targets(|link| {
        if link.label.is_none() {
            return None;
        }
        let Ok(ResolvedTarget::Page { page, anchor }) = resolve(&link.target, source, index) else {
            return None;
        };
        let file = match &page {
            PageRef::Materialized(page) if page_extension(&page.file) == Some(extension) => {
                page.file.clone()
            }
            PageRef::Materialized(_) => return None,
            PageRef::Placeholder(path) => layout.page_file(path, extension),
        };
        let relative = pathdiff::diff_paths(&file, &base)?;
        let anchor = anchor.map(|a| format!("#{a}")).unwrap_or_default();
        Some(format!("{}{anchor}", slash_path(&relative)))
    })
}

fn split_anchor(target: &str) -> (&str, &str) {
    match target.find('#') {
        Some(idx) => target.split_at(idx),
        None => (target, ""),
    }
}

fn page_extension(file: &Path) -> Option<&str> {
    file.extension().and_then(|ext| ext.to_str())
}

/// Join path components with `/` regardless of platform.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
