//! Link resolution
//!
//! Turns the target text of a link into what it points at, looking pages up
//! through a [`PageIndex`]. Resolution is pure: unresolved page links become
//! placeholders and no file is ever created here.
//!
//! Link forms, in the order they are tried:
//!
//!     #name            anchor in the source page
//!     ./x ../x         file relative to the source page's attachment folder
//!     /x ~/x file:/x   file elsewhere on disk
//!     scheme://x       external URI (also www.x and bare e-mail addresses)
//!     :A:B             page path from the notebook root
//!     +Child           page below the source page
//!     A:B              relative page path, looked up from the source page
//!                      outwards through each ancestor namespace
//!
//! Any page form may carry an anchor suffix, `Page#name`.

use crate::error::StoreError;
use crate::graph::LinkTarget;
use crate::index::PageIndex;
use crate::layout::normalize_path;
use crate::page::PageRef;
use crate::path::PagePath;
use folio_babel::common::links::has_url_scheme;
use serde::Serialize;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ResolvedTarget {
    Page {
        page: PageRef,
        anchor: Option<String>,
    },
    External(String),
    File(PathBuf),
    Anchor(String),
}

impl ResolvedTarget {
    /// The graph edge target; in-page anchors are not edges.
    pub fn edge_target(&self) -> Option<LinkTarget> {
        match self {
            ResolvedTarget::Page { page, .. } => Some(LinkTarget::Page(page.path().clone())),
            ResolvedTarget::External(uri) => Some(LinkTarget::External(uri.clone())),
            ResolvedTarget::File(path) => Some(LinkTarget::File(path.clone())),
            ResolvedTarget::Anchor(_) => None,
        }
    }
}

/// Resolve `link` as written in the page at `source`.
pub fn resolve(
    link: &str,
    source: &PagePath,
    index: &dyn PageIndex,
) -> Result<ResolvedTarget, StoreError> {
    let text = link.trim();
    if text.is_empty() {
        return Err(StoreError::InvalidPath("empty link".to_string()));
    }

    if let Some(name) = text.strip_prefix('#') {
        return Ok(ResolvedTarget::Anchor(name.to_string()));
    }

    if let Some(file) = resolve_file(text, source, index)? {
        return Ok(ResolvedTarget::File(file));
    }

    if let Some(uri) = resolve_external(text)? {
        return Ok(ResolvedTarget::External(uri));
    }

    let (page_text, anchor) = match text.split_once('#') {
        Some((page, anchor)) => (page, (!anchor.is_empty()).then(|| anchor.to_string())),
        None => (text, None),
    };

    let path = if let Some(absolute) = page_text.strip_prefix(':') {
        let relative = PagePath::parse(absolute)?;
        match_spelling(index, &PagePath::root(), relative.segments())?
    } else if let Some(child) = page_text.strip_prefix('+') {
        let relative = PagePath::parse(child)?;
        if relative.is_root() {
            return Err(StoreError::InvalidPath(format!("'{link}' names no child page")));
        }
        match_spelling(index, source, relative.segments())?
    } else {
        resolve_relative(index, source, &PagePath::parse(page_text)?)?
    };

    if path.is_root() {
        return Err(StoreError::InvalidPath(format!(
            "'{link}' does not name a page"
        )));
    }

    let page = match index.page(&path) {
        Some(page) => PageRef::Materialized(page.clone()),
        None => PageRef::Placeholder(path),
    };
    Ok(ResolvedTarget::Page { page, anchor })
}

fn resolve_file(
    text: &str,
    source: &PagePath,
    index: &dyn PageIndex,
) -> Result<Option<PathBuf>, StoreError> {
    if text.starts_with("./") || text.starts_with("../") {
        let joined = index.attachments_dir(source).join(text);
        return Ok(Some(normalize_path(&joined)));
    }
    if text.starts_with('/') {
        return Ok(Some(normalize_path(&PathBuf::from(text))));
    }
    if let Some(rest) = text.strip_prefix("~/") {
        let home = std::env::var_os("HOME").ok_or_else(|| {
            StoreError::InvalidPath(format!("cannot expand '{text}' without HOME"))
        })?;
        return Ok(Some(normalize_path(&PathBuf::from(home).join(rest))));
    }
    if text.starts_with("file:/") {
        let file = Url::parse(text)
            .ok()
            .and_then(|url| url.to_file_path().ok())
            .ok_or_else(|| StoreError::InvalidPath(format!("invalid file URI '{text}'")))?;
        return Ok(Some(file));
    }
    Ok(None)
}

fn resolve_external(text: &str) -> Result<Option<String>, StoreError> {
    if has_url_scheme(text) {
        return match Url::parse(text) {
            Ok(_) => Ok(Some(text.to_string())),
            Err(err) => Err(StoreError::InvalidPath(format!("invalid URI '{text}': {err}"))),
        };
    }
    if text.starts_with("www.") {
        let uri = format!("https://{text}");
        return match Url::parse(&uri) {
            Ok(_) => Ok(Some(uri)),
            Err(err) => Err(StoreError::InvalidPath(format!("invalid URI '{text}': {err}"))),
        };
    }
    if is_email(text) {
        return Ok(Some(format!("mailto:{text}")));
    }
    Ok(None)
}

fn is_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !text.contains(|c: char| c.is_whitespace() || matches!(c, ':' | '/'))
        && !domain.contains('@')
}

/// Look the first segment up in `source`, then in each ancestor namespace.
/// The first namespace holding it wins; otherwise the link stays below
/// `source`.
fn resolve_relative(
    index: &dyn PageIndex,
    source: &PagePath,
    relative: &PagePath,
) -> Result<PagePath, StoreError> {
    let Some(first) = relative.segments().first() else {
        return Ok(PagePath::root());
    };
    for namespace in source.ancestors() {
        if index.child_name(&namespace, first).is_some() {
            return match_spelling(index, &namespace, relative.segments());
        }
    }
    Ok(source.join(relative))
}

/// Append `segments` to `base`, using the stored spelling of every segment
/// that exists.
fn match_spelling(
    index: &dyn PageIndex,
    base: &PagePath,
    segments: &[String],
) -> Result<PagePath, StoreError> {
    let mut path = base.clone();
    for segment in segments {
        let name = index
            .child_name(&path, segment)
            .unwrap_or_else(|| segment.clone());
        path = path.child(&name)?;
    }
    Ok(path)
}
