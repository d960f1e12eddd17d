//! Namespace index
//!
//! In-memory view of which pages and namespaces exist. The store builds it
//! from one directory scan and keeps it current on materialization; the
//! resolver only sees it through the [`PageIndex`] trait.

use crate::layout::FilesLayout;
use crate::page::Page;
use crate::path::PagePath;
use crate::signature::FileSignature;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Read-only lookups needed to resolve links.
pub trait PageIndex {
    /// The materialized page at `path`, if any.
    fn page(&self, path: &PagePath) -> Option<&Page>;

    /// Whether `path` has child pages or a folder on disk.
    fn has_namespace(&self, path: &PagePath) -> bool;

    /// Stored spelling of the child of `parent` named `name`, if a page or
    /// namespace with that name exists. Matching follows the notebook's
    /// case sensitivity.
    fn child_name(&self, parent: &PagePath, name: &str) -> Option<String>;

    fn attachments_dir(&self, path: &PagePath) -> PathBuf;
}

#[derive(Debug, Clone)]
pub struct NamespaceIndex {
    layout: FilesLayout,
    pages: BTreeMap<PagePath, Page>,
    namespaces: BTreeSet<PagePath>,
    /// Names of the pages and namespaces directly below each namespace.
    children: BTreeMap<PagePath, BTreeSet<String>>,
    case_sensitive: bool,
}

impl NamespaceIndex {
    pub fn new(layout: FilesLayout, case_sensitive: bool) -> Self {
        NamespaceIndex {
            layout,
            pages: BTreeMap::new(),
            namespaces: BTreeSet::new(),
            children: BTreeMap::new(),
            case_sensitive,
        }
    }

    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
    }

    /// Add a page; all of its ancestors become namespaces.
    pub fn insert(&mut self, page: Page) {
        if let Some(parent) = page.path.parent() {
            self.insert_namespace(parent);
        }
        self.add_child(&page.path);
        self.pages.insert(page.path.clone(), page);
    }

    /// Record a namespace (a folder, or the parent of a page) and its ancestors.
    pub fn insert_namespace(&mut self, path: PagePath) {
        for ancestor in path.ancestors() {
            self.add_child(&ancestor);
            if !self.namespaces.insert(ancestor) {
                break;
            }
        }
    }

    fn add_child(&mut self, path: &PagePath) {
        if let Some(parent) = path.parent() {
            self.children
                .entry(parent)
                .or_default()
                .insert(path.name().to_string());
        }
    }

    pub fn get(&self, path: &PagePath) -> Option<&Page> {
        self.pages.get(path)
    }

    pub fn contains(&self, path: &PagePath) -> bool {
        self.pages.contains_key(path)
    }

    /// Materialized pages directly below `namespace`, sorted by name.
    pub fn children(&self, namespace: &PagePath) -> Vec<Page> {
        let Some(names) = self.children.get(namespace) else {
            return Vec::new();
        };
        names
            .iter()
            .filter_map(|name| {
                let path = namespace.child(name).ok()?;
                self.pages.get(&path).cloned()
            })
            .collect()
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn set_signature(&mut self, path: &PagePath, signature: Option<FileSignature>) {
        if let Some(page) = self.pages.get_mut(path) {
            page.signature = signature;
        }
    }

    fn names_match(&self, stored: &str, wanted: &str) -> bool {
        if self.case_sensitive {
            stored == wanted
        } else {
            stored.to_lowercase() == wanted.to_lowercase()
        }
    }
}

impl PageIndex for NamespaceIndex {
    fn page(&self, path: &PagePath) -> Option<&Page> {
        self.get(path)
    }

    fn has_namespace(&self, path: &PagePath) -> bool {
        self.namespaces.contains(path)
    }

    fn child_name(&self, parent: &PagePath, name: &str) -> Option<String> {
        let names = self.children.get(parent)?;
        if names.contains(name) {
            return Some(name.to_string());
        }
        names
            .iter()
            .find(|stored| self.names_match(stored, name))
            .cloned()
    }

    fn attachments_dir(&self, path: &PagePath) -> PathBuf {
        self.layout.page_dir(path)
    }
}
