//! Link graph
//!
//! Adjacency index over resolved links, keyed by canonical page path. Each
//! page owns its outgoing edges; backlinks are the reverse page edges. A
//! page's edges are swapped under one write lock, so readers never see half
//! of an update.

use crate::path::PagePath;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum LinkTarget {
    Page(PagePath),
    External(String),
    File(PathBuf),
}

/// One resolved link. The link text is kept so the edge can be resolved
/// again when the namespace changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEdge {
    pub text: String,
    pub target: LinkTarget,
}

#[derive(Debug, Default)]
struct GraphInner {
    forward: HashMap<PagePath, Vec<LinkEdge>>,
    backward: HashMap<PagePath, BTreeSet<PagePath>>,
}

impl GraphInner {
    fn link(&mut self, source: &PagePath, edges: Vec<LinkEdge>) {
        for edge in &edges {
            if let LinkTarget::Page(target) = &edge.target {
                self.backward
                    .entry(target.clone())
                    .or_default()
                    .insert(source.clone());
            }
        }
        self.forward.insert(source.clone(), edges);
    }

    fn unlink(&mut self, source: &PagePath) -> Vec<LinkEdge> {
        let edges = self.forward.remove(source).unwrap_or_default();
        for edge in &edges {
            if let LinkTarget::Page(target) = &edge.target {
                if let Some(sources) = self.backward.get_mut(target) {
                    sources.remove(source);
                    if sources.is_empty() {
                        self.backward.remove(target);
                    }
                }
            }
        }
        edges
    }
}

#[derive(Debug, Default)]
pub struct LinkGraph {
    inner: RwLock<GraphInner>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every outgoing edge of `source`.
    pub fn replace_edges(&self, source: &PagePath, edges: Vec<LinkEdge>) {
        let mut inner = self.inner.write();
        inner.unlink(source);
        inner.link(source, edges);
    }

    /// Recompute the edges of every source from its current edges. The whole
    /// pass runs under one write lock, so no `replace_edges` lands between
    /// reading a page's edges and storing their replacement.
    pub fn refresh_with<F>(&self, mut refresh: F)
    where
        F: FnMut(&PagePath, &[LinkEdge]) -> Vec<LinkEdge>,
    {
        let mut inner = self.inner.write();
        let sources: Vec<PagePath> = inner.forward.keys().cloned().collect();
        for source in sources {
            let current = inner.unlink(&source);
            let edges = refresh(&source, &current);
            inner.link(&source, edges);
        }
    }

    pub fn outlinks(&self, source: &PagePath) -> Vec<LinkEdge> {
        self.inner
            .read()
            .forward
            .get(source)
            .cloned()
            .unwrap_or_default()
    }

    /// Pages linking to `target`, sorted.
    pub fn backlinks(&self, target: &PagePath) -> Vec<PagePath> {
        self.inner
            .read()
            .backward
            .get(target)
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop the outgoing edges of `source`. Edges from other pages into it
    /// are kept; they become placeholder edges.
    pub fn remove_page(&self, source: &PagePath) -> Vec<LinkEdge> {
        self.inner.write().unlink(source)
    }

    /// Pages with recorded outgoing edges.
    pub fn sources(&self) -> Vec<PagePath> {
        let mut sources: Vec<PagePath> = self.inner.read().forward.keys().cloned().collect();
        sources.sort();
        sources
    }
}
