//! Namespace paths
//!
//! A [`PagePath`] names a page by its position in the notebook, `:` separated
//! (`Projects:Plan`). The root namespace is the empty path. Paths are always
//! canonical: segments are trimmed, never empty, and underscores are read as
//! spaces (file names store spaces as `_`).

use crate::error::StoreError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Characters that cannot appear in a page name.
const FORBIDDEN: &[char] = &['/', '\\', ':', '#', '?', '|', '[', ']'];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PagePath {
    segments: Vec<String>,
}

impl PagePath {
    pub fn root() -> Self {
        PagePath::default()
    }

    /// Parse `A:B:Page`. A leading `:` is accepted and ignored; `""` and
    /// `":"` are the root.
    pub fn parse(text: &str) -> Result<Self, StoreError> {
        let text = text.trim();
        let text = text.strip_prefix(':').unwrap_or(text);
        if text.is_empty() {
            return Ok(PagePath::root());
        }
        PagePath::from_segments(text.split(':'))
    }

    pub fn from_segments<I, S>(segments: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|s| validate_segment(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PagePath { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment; empty for the root.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<PagePath> {
        let (_, parent) = self.segments.split_last()?;
        Some(PagePath {
            segments: parent.to_vec(),
        })
    }

    pub fn child(&self, name: &str) -> Result<PagePath, StoreError> {
        let mut segments = self.segments.clone();
        segments.push(validate_segment(name)?);
        Ok(PagePath { segments })
    }

    pub fn join(&self, other: &PagePath) -> PagePath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        PagePath { segments }
    }

    /// This path followed by each of its ancestors, ending with the root.
    pub fn ancestors(&self) -> impl Iterator<Item = PagePath> + '_ {
        (0..=self.segments.len()).rev().map(move |len| PagePath {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Whether `self` is a proper ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &PagePath) -> bool {
        other.segments.len() > self.segments.len() && other.segments.starts_with(&self.segments)
    }
}

fn validate_segment(segment: &str) -> Result<String, StoreError> {
    let name = segment.replace('_', " ");
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidPath(format!(
            "empty segment in '{segment}'"
        )));
    }
    if name.starts_with('.') {
        return Err(StoreError::InvalidPath(format!(
            "page name '{name}' starts with '.'"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| FORBIDDEN.contains(c) || c.is_control())
    {
        return Err(StoreError::InvalidPath(format!(
            "page name '{name}' contains {c:?}"
        )));
    }
    Ok(name.to_string())
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, ":");
        }
        write!(f, "{}", self.segments.join(":"))
    }
}

impl Serialize for PagePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
