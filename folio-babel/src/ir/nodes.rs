//! Core data structures for the document tree.
//!
//! The tree is dialect independent: every dialect parses into these nodes and
//! serializes from them. Blocks are only reachable mutably through the
//! structured edit operations in [`crate::ir::edit`].

use serde::Serialize;
use std::collections::BTreeMap;

/// The root of a page's content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Document {
    meta: Vec<(String, String)>,
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Document {
            meta: Vec::new(),
            blocks,
        }
    }

    pub fn with_meta(meta: Vec<(String, String)>, blocks: Vec<Block>) -> Self {
        Document { meta, blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Page metadata in file order (header lines or front matter).
    pub fn meta(&self) -> &[(String, String)] {
        &self.meta
    }

    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every link in document order, including links nested in emphasis,
    /// list items, quotes and table cells.
    pub fn links(&self) -> Vec<&Link> {
        let mut links = Vec::new();
        for block in &self.blocks {
            for run in block.inline_runs() {
                collect_links(run, &mut links);
            }
        }
        links
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub(crate) fn meta_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.meta
    }
}

fn collect_links<'a>(content: &'a [Inline], out: &mut Vec<&'a Link>) {
    for inline in content {
        match inline {
            Inline::Link(link) => out.push(link),
            other => {
                if let Some(children) = other.children() {
                    collect_links(children, out);
                }
            }
        }
    }
}

/// Block level nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    List { items: Vec<ListItem> },
    Table(Table),
    CodeBlock { language: Option<String>, text: String },
    BlockQuote { content: Vec<Inline> },
    Rule,
    /// A typed block kept verbatim, such as `{{{table: ...` in the native
    /// dialect. `kind` is lowercase; attribute keys are lowercase and sorted.
    Object {
        kind: String,
        attributes: BTreeMap<String, String>,
        body: String,
    },
}

impl Block {
    pub fn heading(level: u8, content: Vec<Inline>) -> Self {
        Block::Heading { level, content }
    }

    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph { content }
    }

    pub fn code(language: Option<&str>, text: &str) -> Self {
        Block::CodeBlock {
            language: language.map(str::to_string),
            text: text.to_string(),
        }
    }

    pub fn quote(content: Vec<Inline>) -> Self {
        Block::BlockQuote { content }
    }

    pub fn list(items: Vec<ListItem>) -> Self {
        Block::List { items }
    }

    pub fn object(kind: &str, attributes: &[(&str, &str)], body: &str) -> Self {
        Block::Object {
            kind: kind.to_lowercase(),
            attributes: attributes
                .iter()
                .map(|(key, value)| (key.to_lowercase(), value.to_string()))
                .collect(),
            body: body.to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::List { .. } => "list",
            Block::Table(_) => "table",
            Block::CodeBlock { .. } => "code_block",
            Block::BlockQuote { .. } => "block_quote",
            Block::Rule => "rule",
            Block::Object { .. } => "object",
        }
    }

    /// The inline runs held directly by this block.
    pub fn inline_runs(&self) -> Vec<&[Inline]> {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph { content }
            | Block::BlockQuote { content } => vec![content.as_slice()],
            Block::List { items } => items.iter().map(|item| item.content.as_slice()).collect(),
            Block::Table(table) => table
                .header
                .iter()
                .chain(table.rows.iter())
                .flat_map(|row| row.iter().map(Vec::as_slice))
                .collect(),
            Block::CodeBlock { .. } | Block::Rule | Block::Object { .. } => Vec::new(),
        }
    }

    pub(crate) fn inline_runs_mut(&mut self) -> Vec<&mut Vec<Inline>> {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph { content }
            | Block::BlockQuote { content } => vec![content],
            Block::List { items } => items.iter_mut().map(|item| &mut item.content).collect(),
            Block::Table(table) => table
                .header
                .iter_mut()
                .chain(table.rows.iter_mut())
                .flat_map(|row| row.iter_mut())
                .collect(),
            Block::CodeBlock { .. } | Block::Rule | Block::Object { .. } => Vec::new(),
        }
    }
}

/// One entry of a list. Nesting is expressed by `depth`, not by child lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub depth: usize,
    pub marker: ItemMarker,
    pub content: Vec<Inline>,
}

impl ListItem {
    pub fn new(depth: usize, marker: ItemMarker, content: Vec<Inline>) -> Self {
        ListItem {
            depth,
            marker,
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ItemMarker {
    Bullet,
    /// Numbered item keeping its label as written (`1`, `10`, `a`).
    Numbered(String),
    Checkbox(CheckState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Unchecked,
    Checked,
    Crossed,
    Migrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
    Checkbox,
}

impl ItemMarker {
    pub fn kind(&self) -> ListKind {
        match self {
            ItemMarker::Bullet => ListKind::Unordered,
            ItemMarker::Numbered(_) => ListKind::Ordered,
            ItemMarker::Checkbox(_) => ListKind::Checkbox,
        }
    }
}

/// Kind of a list, taken from its first item.
pub fn list_kind(items: &[ListItem]) -> ListKind {
    items
        .first()
        .map(|item| item.marker.kind())
        .unwrap_or(ListKind::Unordered)
}

/// A table cell is a run of inline content.
pub type Cell = Vec<Inline>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub header: Option<Vec<Cell>>,
    pub aligns: Vec<Align>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn columns(&self) -> usize {
        self.header
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

/// Inline content, such as text, emphasis and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Highlight(Vec<Inline>),
    Subscript(Vec<Inline>),
    Superscript(Vec<Inline>),
    Code(String),
    Link(Link),
    Image(Image),
    Anchor(String),
    Tag(String),
}

impl Inline {
    pub fn text(text: &str) -> Self {
        Inline::Text(text.to_string())
    }

    pub fn link(target: &str, label: Option<&str>) -> Self {
        Inline::Link(Link {
            target: target.to_string(),
            label: label.map(str::to_string),
        })
    }

    pub fn children(&self) -> Option<&[Inline]> {
        match self {
            Inline::Bold(c)
            | Inline::Italic(c)
            | Inline::Strikethrough(c)
            | Inline::Highlight(c)
            | Inline::Subscript(c)
            | Inline::Superscript(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Inline::Bold(c)
            | Inline::Italic(c)
            | Inline::Strikethrough(c)
            | Inline::Highlight(c)
            | Inline::Subscript(c)
            | Inline::Superscript(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub target: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Image {
    pub fn new(src: &str) -> Self {
        Image {
            src: src.to_string(),
            alt: None,
            width: None,
            height: None,
        }
    }
}
