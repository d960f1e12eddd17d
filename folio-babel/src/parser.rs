//! Block parser
//!
//! Folds the line tokens of [`crate::tokenizer`] into a [`Document`]. The
//! parser never fails: token sequences it cannot interpret become a
//! paragraph holding the raw line, and a [`Warning`] is recorded next to the
//! document.
//!
//! Recovered conditions:
//! - a closing fence with no open fence
//! - a table separator row with no header row above it
//! - a heading deeper than [`MAX_HEADING_LEVEL`]
//! - a fence left open at the end of the page (becomes a code block)
//! - an object left open at the end of the page (keeps the rest as its body)
//! - table rows whose cell count differs from the header's

use crate::cancel::CancelToken;
use crate::dialect::{Dialect, SpanKind, FORMAT_HEADER_KEYS, MAX_HEADING_LEVEL};
use crate::error::Warning;
use crate::ir::nodes::{Align, Block, Cell, Document, Inline, Link, ListItem, Table};
use crate::tokenizer::{tokenize, tokenize_inline, BlockToken, InlineToken, Spanned};
use log::debug;
use serde::Serialize;

/// The outcome of a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parsed {
    pub document: Document,
    pub warnings: Vec<Warning>,
    /// `false` when the parse was cancelled; the document then holds the
    /// blocks completed before cancellation.
    pub complete: bool,
}

/// Parse `source` with the rules of `dialect`.
pub fn parse(source: &str, dialect: &Dialect) -> Parsed {
    parse_with_cancel(source, dialect, &CancelToken::new())
}

/// Like [`parse`], checking `cancel` before each block.
pub fn parse_with_cancel(source: &str, dialect: &Dialect, cancel: &CancelToken) -> Parsed {
    let tokens = tokenize(source, dialect);
    let mut parser = BlockParser {
        dialect,
        tokens: &tokens,
        pos: 0,
        meta: Vec::new(),
        blocks: Vec::new(),
        warnings: Vec::new(),
    };
    let complete = parser.run(cancel);
    Parsed {
        document: Document::with_meta(parser.meta, parser.blocks),
        warnings: parser.warnings,
        complete,
    }
}

struct BlockParser<'a> {
    dialect: &'a Dialect,
    tokens: &'a [Spanned<BlockToken>],
    pos: usize,
    meta: Vec<(String, String)>,
    blocks: Vec<Block>,
    warnings: Vec<Warning>,
}

impl<'a> BlockParser<'a> {
    fn run(&mut self, cancel: &CancelToken) -> bool {
        let tokens = self.tokens;
        while let Some(current) = tokens.get(self.pos) {
            if cancel.is_cancelled() {
                debug!(
                    "parse cancelled at line {} after {} blocks",
                    current.line,
                    self.blocks.len()
                );
                return false;
            }
            match &current.token {
                BlockToken::Meta(entries) => {
                    self.meta = entries
                        .iter()
                        .filter(|(key, _)| !FORMAT_HEADER_KEYS.contains(&key.as_str()))
                        .cloned()
                        .collect();
                    self.pos += 1;
                }
                BlockToken::Blank => self.pos += 1,
                BlockToken::Heading { level, text } => {
                    self.pos += 1;
                    if *level > usize::from(MAX_HEADING_LEVEL) {
                        self.recover(
                            current,
                            format!("heading level {level} exceeds {MAX_HEADING_LEVEL}"),
                        );
                    } else {
                        let content = self.inline(text);
                        self.blocks.push(Block::heading(*level as u8, content));
                    }
                }
                BlockToken::Rule => {
                    self.pos += 1;
                    self.blocks.push(Block::Rule);
                }
                BlockToken::FenceOpen { language } => {
                    let text = self.verbatim(current, "fence");
                    self.blocks.push(Block::CodeBlock {
                        language: language.clone(),
                        text,
                    });
                }
                BlockToken::ObjectOpen { kind, attributes } => {
                    let body = self.verbatim(current, "object");
                    self.blocks.push(Block::Object {
                        kind: kind.clone(),
                        attributes: attributes.clone(),
                        body,
                    });
                }
                BlockToken::FenceClose => {
                    self.pos += 1;
                    self.recover(current, "closing fence without an open fence".to_string());
                }
                BlockToken::Verbatim(_) => {
                    self.pos += 1;
                    self.recover(current, "verbatim line outside a fence".to_string());
                }
                BlockToken::TableSeparator(_) => {
                    self.pos += 1;
                    self.recover(current, "table separator without a header row".to_string());
                }
                BlockToken::TableRow(_) => self.table(),
                BlockToken::ListItem { .. } => self.list(),
                BlockToken::Quote(_) => self.quote(),
                BlockToken::Text(_) => self.paragraph(),
            }
        }
        true
    }

    fn recover(&mut self, token: &Spanned<BlockToken>, message: String) {
        debug!("line {}: {}", token.line, message);
        self.warnings.push(Warning::recovery(token.line, message));
        self.blocks
            .push(Block::paragraph(vec![Inline::text(token.raw.trim_end())]));
    }

    fn inline(&self, text: &str) -> Vec<Inline> {
        build_inline(tokenize_inline(text, self.dialect), self.dialect)
    }

    /// Collect the verbatim lines after `open` up to its closer.
    fn verbatim(&mut self, open: &Spanned<BlockToken>, what: &str) -> String {
        let tokens = self.tokens;
        self.pos += 1;
        let mut lines = Vec::new();
        let mut closed = false;
        while let Some(current) = tokens.get(self.pos) {
            self.pos += 1;
            match &current.token {
                BlockToken::Verbatim(line) => lines.push(line.as_str()),
                _ => {
                    closed = true;
                    break;
                }
            }
        }
        if !closed {
            let message = format!("{what} is never closed; it runs to the end of the page");
            debug!("line {}: {}", open.line, message);
            self.warnings.push(Warning::recovery(open.line, message));
        }
        lines.join("\n")
    }

    fn table(&mut self) {
        let tokens = self.tokens;
        let header_line = &tokens[self.pos];
        self.pos += 1;
        let BlockToken::TableRow(first) = &header_line.token else {
            return;
        };

        let mut header = None;
        let mut aligns = Vec::new();
        if let Some(BlockToken::TableSeparator(separator)) = tokens.get(self.pos).map(|t| &t.token) {
            header = Some(first);
            aligns = separator.clone();
            self.pos += 1;
        }

        let mut rows: Vec<(usize, &Vec<String>)> = Vec::new();
        if header.is_none() {
            rows.push((header_line.line, first));
        }
        while let Some(Spanned {
            line,
            token: BlockToken::TableRow(cells),
            ..
        }) = tokens.get(self.pos)
        {
            rows.push((*line, cells));
            self.pos += 1;
        }

        let columns = match header {
            Some(cells) => cells.len(),
            None => rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0),
        };
        aligns.resize(columns, Align::None);

        let header = header.map(|cells| self.cells(cells, columns));
        let mut body = Vec::with_capacity(rows.len());
        for (line, cells) in rows {
            if header.is_some() && cells.len() != columns {
                let message = format!(
                    "table row has {} cells, expected {}; row was {}",
                    cells.len(),
                    columns,
                    if cells.len() < columns {
                        "padded"
                    } else {
                        "truncated"
                    }
                );
                debug!("line {line}: {message}");
                self.warnings.push(Warning::recovery(line, message));
            }
            body.push(self.cells(cells, columns));
        }

        self.blocks.push(Block::Table(Table {
            header,
            aligns,
            rows: body,
        }));
    }

    fn cells(&self, cells: &[String], columns: usize) -> Vec<Cell> {
        (0..columns)
            .map(|i| cells.get(i).map(|c| self.inline(c)).unwrap_or_default())
            .collect()
    }

    fn list(&mut self) {
        let tokens = self.tokens;
        let mut indents: Vec<usize> = Vec::new();
        let mut items = Vec::new();
        while let Some(BlockToken::ListItem {
            indent,
            marker,
            text,
        }) = tokens.get(self.pos).map(|t| &t.token)
        {
            let depth = nesting_depth(&mut indents, *indent);
            items.push(ListItem::new(depth, marker.clone(), self.inline(text)));
            self.pos += 1;
        }
        self.blocks.push(Block::list(items));
    }

    fn quote(&mut self) {
        let lines = self.collect_lines(|token| match token {
            BlockToken::Quote(text) => Some(text.as_str()),
            _ => None,
        });
        let content = self.inline(&lines.join("\n"));
        self.blocks.push(Block::quote(content));
    }

    fn paragraph(&mut self) {
        let lines = self.collect_lines(|token| match token {
            BlockToken::Text(text) => Some(text.as_str()),
            _ => None,
        });
        let content = self.inline(&lines.join("\n"));
        self.blocks.push(Block::paragraph(content));
    }

    fn collect_lines<F>(&mut self, select: F) -> Vec<&'a str>
    where
        F: Fn(&'a BlockToken) -> Option<&'a str>,
    {
        let tokens = self.tokens;
        let mut lines = Vec::new();
        while let Some(line) = tokens.get(self.pos).and_then(|t| select(&t.token)) {
            lines.push(line);
            self.pos += 1;
        }
        lines
    }
}

/// Depth of a list item from its indent. `indents` holds the indent of each
/// open level; a deeper indent opens at most one new level.
fn nesting_depth(indents: &mut Vec<usize>, indent: usize) -> usize {
    while indents.len() > 1 && indents.last().is_some_and(|&top| indent < top) {
        indents.pop();
    }
    match indents.last() {
        Some(&top) if indent <= top => {}
        _ => indents.push(indent),
    }
    indents.len() - 1
}

/// Fold a balanced token stream into inline nodes. Unbalanced input (which
/// the tokenizer does not produce) degrades to literal delimiters.
fn build_inline(tokens: Vec<InlineToken>, dialect: &Dialect) -> Vec<Inline> {
    let syntax = dialect.syntax();
    let delimiter = |kind: SpanKind, open: bool| {
        syntax
            .span(kind)
            .map(|span| if open { span.open.clone() } else { span.close.clone() })
            .unwrap_or_default()
    };

    let mut stack: Vec<(SpanKind, Vec<Inline>)> = Vec::new();
    let mut current: Vec<Inline> = Vec::new();
    for token in tokens {
        match token {
            InlineToken::Text(text) => push_inline(&mut current, Inline::Text(text)),
            InlineToken::Open(kind) => stack.push((kind, std::mem::take(&mut current))),
            InlineToken::Close(kind) => match stack.pop() {
                Some((open, parent)) if open == kind => {
                    let children = std::mem::replace(&mut current, parent);
                    current.push(span_node(kind, children));
                }
                unmatched => {
                    stack.extend(unmatched);
                    push_inline(&mut current, Inline::Text(delimiter(kind, false)));
                }
            },
            InlineToken::Code(text) => current.push(Inline::Code(text)),
            InlineToken::Link { target, label } => {
                current.push(Inline::Link(Link { target, label }))
            }
            InlineToken::Image(image) => current.push(Inline::Image(image)),
            InlineToken::Anchor(name) => current.push(Inline::Anchor(name)),
            InlineToken::Tag(name) => current.push(Inline::Tag(name)),
        }
    }

    while let Some((kind, mut parent)) = stack.pop() {
        push_inline(&mut parent, Inline::Text(delimiter(kind, true)));
        for node in current {
            push_inline(&mut parent, node);
        }
        current = parent;
    }
    current
}

fn span_node(kind: SpanKind, children: Vec<Inline>) -> Inline {
    match kind {
        SpanKind::Bold => Inline::Bold(children),
        SpanKind::Italic => Inline::Italic(children),
        SpanKind::Strikethrough => Inline::Strikethrough(children),
        SpanKind::Highlight => Inline::Highlight(children),
        SpanKind::Subscript => Inline::Subscript(children),
        SpanKind::Superscript => Inline::Superscript(children),
        SpanKind::Code => Inline::Code(
            children
                .iter()
                .filter_map(|node| match node {
                    Inline::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        ),
    }
}

/// Append a node, merging adjacent text runs.
fn push_inline(content: &mut Vec<Inline>, node: Inline) {
    if let Inline::Text(text) = &node {
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text(last)) = content.last_mut() {
            last.push_str(text);
            return;
        }
    }
    content.push(node);
}
