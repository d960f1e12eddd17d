//! Line-oriented tokenizer
//!
//! The first pass over page text. Every source line becomes exactly one
//! [`BlockToken`] (the metadata header, when present, becomes a single
//! [`BlockToken::Meta`] token). Block boundaries are decided here; inline
//! markup inside a line is left for [`inline::tokenize_inline`].
//!
//! All decisions are driven by the [`Syntax`] of the dialect:
//! - headings: marker run, optionally repeated after the title
//! - lists: bullets, checkboxes and `1.`/`a.` numbering, with indent measured
//!   in columns (a tab counts `tab_width` columns)
//! - fences: the first fence whose opener matches starts a verbatim region
//!   that only its own closer ends
//! - objects: `{{{type: key="value"` opens a verbatim region closed by `}}}`
//! - quotes: a prefix such as `>` or any indented non-list line
//!
//! Text lines are trimmed. Verbatim lines are kept exactly as written.

pub mod inline;

use crate::dialect::{Dialect, FenceLanguage, FenceSyntax, MetaSyntax, QuoteSyntax, Syntax};
use crate::ir::nodes::{Align, ItemMarker};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

pub use inline::{tokenize_inline, InlineToken};

static HEADER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w-]+):\s*(.*?)\s*$").expect("valid header line regex"));

static NUMBER_BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+|[a-zA-Z])\.(?:\s+|$)").expect("valid number bullet regex"));

static SEPARATOR_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:?-+:?$").expect("valid separator cell regex"));

static OBJECT_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([\w-]+)=("(?:[^"]|"")*"|\S*)"#).expect("valid object parameter regex")
});

/// A token together with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spanned<T> {
    /// 1-based line number of the first line of the token
    pub line: usize,
    /// The source text of the token
    pub raw: String,
    pub token: T,
}

/// The classification of a source line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BlockToken {
    /// Page metadata from header lines or front matter
    Meta(Vec<(String, String)>),
    /// Heading with its marker count; may exceed the supported depth
    Heading { level: usize, text: String },
    /// List item; `indent` is measured in columns
    ListItem {
        indent: usize,
        marker: ItemMarker,
        text: String,
    },
    TableRow(Vec<String>),
    TableSeparator(Vec<Align>),
    FenceOpen { language: Option<String> },
    /// Header line of a typed object; its body follows as verbatim lines
    ObjectOpen {
        kind: String,
        attributes: BTreeMap<String, String>,
    },
    /// A raw line inside a fence or object
    Verbatim(String),
    FenceClose,
    Quote(String),
    Rule,
    Blank,
    /// Any other line (paragraph text)
    Text(String),
}

/// Split `source` into line tokens.
pub fn tokenize(source: &str, dialect: &Dialect) -> Vec<Spanned<BlockToken>> {
    let syntax = dialect.syntax();
    let text = normalize_newlines(source);
    let lines: Vec<&str> = text.split('\n').collect();
    // A trailing newline does not start another line.
    let lines = match lines.split_last() {
        Some((last, rest)) if last.is_empty() => rest,
        _ => &lines[..],
    };

    let mut tokens = Vec::with_capacity(lines.len());
    let mut index = scan_meta(lines, &syntax.meta, &mut tokens);
    // Closer of the open fence or object
    let mut verbatim_until: Option<&str> = None;

    while index < lines.len() {
        let raw = lines[index];
        let line = index + 1;
        index += 1;

        if let Some(close) = verbatim_until {
            let token = if raw.trim() == close {
                verbatim_until = None;
                BlockToken::FenceClose
            } else {
                BlockToken::Verbatim(raw.to_string())
            };
            tokens.push(spanned(line, raw, token));
            continue;
        }

        if let Some((fence, language)) = match_fence_open(raw, syntax) {
            verbatim_until = Some(fence.close.as_str());
            tokens.push(spanned(line, raw, BlockToken::FenceOpen { language }));
            continue;
        }

        if let Some((close, token)) = match_object_open(raw, syntax) {
            verbatim_until = Some(close);
            tokens.push(spanned(line, raw, token));
            continue;
        }

        tokens.push(spanned(line, raw, classify_line(raw, syntax)));
    }

    tokens
}

fn spanned(line: usize, raw: &str, token: BlockToken) -> Spanned<BlockToken> {
    Spanned {
        line,
        raw: raw.to_string(),
        token,
    }
}

pub(crate) fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

/// Consume a metadata header at the start of the page. Returns the index of
/// the first line after it.
fn scan_meta(lines: &[&str], meta: &MetaSyntax, tokens: &mut Vec<Spanned<BlockToken>>) -> usize {
    match meta {
        MetaSyntax::None => 0,
        MetaSyntax::HeaderLines { .. } => {
            let starts_header = lines
                .first()
                .is_some_and(|first| first.starts_with("Content-Type:"));
            if !starts_header {
                return 0;
            }
            let mut entries = Vec::new();
            let mut end = 0;
            while end < lines.len() {
                match HEADER_LINE_RE.captures(lines[end]) {
                    Some(caps) => entries.push((caps[1].to_string(), caps[2].to_string())),
                    None => break,
                }
                end += 1;
            }
            let raw = lines[..end].join("\n");
            // The blank line closing the header belongs to it.
            if end < lines.len() && lines[end].trim().is_empty() {
                end += 1;
            }
            tokens.push(spanned(1, &raw, BlockToken::Meta(entries)));
            end
        }
        MetaSyntax::FrontMatter { delimiter } => {
            if lines.first().map(|l| l.trim_end()) != Some(delimiter.as_str()) {
                return 0;
            }
            let Some(close) = lines
                .iter()
                .skip(1)
                .position(|l| l.trim_end() == delimiter)
                .map(|p| p + 1)
            else {
                return 0;
            };
            let mut entries = Vec::new();
            for body in &lines[1..close] {
                match HEADER_LINE_RE.captures(body) {
                    Some(caps) => entries.push((caps[1].to_string(), caps[2].to_string())),
                    None => return 0,
                }
            }
            if entries.is_empty() {
                return 0;
            }
            let raw = lines[..=close].join("\n");
            tokens.push(spanned(1, &raw, BlockToken::Meta(entries)));
            close + 1
        }
    }
}

/// Whether `line` would open a fence or an object.
pub(crate) fn opens_verbatim(line: &str, syntax: &Syntax) -> bool {
    match_fence_open(line, syntax).is_some() || match_object_open(line, syntax).is_some()
}

fn match_fence_open<'s>(
    raw: &str,
    syntax: &'s Syntax,
) -> Option<(&'s FenceSyntax, Option<String>)> {
    let trimmed = raw.trim();
    for fence in &syntax.fences {
        let Some(rest) = trimmed.strip_prefix(fence.open.as_str()) else {
            continue;
        };
        let rest = rest.trim();
        match &fence.language {
            FenceLanguage::None if rest.is_empty() => return Some((fence, None)),
            FenceLanguage::None => {}
            FenceLanguage::Suffix if !rest.contains(fence.open.as_str()) => {
                let language = (!rest.is_empty()).then(|| rest.to_string());
                return Some((fence, language));
            }
            FenceLanguage::Suffix => {}
            FenceLanguage::Attribute(name) => return Some((fence, attribute(rest, name))),
        }
    }
    None
}

/// `{{{type: key="value" other=x` with the closer of the object syntax.
fn match_object_open<'s>(raw: &str, syntax: &'s Syntax) -> Option<(&'s str, BlockToken)> {
    let objects = syntax.objects.as_ref()?;
    let header = raw.trim().strip_prefix(objects.open.as_str())?.trim_start();
    let (kind, params) = header.split_once(':')?;
    if kind.is_empty() || !kind.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    let attributes = OBJECT_PARAM_RE
        .captures_iter(params)
        .map(|caps| {
            let value = &caps[2];
            let value = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                Some(quoted) => quoted.replace("\"\"", "\""),
                None => value.to_string(),
            };
            (caps[1].to_lowercase(), value)
        })
        .collect();
    let token = BlockToken::ObjectOpen {
        kind: kind.to_lowercase(),
        attributes,
    };
    Some((objects.close.as_str(), token))
}

/// Value of `name="value"` (or `name=value`) in an attribute list.
fn attribute(attributes: &str, name: &str) -> Option<String> {
    let mut rest = attributes;
    while let Some(pos) = rest.find(name) {
        let after = &rest[pos + name.len()..];
        let boundary = pos == 0 || rest[..pos].ends_with(char::is_whitespace);
        if let (true, Some(value)) = (boundary, after.strip_prefix('=')) {
            let value = match value.strip_prefix('"') {
                Some(quoted) => quoted.split('"').next().unwrap_or_default(),
                None => value.split_whitespace().next().unwrap_or_default(),
            };
            return (!value.is_empty()).then(|| value.to_string());
        }
        rest = after;
    }
    None
}

pub(crate) fn classify_line(raw: &str, syntax: &Syntax) -> BlockToken {
    let content = raw.trim_end();
    if content.trim_start().is_empty() {
        return BlockToken::Blank;
    }

    // Closers that differ from their opener can only be stray here.
    let trimmed = content.trim();
    let stray_fence = syntax
        .fences
        .iter()
        .any(|fence| fence.close != fence.open && trimmed == fence.close);
    let stray_object = syntax
        .objects
        .as_ref()
        .is_some_and(|objects| trimmed == objects.close);
    if stray_fence || stray_object {
        return BlockToken::FenceClose;
    }

    let (indent, body) = measure_indent(content, syntax.list.tab_width);

    if indent == 0 {
        if let Some(token) = match_heading(body, syntax) {
            return token;
        }
        if is_rule(body, syntax) {
            return BlockToken::Rule;
        }
    }

    if let Some(token) = match_table(body) {
        return token;
    }

    if let Some((marker, text)) = match_list_item(body, syntax) {
        return BlockToken::ListItem {
            indent,
            marker,
            text: text.to_string(),
        };
    }

    match &syntax.quote {
        QuoteSyntax::Prefix(prefix) => {
            if let Some(rest) = body.strip_prefix(prefix.as_str()) {
                return BlockToken::Quote(rest.trim().to_string());
            }
        }
        QuoteSyntax::Indent if indent > 0 => return BlockToken::Quote(body.to_string()),
        QuoteSyntax::Indent => {}
    }

    BlockToken::Text(body.to_string())
}

/// Indent width in columns and the rest of the line.
fn measure_indent(line: &str, tab_width: usize) -> (usize, &str) {
    let mut columns = 0;
    for (pos, c) in line.char_indices() {
        match c {
            '\t' => columns += tab_width,
            ' ' => columns += 1,
            _ => return (columns, &line[pos..]),
        }
    }
    (columns, "")
}

fn match_heading(line: &str, syntax: &Syntax) -> Option<BlockToken> {
    let marker = syntax.heading.marker;
    let level = line.chars().take_while(|&c| c == marker).count();
    if level == 0 {
        return None;
    }
    let rest = &line[level * marker.len_utf8()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut text = rest.trim();
    if syntax.heading.closing {
        let stripped = text.trim_end_matches(marker);
        if stripped.len() == text.len() || !stripped.ends_with(char::is_whitespace) {
            return None;
        }
        text = stripped.trim_end();
    } else {
        let stripped = text.trim_end_matches(marker);
        if stripped.len() != text.len() && stripped.ends_with(char::is_whitespace) {
            text = stripped.trim_end();
        }
    }
    if text.is_empty() {
        return None;
    }
    Some(BlockToken::Heading {
        level,
        text: text.to_string(),
    })
}

/// Whether a table cell reads as an alignment cell (`---`, `:-:`).
pub(crate) fn is_separator_cell(cell: &str) -> bool {
    SEPARATOR_CELL_RE.is_match(cell.trim())
}

fn is_rule(line: &str, syntax: &Syntax) -> bool {
    let rule = &syntax.rule;
    line.chars().all(|c| c == rule.marker) && line.chars().count() >= rule.min
}

fn match_table(line: &str) -> Option<BlockToken> {
    if line.len() < 2 || !line.starts_with('|') || !line.ends_with('|') {
        return None;
    }
    let cells = split_cells(&line[1..line.len() - 1]);
    let is_separator = cells.iter().all(|cell| is_separator_cell(cell));
    if is_separator {
        let aligns = cells.iter().map(|cell| parse_align(cell.trim())).collect();
        return Some(BlockToken::TableSeparator(aligns));
    }
    Some(BlockToken::TableRow(
        cells
            .iter()
            .map(|cell| cell.trim().replace("\\|", "|"))
            .collect(),
    ))
}

/// Split a row on `|`, ignoring escaped pipes and pipes inside `[[...]]`.
fn split_cells(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut link_depth = 0usize;
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek().is_some_and(char::is_ascii_punctuation) => {
                current.push(c);
                current.extend(chars.next());
            }
            '[' if chars.peek() == Some(&'[') => {
                link_depth += 1;
                current.push_str("[[");
                chars.next();
            }
            ']' if link_depth > 0 && chars.peek() == Some(&']') => {
                link_depth -= 1;
                current.push_str("]]");
                chars.next();
            }
            '|' if link_depth == 0 => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

fn parse_align(cell: &str) -> Align {
    match (cell.starts_with(':'), cell.ends_with(':') && cell.len() > 1) {
        (true, true) => Align::Center,
        (true, false) => Align::Left,
        (false, true) => Align::Right,
        (false, false) => Align::None,
    }
}

fn match_list_item<'a>(line: &'a str, syntax: &Syntax) -> Option<(ItemMarker, &'a str)> {
    let list = &syntax.list;

    let checkbox = |text: &'a str| {
        list.checkboxes.iter().find_map(|(state, marker)| {
            strip_marker(text, marker).map(|rest| (ItemMarker::Checkbox(*state), rest))
        })
    };

    for bullet in &list.bullets {
        if let Some(rest) = strip_marker(line, bullet) {
            if list.checkbox_after_bullet {
                if let Some(item) = checkbox(rest) {
                    return Some(item);
                }
            }
            return Some((ItemMarker::Bullet, rest));
        }
    }

    if !list.checkbox_after_bullet {
        if let Some(item) = checkbox(line) {
            return Some(item);
        }
    }

    NUMBER_BULLET_RE.captures(line).and_then(|caps| {
        let whole = caps.get(0)?;
        Some((
            ItemMarker::Numbered(caps[1].to_string()),
            line[whole.end()..].trim(),
        ))
    })
}

/// Strip `marker` when it is followed by whitespace or ends the line.
fn strip_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(marker)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}
