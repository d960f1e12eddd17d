//! Serializer
//!
//! Writes a [`Document`] back to text using the emission rules of a dialect.
//! Blocks are separated by one blank line, list items use the dialect's
//! indent unit per depth, and `|` inside table cells is escaped.
//!
//! Text is written so that it reads back as text: a character that would
//! start markup in the target dialect, or the first punctuation of something
//! that would read as a bare URL, is preceded by the dialect's escape
//! character. A line that would read as another kind of block gets its first
//! punctuation escaped the same way.
//!
//! For any tree produced by [`crate::parser::parse`] with dialect `D`,
//! parsing the output of [`serialize`] with `D` yields the same tree.

use crate::common::links::{is_url, match_url};
use crate::dialect::{
    Dialect, FenceLanguage, FenceSyntax, ImageSyntax, LabelledLink, MetaSyntax, QuoteSyntax,
    SpanKind, Syntax, FORMAT_HEADER_KEYS,
};
use crate::ir::nodes::{Align, Block, Cell, Document, Image, Inline, ItemMarker, Link, ListItem, Table};
use crate::tokenizer::{classify_line, is_separator_cell, opens_verbatim, BlockToken};
use std::collections::BTreeMap;

/// How much of the text after a run is looked at when escaping it.
const LOOKAHEAD: usize = 64;

/// Serialize `doc`. Metadata is written only when the document has some.
pub fn serialize(doc: &Document, dialect: &Dialect) -> String {
    render(doc, dialect.syntax(), false)
}

/// Serialize `doc` as the content of a page file. Dialects with header
/// lines always write them.
pub fn serialize_file(doc: &Document, dialect: &Dialect) -> String {
    render(doc, dialect.syntax(), true)
}

fn render(doc: &Document, syntax: &Syntax, file: bool) -> String {
    let mut parts = Vec::new();
    if let Some(header) = render_meta(doc.meta(), &syntax.meta, file) {
        parts.push(header);
    }
    parts.extend(
        doc.blocks()
            .iter()
            .map(|block| render_block(block, syntax))
            .filter(|part| !part.is_empty()),
    );
    if parts.is_empty() {
        return String::new();
    }
    let mut out = parts.join("\n\n");
    out.push('\n');
    out
}

fn render_meta(meta: &[(String, String)], syntax: &MetaSyntax, file: bool) -> Option<String> {
    let entries: Vec<String> = meta
        .iter()
        .filter(|(key, _)| !FORMAT_HEADER_KEYS.contains(&key.as_str()))
        .map(|(key, value)| format!("{key}: {value}"))
        .collect();
    match syntax {
        MetaSyntax::None => None,
        MetaSyntax::HeaderLines {
            content_type,
            format_version,
        } => {
            if !file && entries.is_empty() {
                return None;
            }
            let mut lines = vec![
                format!("Content-Type: {content_type}"),
                format!("Wiki-Format: {format_version}"),
            ];
            lines.extend(entries);
            Some(lines.join("\n"))
        }
        MetaSyntax::FrontMatter { delimiter } => {
            if entries.is_empty() {
                return None;
            }
            Some(format!("{delimiter}\n{}\n{delimiter}", entries.join("\n")))
        }
    }
}

fn render_block(block: &Block, syntax: &Syntax) -> String {
    match block {
        Block::Heading { level, content } => render_heading(*level, content, syntax),
        Block::Paragraph { content } => render_inline(content, syntax)
            .split('\n')
            .map(|line| protect(line.to_string(), syntax, |l| is_text_line(l, syntax)))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::List { items } => items
            .iter()
            .map(|item| render_list_item(item, syntax))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Table(table) => render_table(table, syntax),
        Block::CodeBlock { language, text } => render_code(language.as_deref(), text, syntax),
        Block::BlockQuote { content } => render_inline(content, syntax)
            .split('\n')
            .map(|line| render_quote_line(line, syntax))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Rule => syntax.rule.marker.to_string().repeat(syntax.rule.min),
        Block::Object {
            kind,
            attributes,
            body,
        } => render_object(kind, attributes, body, syntax),
    }
}

fn is_text_line(line: &str, syntax: &Syntax) -> bool {
    !opens_verbatim(line, syntax) && matches!(classify_line(line, syntax), BlockToken::Text(_))
}

/// Keep `text` when `reads_back` accepts it, otherwise escape its first
/// unescaped punctuation character.
fn protect<F>(text: String, syntax: &Syntax, reads_back: F) -> String
where
    F: Fn(&str) -> bool,
{
    if reads_back(&text) {
        return text;
    }
    let Some(escape) = syntax.escape else {
        return text;
    };
    let mut chars = text.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        if c == escape && chars.peek().is_some_and(|(_, next)| next.is_ascii_punctuation()) {
            chars.next();
        } else if c.is_ascii_punctuation() {
            let mut out = String::with_capacity(text.len() + 1);
            out.push_str(&text[..pos]);
            out.push(escape);
            out.push_str(&text[pos..]);
            return out;
        }
    }
    text
}

fn render_heading(level: u8, content: &[Inline], syntax: &Syntax) -> String {
    let marker = syntax.heading.marker.to_string().repeat(usize::from(level));
    let line = |text: &str| {
        if syntax.heading.closing {
            format!("{marker} {text} {marker}")
        } else {
            format!("{marker} {text}")
        }
    };
    let mut text = single_line(&render_inline(content, syntax));
    let reads_back = matches!(
        classify_line(&line(&text), syntax),
        BlockToken::Heading { text: ref parsed, .. } if *parsed == text
    );
    // A trailing marker run would be read as the closing run.
    if let (false, Some(escape)) = (reads_back, syntax.escape) {
        if let Some(last) = text.chars().last().filter(char::is_ascii_punctuation) {
            text.pop();
            text.push(escape);
            text.push(last);
        }
    }
    line(&text)
}

fn render_list_item(item: &ListItem, syntax: &Syntax) -> String {
    let list = &syntax.list;
    let indent = list.indent.repeat(item.depth);
    let marker = match &item.marker {
        ItemMarker::Bullet => list.bullet.clone(),
        ItemMarker::Numbered(label) => format!("{label}."),
        ItemMarker::Checkbox(state) => {
            let checkbox = list.checkbox(*state).unwrap_or("[ ]");
            if list.checkbox_after_bullet {
                format!("{} {checkbox}", list.bullet)
            } else {
                checkbox.to_string()
            }
        }
    };
    let line = |text: &str| {
        if text.is_empty() {
            format!("{indent}{marker}")
        } else {
            format!("{indent}{marker} {text}")
        }
    };
    let text = single_line(&render_inline(&item.content, syntax));
    let text = protect(text, syntax, |text| {
        let line = line(text);
        !opens_verbatim(&line, syntax)
            && matches!(
                classify_line(&line, syntax),
                BlockToken::ListItem { marker, text: parsed, .. }
                    if marker == item.marker && parsed == text
            )
    });
    line(&text)
}

fn render_quote_line(text: &str, syntax: &Syntax) -> String {
    let line = |text: &str| match &syntax.quote {
        QuoteSyntax::Indent => format!("\t{text}"),
        QuoteSyntax::Prefix(prefix) if text.is_empty() => prefix.clone(),
        QuoteSyntax::Prefix(prefix) => format!("{prefix} {text}"),
    };
    let text = protect(text.to_string(), syntax, |text| {
        let line = line(text);
        !opens_verbatim(&line, syntax)
            && classify_line(&line, syntax) == BlockToken::Quote(text.to_string())
    });
    line(&text)
}

fn render_table(table: &Table, syntax: &Syntax) -> String {
    let columns = table.columns();
    if columns == 0 {
        return String::new();
    }
    let row = |cells: &[Cell]| {
        let mut rendered: Vec<String> = (0..columns)
            .map(|i| {
                cells
                    .get(i)
                    .map(|cell| single_line(&render_inline(cell, syntax)).replace('|', "\\|"))
                    .unwrap_or_default()
            })
            .collect();
        // A row of dashes would read as the alignment row.
        if rendered.iter().all(|cell| is_separator_cell(cell)) {
            rendered[0] = protect(std::mem::take(&mut rendered[0]), syntax, |_| false);
        }
        format!("| {} |", rendered.join(" | "))
    };

    let mut lines = Vec::with_capacity(table.rows.len() + 2);
    if let Some(header) = &table.header {
        lines.push(row(header));
        let separators: Vec<&str> = (0..columns)
            .map(|i| match table.aligns.get(i).copied().unwrap_or(Align::None) {
                Align::None => "---",
                Align::Left => ":--",
                Align::Center => ":-:",
                Align::Right => "--:",
            })
            .collect();
        lines.push(format!("|{}|", separators.join("|")));
    }
    lines.extend(table.rows.iter().map(|cells| row(cells)));
    lines.join("\n")
}

fn render_code(language: Option<&str>, text: &str, syntax: &Syntax) -> String {
    let wanted = |fence: &FenceSyntax| match language {
        Some(_) => fence.language != FenceLanguage::None,
        None => fence.language == FenceLanguage::None,
    };
    // A line equal to the closer would end the block early.
    let fits = |fence: &FenceSyntax| !text.split('\n').any(|line| line.trim() == fence.close);
    let fences = &syntax.fences;
    let Some(fence) = fences
        .iter()
        .find(|fence| wanted(fence) && fits(fence))
        .or_else(|| fences.iter().find(|fence| fits(fence)))
        .or_else(|| fences.iter().find(|fence| wanted(fence)))
        .or_else(|| fences.first())
    else {
        return text.to_string();
    };

    let open = match (&fence.language, language) {
        (FenceLanguage::Suffix, Some(language)) => format!("{}{language}", fence.open),
        (FenceLanguage::Attribute(name), Some(language)) => {
            format!("{} {name}=\"{language}\"", fence.open)
        }
        _ => fence.open.clone(),
    };
    if text.is_empty() {
        format!("{open}\n{}", fence.close)
    } else {
        format!("{open}\n{text}\n{}", fence.close)
    }
}

fn render_object(
    kind: &str,
    attributes: &BTreeMap<String, String>,
    body: &str,
    syntax: &Syntax,
) -> String {
    let Some(objects) = &syntax.objects else {
        return render_code(Some(kind), body, syntax);
    };
    let mut header = format!("{}{kind}:", objects.open);
    for (key, value) in attributes {
        header.push_str(&format!(" {key}=\"{}\"", value.replace('"', "\"\"")));
    }
    if body.is_empty() {
        format!("{header}\n{}", objects.close)
    } else {
        format!("{header}\n{body}\n{}", objects.close)
    }
}

/// Render inline content to dialect text.
pub fn render_inline(content: &[Inline], syntax: &Syntax) -> String {
    render_run(content, syntax, true, "")
}

/// Render sibling nodes. `after_space` tells whether the run starts a block
/// or follows whitespace; `follow` is the text written right after the run.
///
/// Nodes are rendered last to first so every text run can be escaped
/// against what is written after it.
fn render_run(content: &[Inline], syntax: &Syntax, after_space: bool, follow: &str) -> String {
    let mut pieces = vec![String::new(); content.len()];
    for (i, node) in content.iter().enumerate().rev() {
        let following = lookahead(&pieces[i + 1..], follow);
        let space_before = match i.checked_sub(1).map(|prev| &content[prev]) {
            None => after_space,
            Some(Inline::Text(text)) => text.ends_with(char::is_whitespace),
            Some(_) => false,
        };
        let space_after = match content.get(i + 1) {
            None => follow.is_empty() || follow.starts_with(char::is_whitespace),
            Some(Inline::Text(text)) => text.starts_with(char::is_whitespace),
            Some(_) => false,
        };
        pieces[i] = match node {
            Inline::Text(text) => {
                let after_tag = i > 0 && matches!(content[i - 1], Inline::Tag(_));
                escape_text(text, syntax, &following, after_tag)
            }
            Inline::Bold(children) => {
                render_span(SpanKind::Bold, children, syntax, space_before, &following)
            }
            Inline::Italic(children) => {
                render_span(SpanKind::Italic, children, syntax, space_before, &following)
            }
            Inline::Strikethrough(children) => {
                render_span(SpanKind::Strikethrough, children, syntax, space_before, &following)
            }
            Inline::Highlight(children) => {
                render_span(SpanKind::Highlight, children, syntax, space_before, &following)
            }
            Inline::Subscript(children) => {
                render_span(SpanKind::Subscript, children, syntax, space_before, &following)
            }
            Inline::Superscript(children) => {
                render_span(SpanKind::Superscript, children, syntax, space_before, &following)
            }
            Inline::Code(text) => match syntax.span(SpanKind::Code) {
                Some(span) => format!("{}{text}{}", span.open, span.close),
                None => escape_text(text, syntax, &following, false),
            },
            // A bare URL runs on into any text glued to either side of it.
            Inline::Link(link) => render_link(link, syntax, space_before && space_after),
            Inline::Image(image) => render_image(image, syntax),
            Inline::Anchor(name) => format!("{}{name}{}", syntax.anchor.open, syntax.anchor.close),
            Inline::Tag(name) => format!("{}{name}", syntax.tag_prefix),
        };
    }
    pieces.concat()
}

/// The start of the text written after `pieces[0]`'s predecessor.
fn lookahead(pieces: &[String], follow: &str) -> String {
    let mut out = String::new();
    for piece in pieces.iter().map(String::as_str).chain(std::iter::once(follow)) {
        if out.len() >= LOOKAHEAD {
            break;
        }
        out.push_str(piece);
    }
    out
}

fn render_span(
    kind: SpanKind,
    children: &[Inline],
    syntax: &Syntax,
    after_space: bool,
    following: &str,
) -> String {
    match syntax.span(kind) {
        Some(span) => {
            let follow = format!("{}{following}", span.close);
            let inner = render_run(children, syntax, false, &follow);
            format!("{}{inner}{}", span.open, span.close)
        }
        None => render_run(children, syntax, after_space, following),
    }
}

fn render_link(link: &Link, syntax: &Syntax, bare: bool) -> String {
    let target = &link.target;
    match &link.label {
        None if bare && is_url(target) => target.clone(),
        None if syntax.links.inline && target.contains(['|', ']']) => format!("[]({target})"),
        None if syntax.links.wiki => format!("[[{target}]]"),
        None => format!("[]({target})"),
        Some(label) => match syntax.links.labelled {
            LabelledLink::WikiPipe => format!("[[{target}|{label}]]"),
            LabelledLink::Inline if syntax.links.wiki && label.contains(['[', ']']) => {
                format!("[[{target}|{label}]]")
            }
            LabelledLink::Inline => format!("[{label}]({target})"),
        },
    }
}

fn render_image(image: &Image, syntax: &Syntax) -> String {
    let mut params = Vec::new();
    if let Some(width) = image.width {
        params.push(format!("width={width}"));
    }
    if let Some(height) = image.height {
        params.push(format!("height={height}"));
    }
    let mut src = image.src.clone();
    if !params.is_empty() {
        src.push('?');
        src.push_str(&params.join("&"));
    }
    let alt = image.alt.as_deref();
    match syntax.image {
        ImageSyntax::Braces => match alt {
            Some(alt) => format!("{{{{{src}|{alt}}}}}"),
            None => format!("{{{{{src}}}}}"),
        },
        ImageSyntax::Bang => format!("![{}]({src})", alt.unwrap_or_default()),
    }
}

/// Strings that start inline markup, or close a span, wherever they appear.
fn triggers(syntax: &Syntax) -> Vec<&str> {
    let mut triggers: Vec<&str> = syntax
        .spans
        .iter()
        .flat_map(|span| [span.open.as_str(), span.close.as_str()])
        .collect();
    triggers.push(&syntax.anchor.open);
    triggers.push(match syntax.image {
        ImageSyntax::Braces => "{{",
        ImageSyntax::Bang => "![",
    });
    if syntax.links.wiki {
        triggers.push("[[");
    }
    if syntax.links.inline {
        triggers.push("[");
    }
    triggers
}

/// Escape `text` so it reads back as the same text when `following` is
/// written right after it.
fn escape_text(text: &str, syntax: &Syntax, following: &str, after_tag: bool) -> String {
    let Some(escape) = syntax.escape else {
        return text.to_string();
    };
    let triggers = triggers(syntax);
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut marked: Vec<bool> = chars
        .iter()
        .enumerate()
        .map(|(i, &(pos, c))| {
            if c == escape {
                return true;
            }
            if !c.is_ascii_punctuation() {
                return false;
            }
            let word_start = i == 0 || chars[i - 1].1.is_whitespace();
            (c == syntax.tag_prefix && word_start)
                || (i == 0 && after_tag && is_word_char(c))
                || triggers
                    .iter()
                    .any(|trigger| starts_with_joined(&text[pos..], following, trigger))
        })
        .collect();
    break_urls(&chars, &mut marked, escape, following);
    write_marked(&chars, &marked, escape).0
}

/// Mark the first punctuation of every bare URL the escaped text would
/// still start, until there is none left.
fn break_urls(chars: &[(usize, char)], marked: &mut [bool], escape: char, following: &str) {
    loop {
        let (mut raw, offsets) = write_marked(chars, marked, escape);
        raw.push_str(following);
        let mut changed = false;
        for (i, &(_, c)) in chars.iter().enumerate() {
            let word_start = c.is_alphanumeric() && (i == 0 || !is_word_char(chars[i - 1].1));
            if !word_start {
                continue;
            }
            let Some(url) = match_url(&raw[offsets[i]..]) else {
                continue;
            };
            let end = offsets[i] + url.len();
            let first = (i..chars.len())
                .take_while(|&j| offsets[j] < end)
                .find(|&j| chars[j].1.is_ascii_punctuation());
            if let Some(j) = first.filter(|&j| !marked[j]) {
                marked[j] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

/// Write `chars` with an escape before every marked one, together with the
/// offset of each character in the output.
fn write_marked(chars: &[(usize, char)], marked: &[bool], escape: char) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(chars.len() + 8);
    let mut offsets = Vec::with_capacity(chars.len());
    for (&(_, c), &mark) in chars.iter().zip(marked) {
        if mark {
            out.push(escape);
        }
        offsets.push(out.len());
        out.push(c);
    }
    (out, offsets)
}

/// Whether `head` followed by `tail` starts with `pattern`.
fn starts_with_joined(head: &str, tail: &str, pattern: &str) -> bool {
    if head.len() >= pattern.len() {
        head.starts_with(pattern)
    } else {
        pattern.starts_with(head) && tail.starts_with(&pattern[head.len()..])
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn single_line(text: &str) -> String {
    text.replace('\n', " ")
}
