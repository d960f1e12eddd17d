//! CLI-specific transforms
//!
//! This module defines all the transform combinations available to `folio inspect`.
//! Each transform is a stage + format combination (e.g., "ir-treeviz", "token-block-json").
//!
//! ## Transform Pipeline
//!
//! A page goes through these stages:
//!
//! 1. **Tokenization** - Raw text → line tokens, then inline tokens per line
//!    - `token-block-*`: One token per source line (headings, list items, fences...)
//!    - `token-inline-json`: Inline tokens of every line holding inline text
//!
//! 2. **Parsing** - Tokens → Document tree
//!    - `ir-json`: The tree with parse warnings, as JSON
//!    - `ir-treeviz`: Indented tree, one node per line
//!    - `links-json`: Every link in document order

use folio_babel::ir::nodes::{Block, Inline, ItemMarker, ListItem, Table};
use folio_babel::tokenizer::{tokenize, tokenize_inline, BlockToken};
use folio_babel::{parse, Dialect, Document};
use serde::Serialize;
use serde_json::json;

/// All available CLI transforms (stage + format combinations)
pub const AVAILABLE_TRANSFORMS: &[&str] = &[
    "token-block-json",
    "token-block-simple",
    "token-inline-json",
    "ir-json",
    "ir-treeviz",
    "links-json",
];

pub const DEFAULT_TRANSFORM: &str = "ir-treeviz";

/// Execute a named transform on page text read with `dialect`.
///
/// JSON output is indented when `pretty` is set.
pub fn execute_transform(
    source: &str,
    dialect: &Dialect,
    transform_name: &str,
    pretty: bool,
) -> Result<String, String> {
    match transform_name {
        "token-block-json" => to_json(&tokenize(source, dialect), pretty),
        "token-block-simple" => Ok(tokenize(source, dialect)
            .iter()
            .map(|spanned| block_token_name(&spanned.token))
            .collect::<Vec<_>>()
            .join("\n")),
        "token-inline-json" => {
            let lines: Vec<serde_json::Value> = tokenize(source, dialect)
                .iter()
                .filter_map(|spanned| {
                    inline_text(&spanned.token).map(|text| {
                        json!({
                            "line": spanned.line,
                            "tokens": tokenize_inline(text, dialect),
                        })
                    })
                })
                .collect();
            to_json(&lines, pretty)
        }
        "ir-json" => to_json(&parse(source, dialect), pretty),
        "ir-treeviz" => Ok(to_treeviz(&parse(source, dialect).document)),
        "links-json" => to_json(&parse(source, dialect).document.links(), pretty),
        _ => Err(format!("Unknown transform: {transform_name}")),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, String> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|e| format!("JSON serialization failed: {e}"))
}

fn block_token_name(token: &BlockToken) -> &'static str {
    match token {
        BlockToken::Meta(_) => "meta",
        BlockToken::Heading { .. } => "heading",
        BlockToken::ListItem { .. } => "list_item",
        BlockToken::TableRow(_) => "table_row",
        BlockToken::TableSeparator(_) => "table_separator",
        BlockToken::FenceOpen { .. } => "fence_open",
        BlockToken::ObjectOpen { .. } => "object_open",
        BlockToken::Verbatim(_) => "verbatim",
        BlockToken::FenceClose => "fence_close",
        BlockToken::Quote(_) => "quote",
        BlockToken::Rule => "rule",
        BlockToken::Blank => "blank",
        BlockToken::Text(_) => "text",
    }
}

fn inline_text(token: &BlockToken) -> Option<&str> {
    match token {
        BlockToken::Heading { text, .. }
        | BlockToken::ListItem { text, .. }
        | BlockToken::Quote(text)
        | BlockToken::Text(text) => Some(text),
        _ => None,
    }
}

/// Render the document as an indented tree, two spaces per level.
fn to_treeviz(doc: &Document) -> String {
    let mut output = String::from("document\n");
    for (key, value) in doc.meta() {
        push_line(&mut output, 1, &format!("meta {key}={value:?}"));
    }
    for block in doc.blocks() {
        render_block(block, 1, &mut output);
    }
    output
}

fn push_line(output: &mut String, depth: usize, line: &str) {
    output.push_str(&"  ".repeat(depth));
    output.push_str(line);
    output.push('\n');
}

fn render_block(block: &Block, depth: usize, output: &mut String) {
    match block {
        Block::Heading { level, content } => {
            push_line(output, depth, &format!("heading level={level}"));
            render_inlines(content, depth + 1, output);
        }
        Block::Paragraph { content } | Block::BlockQuote { content } => {
            push_line(output, depth, block.type_name());
            render_inlines(content, depth + 1, output);
        }
        Block::List { items } => {
            push_line(output, depth, "list");
            for item in items {
                render_item(item, depth + 1, output);
            }
        }
        Block::Table(table) => render_table(table, depth, output),
        Block::CodeBlock { language, text } => {
            match language {
                Some(language) => {
                    push_line(output, depth, &format!("code_block language={language:?}"))
                }
                None => push_line(output, depth, "code_block"),
            }
            push_line(output, depth + 1, &format!("verbatim {text:?}"));
        }
        Block::Rule => push_line(output, depth, "rule"),
        Block::Object {
            kind,
            attributes,
            body,
        } => {
            let mut line = format!("object kind={kind:?}");
            for (key, value) in attributes {
                line.push_str(&format!(" {key}={value:?}"));
            }
            push_line(output, depth, &line);
            push_line(output, depth + 1, &format!("verbatim {body:?}"));
        }
    }
}

fn render_item(item: &ListItem, depth: usize, output: &mut String) {
    let marker = match &item.marker {
        ItemMarker::Bullet => "bullet".to_string(),
        ItemMarker::Numbered(label) => format!("numbered {label:?}"),
        ItemMarker::Checkbox(state) => format!("checkbox {}", format!("{state:?}").to_lowercase()),
    };
    push_line(
        output,
        depth,
        &format!("item depth={} {marker}", item.depth),
    );
    render_inlines(&item.content, depth + 1, output);
}

fn render_table(table: &Table, depth: usize, output: &mut String) {
    push_line(output, depth, &format!("table columns={}", table.columns()));
    let header = table.header.iter().map(|row| ("header", row));
    let rows = table.rows.iter().map(|row| ("row", row));
    for (label, row) in header.chain(rows) {
        push_line(output, depth + 1, label);
        for cell in row {
            push_line(output, depth + 2, "cell");
            render_inlines(cell, depth + 3, output);
        }
    }
}

fn render_inlines(content: &[Inline], depth: usize, output: &mut String) {
    for inline in content {
        match inline {
            Inline::Text(text) => push_line(output, depth, &format!("text {text:?}")),
            Inline::Code(text) => push_line(output, depth, &format!("code {text:?}")),
            Inline::Link(link) => match &link.label {
                Some(label) => push_line(
                    output,
                    depth,
                    &format!("link {:?} label={label:?}", link.target),
                ),
                None => push_line(output, depth, &format!("link {:?}", link.target)),
            },
            Inline::Image(image) => push_line(output, depth, &format!("image {:?}", image.src)),
            Inline::Anchor(name) => push_line(output, depth, &format!("anchor {name:?}")),
            Inline::Tag(name) => push_line(output, depth, &format!("tag {name:?}")),
            Inline::Bold(children)
            | Inline::Italic(children)
            | Inline::Strikethrough(children)
            | Inline::Highlight(children)
            | Inline::Subscript(children)
            | Inline::Superscript(children) => {
                push_line(output, depth, span_name(inline));
                render_inlines(children, depth + 1, output);
            }
        }
    }
}

fn span_name(inline: &Inline) -> &'static str {
    match inline {
        Inline::Bold(_) => "bold",
        Inline::Italic(_) => "italic",
        Inline::Strikethrough(_) => "strikethrough",
        Inline::Highlight(_) => "highlight",
        Inline::Subscript(_) => "subscript",
        _ => "superscript",
    }
}
