//! Wiki export tests

use folio_babel::dialects::wiki;
use folio_babel::ir::nodes::{Block, CheckState, Inline, ItemMarker, ListItem};
use folio_babel::Document;

fn text(s: &str) -> Inline {
    Inline::text(s)
}

#[test]
fn test_serialize_file_writes_header() {
    let doc = Document::with_meta(
        vec![("Creation-Date".to_string(), "2024".to_string())],
        vec![Block::heading(1, vec![text("Title")])],
    );

    let output = wiki().serialize_file(&doc);
    assert_eq!(
        output,
        "Content-Type: text/x-zim-wiki\nWiki-Format: zim 0.6\nCreation-Date: 2024\n\n= Title =\n"
    );

    let parsed = wiki().parse(&output);
    assert_eq!(parsed.document, doc);
}

#[test]
fn test_serialize_file_writes_header_without_meta() {
    let doc = Document::new(vec![Block::paragraph(vec![text("Body")])]);

    assert_eq!(
        wiki().serialize_file(&doc),
        "Content-Type: text/x-zim-wiki\nWiki-Format: zim 0.6\n\nBody\n"
    );
    assert_eq!(wiki().serialize(&doc), "Body\n");
}

#[test]
fn test_format_keys_in_meta_are_not_duplicated() {
    let doc = Document::with_meta(
        vec![("Content-Type".to_string(), "text/plain".to_string())],
        vec![],
    );

    assert_eq!(
        wiki().serialize_file(&doc),
        "Content-Type: text/x-zim-wiki\nWiki-Format: zim 0.6\n"
    );
}

#[test]
fn test_serialize_lists_with_tabs() {
    let doc = Document::new(vec![Block::list(vec![
        ListItem::new(0, ItemMarker::Bullet, vec![text("a")]),
        ListItem::new(1, ItemMarker::Bullet, vec![text("b")]),
        ListItem::new(
            0,
            ItemMarker::Checkbox(CheckState::Checked),
            vec![text("c")],
        ),
        ListItem::new(
            1,
            ItemMarker::Checkbox(CheckState::Crossed),
            vec![text("d")],
        ),
        ListItem::new(0, ItemMarker::Numbered("3".to_string()), vec![text("e")]),
    ])]);

    assert_eq!(
        wiki().serialize(&doc),
        "* a\n\t* b\n[*] c\n\t[x] d\n3. e\n"
    );
}

#[test]
fn test_serialize_spans_and_links() {
    let doc = Document::new(vec![Block::paragraph(vec![
        Inline::Bold(vec![text("b")]),
        text(" "),
        Inline::Italic(vec![text("i")]),
        text(" "),
        Inline::Code("c".to_string()),
        text(" "),
        Inline::link("Projects:Plan", None),
        text(" "),
        Inline::link("+Child", Some("child")),
        text(" "),
        Inline::link("https://example.org", None),
    ])]);

    assert_eq!(
        wiki().serialize(&doc),
        "**b** //i// ''c'' [[Projects:Plan]] [[+Child|child]] https://example.org\n"
    );
}

#[test]
fn test_serialize_code_blocks_pick_fence_by_language() {
    let doc = Document::new(vec![
        Block::code(None, "plain"),
        Block::code(Some("rust"), "let x = 1;"),
    ]);

    let output = wiki().serialize(&doc);
    assert_eq!(
        output,
        "'''\nplain\n'''\n\n{{{code: lang=\"rust\"\nlet x = 1;\n}}}\n"
    );
    assert_eq!(wiki().parse(&output).document, doc);
}

#[test]
fn test_serialize_quote_and_rule() {
    let doc = Document::new(vec![
        Block::quote(vec![text("first\nsecond")]),
        Block::Rule,
    ]);

    assert_eq!(wiki().serialize(&doc), "\tfirst\n\tsecond\n\n-----\n");
}
