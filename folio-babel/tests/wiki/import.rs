//! Wiki import tests

use folio_babel::dialects::wiki;
use folio_babel::ir::nodes::{Block, CheckState, Image, Inline, ItemMarker, ListItem};
use folio_babel::WarningKind;

fn text(s: &str) -> Inline {
    Inline::text(s)
}

const JOURNAL: &str = "Content-Type: text/x-zim-wiki
Wiki-Format: zim 0.6
Creation-Date: 2024-03-01T10:00:00+01:00

= Journal =

Met with **Alice** about //the plan//. See [[Projects:Plan|the plan]] and @meeting.

[*] call back
[ ] write notes
\t[x] dropped
\t[>] moved

'''
raw **text**
'''

{{{code: lang=\"python\"
print(\"hi\")
}}}

\tAn indented quote

-----
";

#[test]
fn test_import_journal_page() {
    let parsed = wiki().parse(JOURNAL);
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);

    let doc = parsed.document;
    assert_eq!(
        doc.meta(),
        &[(
            "Creation-Date".to_string(),
            "2024-03-01T10:00:00+01:00".to_string()
        )]
    );

    let blocks = doc.blocks();
    assert_eq!(blocks.len(), 7);
    assert_eq!(blocks[0], Block::heading(1, vec![text("Journal")]));
    assert_eq!(
        blocks[1],
        Block::paragraph(vec![
            text("Met with "),
            Inline::Bold(vec![text("Alice")]),
            text(" about "),
            Inline::Italic(vec![text("the plan")]),
            text(". See "),
            Inline::link("Projects:Plan", Some("the plan")),
            text(" and "),
            Inline::Tag("meeting".to_string()),
            text("."),
        ])
    );
    assert_eq!(
        blocks[2],
        Block::list(vec![
            ListItem::new(
                0,
                ItemMarker::Checkbox(CheckState::Checked),
                vec![text("call back")]
            ),
            ListItem::new(
                0,
                ItemMarker::Checkbox(CheckState::Unchecked),
                vec![text("write notes")]
            ),
            ListItem::new(
                1,
                ItemMarker::Checkbox(CheckState::Crossed),
                vec![text("dropped")]
            ),
            ListItem::new(
                1,
                ItemMarker::Checkbox(CheckState::Migrated),
                vec![text("moved")]
            ),
        ])
    );
    assert_eq!(blocks[3], Block::code(None, "raw **text**"));
    assert_eq!(blocks[4], Block::code(Some("python"), "print(\"hi\")"));
    assert_eq!(blocks[5], Block::quote(vec![text("An indented quote")]));
    assert_eq!(blocks[6], Block::Rule);
}

#[test]
fn test_heading_levels_count_markers() {
    let doc = wiki().parse("== Two ==\n\n====== Six ======\n").document;
    assert_eq!(
        doc.blocks(),
        vec![
            Block::heading(2, vec![text("Two")]),
            Block::heading(6, vec![text("Six")]),
        ]
    );
}

#[test]
fn test_heading_without_closing_run_is_text() {
    let doc = wiki().parse("== Title\n").document;
    assert_eq!(doc.blocks(), vec![Block::paragraph(vec![text("== Title")])]);
}

#[test]
fn test_deep_heading_is_recovered() {
    let parsed = wiki().parse("intro\n\n======= Deep =======\n");

    assert_eq!(
        parsed.document.blocks(),
        vec![
            Block::paragraph(vec![text("intro")]),
            Block::paragraph(vec![text("======= Deep =======")]),
        ]
    );
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].line, Some(3));
    assert_eq!(parsed.warnings[0].kind, WarningKind::ParseRecovery);
}

#[test]
fn test_stray_object_close_is_recovered() {
    let parsed = wiki().parse("}}}\n");
    assert_eq!(
        parsed.document.blocks(),
        vec![Block::paragraph(vec![text("}}}")])]
    );
    assert_eq!(parsed.warnings.len(), 1);
}

#[test]
fn test_header_only_on_first_line() {
    let doc = wiki().parse("Hello\nContent-Type: text/x-zim-wiki\n").document;

    assert!(doc.meta().is_empty());
    assert_eq!(
        doc.blocks(),
        vec![Block::paragraph(vec![text(
            "Hello\nContent-Type: text/x-zim-wiki"
        )])]
    );
}

#[test]
fn test_spans() {
    let doc = wiki()
        .parse("__hi__ ~~no~~ ''raw //x//'' H_{2}O x^{2}\n")
        .document;

    assert_eq!(
        doc.blocks(),
        vec![Block::paragraph(vec![
            Inline::Highlight(vec![text("hi")]),
            text(" "),
            Inline::Strikethrough(vec![text("no")]),
            text(" "),
            Inline::Code("raw //x//".to_string()),
            text(" H"),
            Inline::Subscript(vec![text("2")]),
            text("O x"),
            Inline::Superscript(vec![text("2")]),
        ])]
    );
}

#[test]
fn test_url_slashes_are_not_italic() {
    let doc = wiki().parse("Go to https://example.org//path now\n").document;

    assert_eq!(
        doc.blocks(),
        vec![Block::paragraph(vec![
            text("Go to "),
            Inline::link("https://example.org//path", None),
            text(" now"),
        ])]
    );
}

#[test]
fn test_images_and_anchors() {
    let doc = wiki()
        .parse("{{id:top}}{{./pasted.png?width=300|Screenshot}}\n")
        .document;

    let mut image = Image::new("./pasted.png");
    image.width = Some(300);
    image.alt = Some("Screenshot".to_string());
    assert_eq!(
        doc.blocks(),
        vec![Block::paragraph(vec![
            Inline::Anchor("top".to_string()),
            Inline::Image(image),
        ])]
    );
}

#[test]
fn test_bullets_and_numbered_items() {
    let doc = wiki().parse("* one\n\t* two\n\t\t* three\n1. first\na. alpha\n").document;

    assert_eq!(
        doc.blocks(),
        vec![Block::list(vec![
            ListItem::new(0, ItemMarker::Bullet, vec![text("one")]),
            ListItem::new(1, ItemMarker::Bullet, vec![text("two")]),
            ListItem::new(2, ItemMarker::Bullet, vec![text("three")]),
            ListItem::new(0, ItemMarker::Numbered("1".to_string()), vec![text("first")]),
            ListItem::new(0, ItemMarker::Numbered("a".to_string()), vec![text("alpha")]),
        ])]
    );
}

#[test]
fn test_over_indented_item_nests_one_level() {
    let doc = wiki().parse("* one\n\t\t\t* deep\n").document;

    let Block::List { items } = &doc.blocks()[0] else {
        panic!("Should have list");
    };
    assert_eq!(items[1].depth, 1);
}
