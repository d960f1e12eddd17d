//! Markdown export tests

use folio_babel::dialects::markdown;
use folio_babel::ir::nodes::{Block, CheckState, Image, Inline, ItemMarker, ListItem};
use folio_babel::Document;

fn text(s: &str) -> Inline {
    Inline::text(s)
}

fn sample() -> Document {
    Document::new(vec![
        Block::heading(2, vec![text("Plan")]),
        Block::paragraph(vec![
            text("Do "),
            Inline::Bold(vec![text("this")]),
            text(" first."),
        ]),
        Block::list(vec![
            ListItem::new(
                0,
                ItemMarker::Checkbox(CheckState::Unchecked),
                vec![text("open")],
            ),
            ListItem::new(
                1,
                ItemMarker::Checkbox(CheckState::Checked),
                vec![text("closed")],
            ),
            ListItem::new(0, ItemMarker::Numbered("1".to_string()), vec![text("numbered")]),
        ]),
        Block::code(Some("python"), "print(1)"),
        Block::quote(vec![text("quoted")]),
        Block::Rule,
        Block::paragraph(vec![
            text("See "),
            Inline::link("https://example.org", Some("site")),
            text(" and "),
            Inline::link("Home", None),
            text("."),
        ]),
    ])
}

#[test]
fn test_export_full_page() {
    let output = markdown().serialize(&sample());

    let expected = "## Plan

Do **this** first.

- [ ] open
    - [x] closed
1. numbered

```python
print(1)
```

> quoted

---

See [site](https://example.org) and [[Home]].
";
    assert_eq!(output, expected);
}

#[test]
fn test_export_then_import_preserves_tree() {
    let dialect = markdown();
    let doc = sample();

    let parsed = dialect.parse(&dialect.serialize(&doc));
    assert!(parsed.warnings.is_empty());
    assert_eq!(parsed.document, doc);
}

#[test]
fn test_export_bare_url_without_label() {
    let doc = Document::new(vec![Block::paragraph(vec![
        text("Visit "),
        Inline::link("https://example.org/a?b=c", None),
    ])]);

    assert_eq!(
        markdown().serialize(&doc),
        "Visit https://example.org/a?b=c\n"
    );
}

#[test]
fn test_export_url_glued_to_a_word_uses_brackets() {
    let doc = Document::new(vec![Block::paragraph(vec![
        text("see"),
        Inline::link("https://example.org", None),
    ])]);

    let dialect = markdown();
    let output = dialect.serialize(&doc);
    assert_eq!(output, "see[[https://example.org]]\n");
    assert_eq!(dialect.parse(&output).document, doc);
}

#[test]
fn test_export_image_anchor_and_tag() {
    let mut image = Image::new("diagram.png");
    image.alt = Some("Diagram".to_string());
    image.height = Some(120);

    let doc = Document::new(vec![Block::paragraph(vec![
        Inline::Anchor("top".to_string()),
        Inline::Image(image),
        text(" "),
        Inline::Tag("draft".to_string()),
    ])]);

    assert_eq!(
        markdown().serialize(&doc),
        "<a id=\"top\"></a>![Diagram](diagram.png?height=120) @draft\n"
    );
}

#[test]
fn test_export_multiline_paragraph_in_list_item_is_joined() {
    let doc = Document::new(vec![Block::list(vec![ListItem::new(
        0,
        ItemMarker::Bullet,
        vec![text("first\nsecond")],
    )])]);

    assert_eq!(markdown().serialize(&doc), "- first second\n");
}

#[test]
fn test_export_empty_document() {
    assert_eq!(markdown().serialize(&Document::default()), "");
}
