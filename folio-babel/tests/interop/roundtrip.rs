//! Property tests: parse(serialize(tree)) == tree in every built-in dialect.
//!
//! Generated trees stay inside what both dialects can express: words are
//! plain lowercase letters, page targets are `Name:Name` paths, and inline
//! nodes are separated by a space.
//!
//! Generated pages are built from markup fragments of one dialect, free
//! delimiter characters included. Reading such a page, writing it back and
//! reading it again must give the same tree, in the same dialect and through
//! the other one. The cross-dialect fragments leave out the combinations
//! listed as lossy in the dialect docs.

use folio_babel::dialect::Dialect;
use folio_babel::dialects::{markdown, wiki};
use folio_babel::ir::nodes::{
    Align, Block, CheckState, Inline, ItemMarker, ListItem, Table,
};
use folio_babel::Document;
use proptest::prelude::*;

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..4).prop_map(|words| words.join(" "))
}

fn page_target() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Z][a-z]{1,6}", 1..4).prop_map(|names| names.join(":"))
}

fn atom() -> impl Strategy<Value = Inline> {
    prop_oneof![
        words().prop_map(Inline::Text),
        words().prop_map(|w| Inline::Bold(vec![Inline::Text(w)])),
        words().prop_map(|w| Inline::Italic(vec![Inline::Text(w)])),
        words().prop_map(|w| Inline::Strikethrough(vec![Inline::Text(w)])),
        words().prop_map(|w| Inline::Highlight(vec![Inline::Text(w)])),
        word().prop_map(|w| Inline::Subscript(vec![Inline::Text(w)])),
        word().prop_map(|w| Inline::Superscript(vec![Inline::Text(w)])),
        word().prop_map(Inline::Code),
        (page_target(), prop::option::of(words()))
            .prop_map(|(target, label)| Inline::link(&target, label.as_deref())),
        word().prop_map(Inline::Tag),
    ]
}

fn inline_content() -> impl Strategy<Value = Vec<Inline>> {
    prop::collection::vec(atom(), 1..5).prop_map(|atoms| {
        let mut content: Vec<Inline> = Vec::new();
        for (i, atom) in atoms.into_iter().enumerate() {
            if i > 0 {
                push_text(&mut content, " ");
            }
            match atom {
                Inline::Text(text) => push_text(&mut content, &text),
                other => content.push(other),
            }
        }
        content
    })
}

fn push_text(content: &mut Vec<Inline>, text: &str) {
    match content.last_mut() {
        Some(Inline::Text(last)) => last.push_str(text),
        _ => content.push(Inline::text(text)),
    }
}

fn marker() -> impl Strategy<Value = ItemMarker> {
    prop_oneof![
        Just(ItemMarker::Bullet),
        (1u32..20).prop_map(|n| ItemMarker::Numbered(n.to_string())),
        prop_oneof![
            Just(CheckState::Unchecked),
            Just(CheckState::Checked),
            Just(CheckState::Crossed),
            Just(CheckState::Migrated),
        ]
        .prop_map(ItemMarker::Checkbox),
    ]
}

fn list() -> impl Strategy<Value = Block> {
    prop::collection::vec((0usize..3, marker(), inline_content()), 1..6).prop_map(|entries| {
        let mut depth = 0;
        let items = entries
            .into_iter()
            .enumerate()
            .map(|(i, (step, marker, content))| {
                depth = if i == 0 { 0 } else { step.min(depth + 1) };
                ListItem::new(depth, marker, content)
            })
            .collect();
        Block::list(items)
    })
}

fn align() -> impl Strategy<Value = Align> {
    prop_oneof![
        Just(Align::None),
        Just(Align::Left),
        Just(Align::Center),
        Just(Align::Right),
    ]
}

fn table() -> impl Strategy<Value = Block> {
    (1usize..4)
        .prop_flat_map(|columns| {
            (
                prop::option::of(prop::collection::vec(inline_content(), columns)),
                prop::collection::vec(align(), columns),
                prop::collection::vec(prop::collection::vec(inline_content(), columns), 1..4),
            )
        })
        .prop_map(|(header, aligns, rows)| {
            let aligns = match header {
                Some(_) => aligns,
                None => vec![Align::None; aligns.len()],
            };
            Block::Table(Table {
                header,
                aligns,
                rows,
            })
        })
}

fn code_block() -> impl Strategy<Value = Block> {
    (
        prop::option::of(prop::sample::select(vec!["rust", "python", "sh"])),
        prop::collection::vec(words(), 1..4),
    )
        .prop_map(|(language, lines)| Block::code(language, &lines.join("\n")))
}

fn object() -> impl Strategy<Value = Block> {
    (
        "[a-z]{1,6}".prop_filter("code objects are code blocks", |kind| kind != "code"),
        prop::collection::vec(("[a-z]{1,5}", "[a-z \"]{0,6}"), 0..3),
        prop::collection::vec(words(), 0..3),
    )
        .prop_map(|(kind, attributes, lines)| {
            let attributes: Vec<(&str, &str)> = attributes
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            Block::object(&kind, &attributes, &lines.join("\n"))
        })
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        (1u8..=6, inline_content()).prop_map(|(level, content)| Block::heading(level, content)),
        inline_content().prop_map(Block::paragraph),
        list(),
        table(),
        code_block(),
        inline_content().prop_map(Block::quote),
        Just(Block::Rule),
        object(),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(block(), 1..6).prop_map(Document::new)
}

fn assert_round_trip(dialect: &Dialect, doc: &Document) -> Result<(), TestCaseError> {
    let text = dialect.serialize(doc);
    let parsed = dialect.parse(&text);
    prop_assert!(
        parsed.warnings.is_empty(),
        "warnings {:?} for:\n{}",
        parsed.warnings,
        text
    );
    prop_assert_eq!(&parsed.document, doc, "text was:\n{}", text);
    Ok(())
}

const WIKI_FRAGMENTS: &[&str] = &[
    "a", "bc", " ", "]", "(", ")", "`", "_", "~", "^", "}", "|", "#", ".", ":", ",", "!", "-",
    "=", ">", "+", "<", "\"", "@", "\\\\", "\\q", "**b**", "//it//", "''q''", "[[Page]]",
    "[[Plan|the plan]]", " http://a.org ", " @tag ", "[x](y)", "2*3*4", "{{id:top}}", "__h__",
    "~~s~~", "_{x}", "^{x}",
];

const MARKDOWN_FRAGMENTS: &[&str] = &[
    "a", "bc", " ", "]", "(", ")", "_", "~", "^", "}", "|", "#", ".", ":", ",", "-", "=", ">",
    "+", "<", "\"", "@", "/", "'", "\\\\", "\\q", "**b**", "*it*", "`code`", "[[Page]]",
    "[[Plan|the plan]]", " http://a.org ", " @tag ", "[x](y)", "see //srv//x", "''q''",
    "<a id=\"top\"></a>", "__h__", "~~s~~", "_{x}", "^{x}",
];

/// Free delimiters that pair up with the other fragments in ways only the
/// dialect itself reads back.
const LOOSE_FRAGMENTS: &[&str] = &["*", "/", "'", "`", "[", "{", "!", "\\", "**", "//"];

/// Inline text: a word, then any fragments.
fn markup(fragments: Vec<&'static str>) -> impl Strategy<Value = String> {
    (
        word(),
        prop::collection::vec(prop::sample::select(fragments), 0..10),
    )
        .prop_map(|(first, rest)| format!("{first}{}", rest.concat()))
}

/// One block per entry, written the way `prefix` and `suffix` wrap it.
fn page(
    fragments: Vec<&'static str>,
    wrappers: &'static [(&'static str, &'static str)],
) -> impl Strategy<Value = String> {
    prop::collection::vec((prop::sample::select(wrappers), markup(fragments)), 1..5).prop_map(
        |blocks| {
            blocks
                .into_iter()
                .map(|((prefix, suffix), text)| format!("{prefix}{text}{suffix}"))
                .collect::<Vec<_>>()
                .join("\n\n")
        },
    )
}

const WIKI_WRAPPERS: &[(&str, &str)] = &[
    ("", ""),
    ("== ", " =="),
    ("* ", ""),
    ("1. ", ""),
    ("[*] ", ""),
    ("\t", ""),
    ("| ", " |"),
];

const MARKDOWN_WRAPPERS: &[(&str, &str)] = &[
    ("", ""),
    ("## ", ""),
    ("- ", ""),
    ("1. ", ""),
    ("- [x] ", ""),
    ("> ", ""),
    ("| ", " |"),
];

fn with_loose(fragments: &[&'static str]) -> Vec<&'static str> {
    let mut all = fragments.to_vec();
    all.extend_from_slice(LOOSE_FRAGMENTS);
    all
}

fn assert_stable(dialect: &Dialect, source: &str) -> Result<(), TestCaseError> {
    let doc = dialect.parse(source).document;
    let text = dialect.serialize(&doc);
    prop_assert_eq!(
        &dialect.parse(&text).document,
        &doc,
        "source:\n{}\nwritten:\n{}",
        source,
        text
    );
    Ok(())
}

fn assert_converts(from: &Dialect, to: &Dialect, source: &str) -> Result<(), TestCaseError> {
    let doc = from.parse(source).document;
    let text = to.serialize(&doc);
    prop_assert_eq!(
        &to.parse(&text).document,
        &doc,
        "source:\n{}\nwritten:\n{}",
        source,
        text
    );
    Ok(())
}

proptest! {
    #[test]
    fn test_wiki_text_is_stable(source in page(with_loose(WIKI_FRAGMENTS), WIKI_WRAPPERS)) {
        assert_stable(&wiki(), &source)?;
    }

    #[test]
    fn test_markdown_text_is_stable(
        source in page(with_loose(MARKDOWN_FRAGMENTS), MARKDOWN_WRAPPERS)
    ) {
        assert_stable(&markdown(), &source)?;
    }

    #[test]
    fn test_wiki_text_converts_to_markdown(source in page(WIKI_FRAGMENTS.to_vec(), WIKI_WRAPPERS)) {
        assert_converts(&wiki(), &markdown(), &source)?;
    }

    #[test]
    fn test_markdown_text_converts_to_wiki(source in page(MARKDOWN_FRAGMENTS.to_vec(), MARKDOWN_WRAPPERS)) {
        assert_converts(&markdown(), &wiki(), &source)?;
    }

    #[test]
    fn test_wiki_round_trip(doc in document()) {
        assert_round_trip(&wiki(), &doc)?;
    }

    #[test]
    fn test_markdown_round_trip(doc in document()) {
        assert_round_trip(&markdown(), &doc)?;
    }

    #[test]
    fn test_conversion_keeps_tree(doc in document()) {
        let as_markdown = markdown().serialize(&doc);
        let from_markdown = markdown().parse(&as_markdown).document;
        let as_wiki = wiki().serialize(&from_markdown);
        prop_assert_eq!(wiki().parse(&as_wiki).document, doc);
    }
}
