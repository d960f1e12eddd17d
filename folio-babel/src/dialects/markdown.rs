//! Markdown dialect
//!
//! The Markdown flavour used for notebook pages: CommonMark block syntax
//! extended with wiki links, highlights, sub/superscript, tags and the
//! extra checkbox states of the native dialect.
//!
//! # Element Mapping Table
//!
//! | Tree node        | Markdown syntax                    | Notes                                        |
//! |------------------|------------------------------------|----------------------------------------------|
//! | Heading          | `# Title` … `###### Title`         |                                              |
//! | List             | `- item`, `* item`, `1. item`      | written with `-`, nested by four spaces      |
//! | Checkbox item    | `- [ ]`, `- [x]`, `- [#]`, `- [>]` | unchecked, checked, crossed, migrated        |
//! | Table            | `\| a \| b \|` + `\|---\|---\|`    |                                              |
//! | CodeBlock        | ```` ```lang ```` … ```` ``` ````  |                                              |
//! | BlockQuote       | `> text`                           |                                              |
//! | Rule             | `---`                              | three or more dashes                         |
//! | Bold / Italic    | `**b**` / `*i*`                    | longest delimiter wins on ambiguity          |
//! | Highlight        | `__h__`                            | not CommonMark strong                        |
//! | Link             | `[label](target)`, `[[target]]`    | page links may be relative `.md` file paths  |
//! | Image            | `![alt](src?width=100)`            |                                              |
//! | Anchor           | `<a id="name"></a>`                |                                              |
//! | Metadata         | `---` front matter                 | written only when the page has metadata      |
//! | Object           | `{{{type: key="v"` … `}}}`         | same form as the native dialect              |
//! | Escape           | `\*`                               | `\` makes the next punctuation text            |
//!
//! # Lossy Conversions
//!
//! - Delimiter choice (`*` vs `-` bullets, `'''` vs ``` fences) is not kept;
//!   only the tree is the contract between dialects.
//! - Multiple blank lines collapse into one.
//! - Italic directly holding bold at its start or end (`***x***`, `*x**y***`)
//!   reads back as a different nesting, as does italic directly inside italic.
//! - Code spans holding a backtick, and link targets or labels holding `]`,
//!   `|` or an unbalanced `)`, have no form here and do not survive.
//! - A code block holding a ```` ``` ```` line ends early.
//! - An object of type `code` reads back as a code block in the native
//!   dialect.

use crate::dialect::{
    AnchorSyntax, Dialect, EmphasisPrecedence, FenceLanguage, FenceSyntax, HeadingSyntax,
    ImageSyntax, LabelledLink, LinkSyntax, ListSyntax, MetaSyntax, ObjectSyntax, QuoteSyntax,
    RuleSyntax, SpanKind, SpanSyntax, Syntax,
};
use crate::ir::nodes::CheckState;

pub const MARKDOWN_ID: &str = "markdown";

pub fn markdown() -> Dialect {
    let syntax = Syntax {
        meta: MetaSyntax::FrontMatter {
            delimiter: "---".to_string(),
        },
        heading: HeadingSyntax {
            marker: '#',
            closing: false,
        },
        list: ListSyntax {
            bullets: vec!["-".to_string(), "*".to_string(), "+".to_string()],
            bullet: "-".to_string(),
            checkbox_after_bullet: true,
            checkboxes: vec![
                (CheckState::Unchecked, "[ ]".to_string()),
                (CheckState::Checked, "[x]".to_string()),
                (CheckState::Crossed, "[#]".to_string()),
                (CheckState::Migrated, "[>]".to_string()),
            ],
            indent: "    ".to_string(),
            tab_width: 4,
        },
        fences: vec![FenceSyntax {
            open: "```".to_string(),
            close: "```".to_string(),
            language: FenceLanguage::Suffix,
        }],
        objects: Some(ObjectSyntax {
            open: "{{{".to_string(),
            close: "}}}".to_string(),
        }),
        quote: QuoteSyntax::Prefix(">".to_string()),
        rule: RuleSyntax {
            marker: '-',
            min: 3,
        },
        spans: vec![
            SpanSyntax::new(SpanKind::Code, "`", "`"),
            SpanSyntax::new(SpanKind::Italic, "*", "*"),
            SpanSyntax::new(SpanKind::Bold, "**", "**"),
            SpanSyntax::new(SpanKind::Highlight, "__", "__"),
            SpanSyntax::new(SpanKind::Strikethrough, "~~", "~~"),
            SpanSyntax::new(SpanKind::Subscript, "_{", "}"),
            SpanSyntax::new(SpanKind::Superscript, "^{", "}"),
        ],
        precedence: EmphasisPrecedence::LongestDelimiterFirst,
        links: LinkSyntax {
            wiki: true,
            inline: true,
            labelled: LabelledLink::Inline,
        },
        image: ImageSyntax::Bang,
        anchor: AnchorSyntax {
            open: "<a id=\"".to_string(),
            close: "\"></a>".to_string(),
        },
        tag_prefix: '@',
        escape: Some('\\'),
    };

    Dialect::new(MARKDOWN_ID, "Markdown with wiki extensions", "md", syntax)
        .with_aliases(&["markdown"])
}
