//! Native wiki dialect
//!
//! The notebook's own syntax, stored in `.txt` files that start with
//! `Content-Type: text/x-zim-wiki` header lines.
//!
//! # Element Mapping Table
//!
//! | Tree node        | Wiki syntax                          | Notes                                   |
//! |------------------|--------------------------------------|-----------------------------------------|
//! | Heading          | `= Title =` … `====== Title ======`  | level = number of `=`                   |
//! | List             | `* item`, `1. item`, `a. item`       | nesting by tabs                         |
//! | Checkbox item    | `[ ]`, `[*]`, `[x]`, `[>]`           | unchecked, checked, crossed, migrated   |
//! | Table            | `\| a \| b \|` + `\|---\|---\|`      | shared pipe syntax                      |
//! | CodeBlock        | `'''` … `'''`                        | `{{{code: lang="x"` … `}}}` with a language |
//! | BlockQuote       | tab-indented lines                   |                                         |
//! | Rule             | `-----`                              | five or more dashes                     |
//! | Bold / Italic    | `**b**` / `//i//`                    |                                         |
//! | Highlight        | `__h__`                              |                                         |
//! | Strikethrough    | `~~s~~`                              |                                         |
//! | Sub/Superscript  | `_{x}` / `^{x}`                      |                                         |
//! | Code             | `''c''`                              |                                         |
//! | Link             | `[[target]]`, `[[target\|label]]`    |                                         |
//! | Image            | `{{./img.png?width=100\|alt}}`       |                                         |
//! | Anchor           | `{{id:name}}`                        |                                         |
//! | Tag              | `@tag`                               |                                         |
//! | Object           | `{{{type: key="v"` … `}}}`           | body kept verbatim                      |
//! | Escape           | `\//`                                | `\` makes the next punctuation text       |

use crate::dialect::{
    AnchorSyntax, Dialect, EmphasisPrecedence, FenceLanguage, FenceSyntax, HeadingSyntax,
    ImageSyntax, LabelledLink, LinkSyntax, ListSyntax, MetaSyntax, ObjectSyntax, QuoteSyntax,
    RuleSyntax, SpanKind, SpanSyntax, Syntax,
};
use crate::ir::nodes::CheckState;

pub const WIKI_ID: &str = "wiki";
pub const WIKI_CONTENT_TYPE: &str = "text/x-zim-wiki";
pub const WIKI_FORMAT_VERSION: &str = "zim 0.6";

pub fn wiki() -> Dialect {
    let syntax = Syntax {
        meta: MetaSyntax::HeaderLines {
            content_type: WIKI_CONTENT_TYPE.to_string(),
            format_version: WIKI_FORMAT_VERSION.to_string(),
        },
        heading: HeadingSyntax {
            marker: '=',
            closing: true,
        },
        list: ListSyntax {
            bullets: vec!["*".to_string(), "\u{2022}".to_string()],
            bullet: "*".to_string(),
            checkbox_after_bullet: false,
            checkboxes: vec![
                (CheckState::Unchecked, "[ ]".to_string()),
                (CheckState::Checked, "[*]".to_string()),
                (CheckState::Crossed, "[x]".to_string()),
                (CheckState::Migrated, "[>]".to_string()),
            ],
            indent: "\t".to_string(),
            tab_width: 4,
        },
        fences: vec![
            FenceSyntax {
                open: "'''".to_string(),
                close: "'''".to_string(),
                language: FenceLanguage::None,
            },
            FenceSyntax {
                open: "{{{code:".to_string(),
                close: "}}}".to_string(),
                language: FenceLanguage::Attribute("lang".to_string()),
            },
        ],
        objects: Some(ObjectSyntax {
            open: "{{{".to_string(),
            close: "}}}".to_string(),
        }),
        quote: QuoteSyntax::Indent,
        rule: RuleSyntax {
            marker: '-',
            min: 5,
        },
        spans: vec![
            SpanSyntax::new(SpanKind::Code, "''", "''"),
            SpanSyntax::new(SpanKind::Bold, "**", "**"),
            SpanSyntax::new(SpanKind::Italic, "//", "//"),
            SpanSyntax::new(SpanKind::Highlight, "__", "__"),
            SpanSyntax::new(SpanKind::Strikethrough, "~~", "~~"),
            SpanSyntax::new(SpanKind::Subscript, "_{", "}"),
            SpanSyntax::new(SpanKind::Superscript, "^{", "}"),
        ],
        precedence: EmphasisPrecedence::DeclarationOrder,
        links: LinkSyntax {
            wiki: true,
            inline: false,
            labelled: LabelledLink::WikiPipe,
        },
        image: ImageSyntax::Braces,
        anchor: AnchorSyntax {
            open: "{{id:".to_string(),
            close: "}}".to_string(),
        },
        tag_prefix: '@',
        escape: Some('\\'),
    };

    Dialect::new(WIKI_ID, "Native wiki markup", "txt", syntax)
}
