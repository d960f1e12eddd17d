//! Dialect descriptor definition
//!
//! A [`Dialect`] is plain data: the block rules, inline rules, emission
//! templates, canonical file extension and emphasis precedence of one markup
//! syntax. The tokenizer, parser and serializer are generic over this
//! descriptor, so adding a dialect means registering a new descriptor, never
//! touching the engine.

use crate::error::FormatError;
use crate::ir::nodes::{CheckState, Document};
use crate::parser::{self, Parsed};
use crate::serializer;
use serde::Serialize;

/// Deepest heading level any dialect may produce.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// A registered markup syntax.
#[derive(Debug, Clone, Serialize)]
pub struct Dialect {
    id: String,
    description: String,
    extension: String,
    aliases: Vec<String>,
    syntax: Syntax,
}

impl Dialect {
    pub fn new(id: &str, description: &str, extension: &str, syntax: Syntax) -> Self {
        Dialect {
            id: id.to_string(),
            description: description.to_string(),
            extension: extension.to_string(),
            aliases: Vec::new(),
            syntax,
        }
    }

    /// Additional file extensions recognised (but never written) for this dialect.
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// The identifier used in notebook configuration (e.g. "wiki", "markdown")
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Canonical extension, without the leading dot. New pages use this one.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Canonical extension followed by aliases.
    pub fn file_extensions(&self) -> Vec<&str> {
        std::iter::once(self.extension.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .collect()
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Parse source text. Never fails; see [`parser::parse`].
    pub fn parse(&self, source: &str) -> Parsed {
        parser::parse(source, self)
    }

    pub fn serialize(&self, doc: &Document) -> String {
        serializer::serialize(doc, self)
    }

    /// Serialize for writing a page file (always emits the file header, if
    /// the dialect has one).
    pub fn serialize_file(&self, doc: &Document) -> String {
        serializer::serialize_file(doc, self)
    }

    /// Reject descriptors the engine cannot drive.
    pub fn validate(&self) -> Result<(), FormatError> {
        let invalid =
            |msg: String| -> Result<(), FormatError> { Err(FormatError::InvalidDialect(msg)) };
        if self.id.trim().is_empty() {
            return invalid("dialect id is empty".to_string());
        }
        if self.extension.is_empty() || self.extension.contains('.') {
            return invalid(format!(
                "dialect '{}' has invalid extension '{}'",
                self.id, self.extension
            ));
        }
        let syntax = &self.syntax;
        if syntax.list.bullets.iter().any(String::is_empty) || syntax.list.bullet.is_empty() {
            return invalid(format!("dialect '{}' has an empty bullet marker", self.id));
        }
        if syntax.list.indent.is_empty() || syntax.list.tab_width == 0 {
            return invalid(format!("dialect '{}' has no list indent", self.id));
        }
        if syntax
            .spans
            .iter()
            .any(|span| span.open.is_empty() || span.close.is_empty())
        {
            return invalid(format!("dialect '{}' has an empty span delimiter", self.id));
        }
        if syntax.fences.is_empty()
            || syntax
                .fences
                .iter()
                .any(|fence| fence.open.is_empty() || fence.close.is_empty())
        {
            return invalid(format!("dialect '{}' needs at least one fence", self.id));
        }
        if syntax.anchor.open.is_empty() || syntax.anchor.close.is_empty() {
            return invalid(format!("dialect '{}' has an empty anchor delimiter", self.id));
        }
        if let Some(objects) = &syntax.objects {
            if objects.open.is_empty() || objects.close.is_empty() {
                return invalid(format!("dialect '{}' has an empty object delimiter", self.id));
            }
        }
        if syntax.escape.is_some_and(|c| !c.is_ascii_punctuation()) {
            return invalid(format!(
                "dialect '{}' escape character must be ASCII punctuation",
                self.id
            ));
        }
        Ok(())
    }
}

/// The full rule set of a dialect.
#[derive(Debug, Clone, Serialize)]
pub struct Syntax {
    pub meta: MetaSyntax,
    pub heading: HeadingSyntax,
    pub list: ListSyntax,
    /// Verbatim fences, in order of preference for emission.
    pub fences: Vec<FenceSyntax>,
    /// Typed verbatim blocks (`{{{type: key="value"` … `}}}`); checked after
    /// the fences, so a fence with the same opener takes precedence.
    pub objects: Option<ObjectSyntax>,
    pub quote: QuoteSyntax,
    pub rule: RuleSyntax,
    /// Span delimiters, in declaration order.
    pub spans: Vec<SpanSyntax>,
    pub precedence: EmphasisPrecedence,
    pub links: LinkSyntax,
    pub image: ImageSyntax,
    pub anchor: AnchorSyntax,
    pub tag_prefix: char,
    /// Makes the ASCII punctuation character after it literal text.
    pub escape: Option<char>,
}

impl Syntax {
    pub fn span(&self, kind: SpanKind) -> Option<&SpanSyntax> {
        self.spans.iter().find(|span| span.kind == kind)
    }
}

/// How page metadata is stored at the top of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MetaSyntax {
    None,
    /// `Key: value` header lines, introduced by a `Content-Type:` line and
    /// terminated by a blank line.
    HeaderLines {
        content_type: String,
        format_version: String,
    },
    /// `key: value` lines between two delimiter lines.
    FrontMatter { delimiter: String },
}

/// Header keys that belong to the file format rather than the page.
pub const FORMAT_HEADER_KEYS: &[&str] = &["Content-Type", "Wiki-Format"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingSyntax {
    /// Marker repeated `level` times.
    pub marker: char,
    /// Whether the marker run is repeated after the title.
    pub closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSyntax {
    /// Accepted bullet markers.
    pub bullets: Vec<String>,
    /// Bullet written by the serializer.
    pub bullet: String,
    /// Whether a checkbox follows a bullet (`- [ ]`) or stands alone (`[ ]`).
    pub checkbox_after_bullet: bool,
    pub checkboxes: Vec<(CheckState, String)>,
    /// Indent written per nesting level.
    pub indent: String,
    /// Columns a tab counts for when measuring indentation.
    pub tab_width: usize,
}

impl ListSyntax {
    pub fn checkbox(&self, state: CheckState) -> Option<&str> {
        self.checkboxes
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, marker)| marker.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FenceSyntax {
    pub open: String,
    pub close: String,
    pub language: FenceLanguage,
}

/// Where a fence carries its language hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FenceLanguage {
    None,
    /// Directly after the opening delimiter (```` ```rust ````).
    Suffix,
    /// As a quoted attribute on the opening line (`{{{code: lang="rust"`).
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSyntax {
    /// Followed by `type:` and the attribute list on the same line.
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QuoteSyntax {
    /// Any indented line that is not a list item.
    Indent,
    /// Lines starting with a prefix such as `>`.
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSyntax {
    pub marker: char,
    pub min: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Bold,
    Italic,
    Strikethrough,
    Highlight,
    Subscript,
    Superscript,
    /// Inline verbatim; its content is never parsed.
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanSyntax {
    pub kind: SpanKind,
    pub open: String,
    pub close: String,
}

impl SpanSyntax {
    pub fn new(kind: SpanKind, open: &str, close: &str) -> Self {
        SpanSyntax {
            kind,
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

/// Which opener wins when several span delimiters match at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmphasisPrecedence {
    /// Try the longest opening delimiter first (`**` before `*`).
    LongestDelimiterFirst,
    /// Try delimiters in the order the dialect declares them.
    DeclarationOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSyntax {
    /// `[[target]]` and `[[target|label]]`
    pub wiki: bool,
    /// `[label](target)`
    pub inline: bool,
    /// Form used when writing a link with a label.
    pub labelled: LabelledLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelledLink {
    WikiPipe,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageSyntax {
    /// `{{src?width=10|alt}}`
    Braces,
    /// `![alt](src?width=10)`
    Bang,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorSyntax {
    pub open: String,
    pub close: String,
}
