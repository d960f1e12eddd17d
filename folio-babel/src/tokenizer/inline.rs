//! Inline tokenizer
//!
//! Second pass over the text of a single block. Produces a flat token stream
//! in which every [`InlineToken::Open`] has a matching [`InlineToken::Close`].
//!
//! Spans are matched by recursive descent: an opener starts a frame that
//! scans forward for its own closer. A frame that reaches the end of the
//! text without a closer fails, and its opener is emitted as literal text.
//! Frame results are memoized per (position, kind, depth) so failing openers
//! do not make the scan exponential.
//!
//! At each position the scanner tries, in order:
//! 1. an escaped ASCII punctuation character, which is literal text
//! 2. the closer of the current frame (right-flanking, non-empty content)
//! 3. inline code (raw until the first closer)
//! 4. atoms: anchor, image, wiki link, inline link, bare URL, tag
//! 5. span openers (left-flanking), ordered by the dialect's precedence
//! 6. a literal character
//!
//! Code, link targets and image sources are raw: escapes are not read there.

use crate::common::links::match_url;
use crate::dialect::{Dialect, EmphasisPrecedence, ImageSyntax, SpanKind, SpanSyntax, Syntax};
use crate::ir::nodes::Image;
use serde::Serialize;
use std::collections::HashMap;

/// Spans nested deeper than this are read as literal text.
const MAX_NESTING: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InlineToken {
    Text(String),
    Open(SpanKind),
    Close(SpanKind),
    Code(String),
    Link {
        target: String,
        label: Option<String>,
    },
    Image(Image),
    Anchor(String),
    Tag(String),
}

/// Tokenize the inline content of one block.
pub fn tokenize_inline(text: &str, dialect: &Dialect) -> Vec<InlineToken> {
    let mut scanner = Scanner::new(text, dialect.syntax());
    let mut out = Vec::new();
    scanner.scan(0, None, 0, &mut out);
    out
}

type Frame = Option<(usize, Vec<InlineToken>)>;

struct Scanner<'a> {
    src: &'a str,
    syntax: &'a Syntax,
    code: Option<&'a SpanSyntax>,
    openers: Vec<&'a SpanSyntax>,
    memo: HashMap<(usize, SpanKind, usize), Frame>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, syntax: &'a Syntax) -> Self {
        let mut openers: Vec<&SpanSyntax> = syntax
            .spans
            .iter()
            .filter(|span| span.kind != SpanKind::Code)
            .collect();
        if syntax.precedence == EmphasisPrecedence::LongestDelimiterFirst {
            // Stable, so equal lengths keep declaration order.
            openers.sort_by(|a, b| b.open.len().cmp(&a.open.len()));
        }
        Scanner {
            src,
            syntax,
            code: syntax.span(SpanKind::Code),
            openers,
            memo: HashMap::new(),
        }
    }

    /// Scan from `start`. With a closer, returns the position after it, or
    /// `None` when the text ends first. Without one, scans to the end.
    fn scan(
        &mut self,
        start: usize,
        closer: Option<&'a SpanSyntax>,
        depth: usize,
        out: &mut Vec<InlineToken>,
    ) -> Option<usize> {
        let src = self.src;
        let mut pos = start;
        while pos < src.len() {
            let rest = &src[pos..];

            if let Some(len) = self.match_escape(rest) {
                push_text(out, &rest[len..len + 1]);
                pos += len + 1;
                continue;
            }

            if let Some(span) = closer {
                let flanking = !self.prev_char(pos).is_some_and(char::is_whitespace);
                if pos > start && flanking && rest.starts_with(span.close.as_str()) {
                    return Some(pos + span.close.len());
                }
            }

            if let Some((token, len)) = self.match_code(rest) {
                push_token(out, token);
                pos += len;
                continue;
            }

            if let Some((token, len)) = self.match_atom(pos) {
                push_token(out, token);
                pos += len;
                continue;
            }

            if depth < MAX_NESTING {
                if let Some((tokens, end)) = self.match_span(pos, depth) {
                    for token in tokens {
                        push_token(out, token);
                    }
                    pos = end;
                    continue;
                }
            }

            let c = rest.chars().next().unwrap_or_default();
            push_text(out, &rest[..c.len_utf8()]);
            pos += c.len_utf8();
        }
        match closer {
            Some(_) => None,
            None => Some(pos),
        }
    }

    /// Length of the escape character when it precedes ASCII punctuation.
    fn match_escape(&self, rest: &str) -> Option<usize> {
        let escape = self.syntax.escape?;
        let mut chars = rest.chars();
        if chars.next()? != escape {
            return None;
        }
        chars
            .next()
            .filter(char::is_ascii_punctuation)
            .map(|_| escape.len_utf8())
    }

    fn match_span(&mut self, pos: usize, depth: usize) -> Option<(Vec<InlineToken>, usize)> {
        for i in 0..self.openers.len() {
            let span = self.openers[i];
            if !self.src[pos..].starts_with(span.open.as_str()) {
                continue;
            }
            let after = pos + span.open.len();
            let left_flanking = self.src[after..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace());
            if !left_flanking {
                continue;
            }
            if let Some((end, inner)) = self.frame(after, span, depth + 1) {
                let mut tokens = Vec::with_capacity(inner.len() + 2);
                tokens.push(InlineToken::Open(span.kind));
                tokens.extend(inner);
                tokens.push(InlineToken::Close(span.kind));
                return Some((tokens, end));
            }
        }
        None
    }

    fn frame(&mut self, start: usize, span: &'a SpanSyntax, depth: usize) -> Frame {
        let key = (start, span.kind, depth);
        if let Some(cached) = self.memo.get(&key) {
            return cached.clone();
        }
        let mut tokens = Vec::new();
        let result = self
            .scan(start, Some(span), depth, &mut tokens)
            .map(|end| (end, tokens));
        self.memo.insert(key, result.clone());
        result
    }

    fn match_code(&self, rest: &str) -> Option<(InlineToken, usize)> {
        let code = self.code?;
        let after_open = rest.strip_prefix(code.open.as_str())?;
        match after_open.find(code.close.as_str()) {
            Some(end) if end > 0 => Some((
                InlineToken::Code(after_open[..end].to_string()),
                code.open.len() + end + code.close.len(),
            )),
            _ => Some((InlineToken::Text(code.open.clone()), code.open.len())),
        }
    }

    fn match_atom(&self, pos: usize) -> Option<(InlineToken, usize)> {
        let rest = &self.src[pos..];
        let syntax = self.syntax;

        if let Some(atom) = self.match_anchor(rest) {
            return Some(atom);
        }
        let image = match syntax.image {
            ImageSyntax::Braces => match_brace_image(rest),
            ImageSyntax::Bang => match_bang_image(rest),
        };
        if image.is_some() {
            return image;
        }
        if syntax.links.wiki {
            if let Some(atom) = match_wiki_link(rest) {
                return Some(atom);
            }
        }
        if syntax.links.inline {
            if let Some(atom) = match_inline_link(rest) {
                return Some(atom);
            }
        }
        if let Some(atom) = self.match_bare_url(pos) {
            return Some(atom);
        }
        self.match_tag(pos)
    }

    fn match_anchor(&self, rest: &str) -> Option<(InlineToken, usize)> {
        let anchor = &self.syntax.anchor;
        let body = rest.strip_prefix(anchor.open.as_str())?;
        let end = body.find(anchor.close.as_str())?;
        let name = &body[..end];
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        Some((
            InlineToken::Anchor(name.to_string()),
            anchor.open.len() + end + anchor.close.len(),
        ))
    }

    fn match_bare_url(&self, pos: usize) -> Option<(InlineToken, usize)> {
        let starts_word = self.src[pos..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        let after_word = self.prev_char(pos).is_some_and(is_word_char);
        if !starts_word || after_word {
            return None;
        }
        let url = match_url(&self.src[pos..])?;
        Some((
            InlineToken::Link {
                target: url.to_string(),
                label: None,
            },
            url.len(),
        ))
    }

    fn match_tag(&self, pos: usize) -> Option<(InlineToken, usize)> {
        let prefix = self.syntax.tag_prefix;
        let body = self.src[pos..].strip_prefix(prefix)?;
        if self.prev_char(pos).is_some_and(|c| !c.is_whitespace()) {
            return None;
        }
        let len: usize = body
            .chars()
            .take_while(|&c| is_word_char(c))
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            return None;
        }
        Some((
            InlineToken::Tag(body[..len].to_string()),
            prefix.len_utf8() + len,
        ))
    }

    fn prev_char(&self, pos: usize) -> Option<char> {
        self.src[..pos].chars().next_back()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn push_text(out: &mut Vec<InlineToken>, text: &str) {
    match out.last_mut() {
        Some(InlineToken::Text(last)) => last.push_str(text),
        _ => out.push(InlineToken::Text(text.to_string())),
    }
}

fn push_token(out: &mut Vec<InlineToken>, token: InlineToken) {
    match token {
        InlineToken::Text(text) => push_text(out, &text),
        other => out.push(other),
    }
}

/// `[[target]]` or `[[target|label]]`
fn match_wiki_link(rest: &str) -> Option<(InlineToken, usize)> {
    let body = rest.strip_prefix("[[")?;
    let end = body.find("]]")?;
    let inner = &body[..end];
    if inner.contains('\n') {
        return None;
    }
    let (target, label) = match inner.split_once('|') {
        Some((target, label)) => (target.trim(), Some(label.trim())),
        None => (inner.trim(), None),
    };
    if target.is_empty() {
        return None;
    }
    Some((
        InlineToken::Link {
            target: target.to_string(),
            label: label.filter(|l| !l.is_empty()).map(str::to_string),
        },
        end + 4,
    ))
}

/// `[label](target)`
fn match_inline_link(rest: &str) -> Option<(InlineToken, usize)> {
    let body = rest.strip_prefix('[')?;
    let label_end = body.find(']')?;
    let label = &body[..label_end];
    if label.contains(['[', '\n']) {
        return None;
    }
    let after = body[label_end + 1..].strip_prefix('(')?;
    let target_end = balanced_paren_end(after)?;
    let target = after[..target_end].trim();
    if target.is_empty() {
        return None;
    }
    let label = label.trim();
    Some((
        InlineToken::Link {
            target: target.to_string(),
            label: (!label.is_empty()).then(|| label.to_string()),
        },
        1 + label_end + 2 + target_end + 1,
    ))
}

/// `{{src?width=10&height=5|alt}}`
fn match_brace_image(rest: &str) -> Option<(InlineToken, usize)> {
    let body = rest.strip_prefix("{{")?;
    if body.starts_with('{') {
        return None;
    }
    let end = body.find("}}")?;
    let inner = &body[..end];
    let (source, alt) = match inner.split_once('|') {
        Some((source, alt)) => (source, Some(alt)),
        None => (inner, None),
    };
    let image = build_image(source, alt)?;
    Some((InlineToken::Image(image), end + 4))
}

/// `![alt](src?width=10)`
fn match_bang_image(rest: &str) -> Option<(InlineToken, usize)> {
    let body = rest.strip_prefix("![")?;
    let alt_end = body.find("](")?;
    let alt = &body[..alt_end];
    if alt.contains('\n') {
        return None;
    }
    let after = &body[alt_end + 2..];
    let src_end = balanced_paren_end(after)?;
    let image = build_image(&after[..src_end], Some(alt))?;
    Some((InlineToken::Image(image), 2 + alt_end + 2 + src_end + 1))
}

fn build_image(source: &str, alt: Option<&str>) -> Option<Image> {
    let source = source.trim();
    if source.is_empty() || source.contains(char::is_whitespace) {
        return None;
    }
    let (src, query) = match source.split_once('?') {
        Some((src, query)) => (src, Some(query)),
        None => (source, None),
    };
    let mut image = Image::new(src);
    image.alt = alt.map(str::trim).filter(|a| !a.is_empty()).map(str::to_string);
    let params = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter_map(|p| p.split_once('='));
    for (key, value) in params {
        match key {
            "width" => image.width = value.parse().ok(),
            "height" => image.height = value.parse().ok(),
            _ => {}
        }
    }
    Some(image)
}

/// Byte offset of the `)` closing an already opened parenthesis.
fn balanced_paren_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (pos, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(pos),
            ')' => depth -= 1,
            '\n' => return None,
            _ => {}
        }
    }
    None
}
