//! URL recognition shared by the inline tokenizer and the serializers.
//!
//! Bare URLs follow the GitHub Flavored Markdown autolink extension, with two
//! differences: any `scheme://` prefix is accepted and `file:/` URIs are
//! matched as well. See <https://github.github.com/gfm/#autolinks-extension->.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"(?P<url>(?:www\.|https?://|\w+://)(?P<domain>(?:[\w\-]+\.)+[\w\-]+)[^\s<]*)",
        r"|(?P<email>(?:mailto:)?[\w.\-+]+@(?:[\w\-]+\.)+[\w\-]+)",
        r"|(?P<fileuri>file:/+[^\s\x22<>']+)",
        r")",
    ))
    .expect("valid url regex")
});

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&\w+;$").expect("valid entity regex"));

const TRAILING_PUNCTUATION: &[char] = &['?', '!', '.', ',', ':', '*', '_', '~'];

/// Match a URL at the start of `text`, returning the matched prefix with
/// trailing punctuation removed.
pub fn match_url(text: &str) -> Option<&str> {
    let caps = URL_RE.captures(text)?;
    let whole = caps.get(0)?.as_str();

    if caps.name("email").is_some() {
        let mut url = whole;
        loop {
            if let Some(stripped) = url.strip_suffix('.') {
                url = stripped;
            } else if url.ends_with('-') || url.ends_with('_') {
                return None;
            } else {
                break;
            }
        }
        return (!url.is_empty()).then_some(url);
    }

    if let Some(domain) = caps.name("domain") {
        let sections: Vec<&str> = domain.as_str().split('.').collect();
        if sections.iter().rev().take(2).any(|s| s.contains('_')) {
            return None;
        }
    }

    let mut url = whole;
    while let Some(last) = url.chars().last() {
        if TRAILING_PUNCTUATION.contains(&last)
            || (last == ')' && url.matches(')').count() > url.matches('(').count())
        {
            url = &url[..url.len() - last.len_utf8()];
        } else if last == ';' {
            match ENTITY_RE.find(url) {
                Some(entity) => url = &url[..entity.start()],
                None => url = &url[..url.len() - 1],
            }
        } else {
            return Some(url);
        }
    }
    None
}

/// Whether the whole of `text` is a URL (no trailing punctuation dropped).
pub fn is_url(text: &str) -> bool {
    match_url(text) == Some(text)
}

/// Whether `text` starts with a `scheme://` prefix or is a `mailto:` link.
///
/// Page paths use `:` as separator, so a bare `scheme:` is not enough.
pub fn has_url_scheme(text: &str) -> bool {
    if text.starts_with("mailto:") {
        return true;
    }
    match text.find("://") {
        Some(idx) if idx > 0 => text[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}
