//! Minimal handling of the HTML fragments found in episode summaries.
//!
//! Summaries arrive as pre-formatted rich text (`<p>`, `<b>`, `<i>`, entity
//! references). We never build a DOM; the fragment is split into tags and
//! the text runs between them, which is all highlighting and terminal
//! rendering need.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").unwrap());

/// A piece of a markup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// A tag, verbatim (`<p>`, `</b>`, `<span class="x">`, `<br/>`).
    Tag(&'a str),
    /// Raw text between tags; entity references are still encoded.
    Text(&'a str),
}

/// Split a fragment into tags and text runs, in order.
///
/// Concatenating the tokens reproduces the input exactly.
pub fn tokenize(markup: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for m in TAG.find_iter(markup) {
        if m.start() > last {
            tokens.push(Token::Text(&markup[last..m.start()]));
        }
        tokens.push(Token::Tag(m.as_str()));
        last = m.end();
    }

    if last < markup.len() {
        tokens.push(Token::Text(&markup[last..]));
    }

    tokens
}

/// Name and kind of a tag: `("p", false)` for `<p>`, `("b", true)` for `</b>`.
pub fn tag_name(tag: &str) -> (String, bool) {
    let inner = tag.trim_start_matches('<').trim_end_matches('>').trim();
    let closing = inner.starts_with('/');
    let name = inner
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    (name, closing)
}

/// Value of the `class` attribute of a tag, if present.
pub fn tag_class(tag: &str) -> Option<&str> {
    let start = tag.find("class=")? + "class=".len();
    let rest = &tag[start..];
    let quote = rest.chars().next()?;
    if quote == '"' || quote == '\'' {
        let rest = &rest[1..];
        rest.find(quote).map(|end| &rest[..end])
    } else {
        rest.split(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .next()
    }
}

/// Escape text so it can be embedded in markup.
pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Decode entity references in a text run.
pub fn unescape(text: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(text)
}
