//! Search-term highlighting for card markup.

use crate::markup::{self, Token};
use log::warn;
use regex::RegexBuilder;

/// Opening marker wrapped around every match.
pub const HIGHLIGHT_OPEN: &str = "<span class=\"highlight\">";
/// Closing marker wrapped around every match.
pub const HIGHLIGHT_CLOSE: &str = "</span>";
/// Class carried by the opening marker.
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Wrap every case-insensitive occurrence of `term` in a highlight marker.
///
/// Only text runs between tags are rewritten, so tags and their attributes
/// are never split, and matches are found on the decoded text so entity
/// references are never cut in half. With an empty (or all-whitespace)
/// term the input comes back unchanged.
///
/// # Examples
///
/// ```
/// use episode_browser::highlight::highlight;
///
/// assert_eq!(
///     highlight("<p>Chemistry class</p>", "chem"),
///     "<p><span class=\"highlight\">Chem</span>istry class</p>"
/// );
/// assert_eq!(highlight("<p>Untouched</p>", ""), "<p>Untouched</p>");
/// ```
pub fn highlight(markup: &str, term: &str) -> String {
    let term = term.trim();
    if term.is_empty() {
        return markup.to_string();
    }

    let pattern = match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!("Cannot highlight '{}': {}", term, e);
            return markup.to_string();
        }
    };

    let mut out = String::with_capacity(markup.len() + 32);

    for token in markup::tokenize(markup) {
        match token {
            Token::Tag(tag) => out.push_str(tag),
            Token::Text(raw) => {
                let decoded = markup::unescape(raw);
                if !pattern.is_match(&decoded) {
                    out.push_str(raw);
                    continue;
                }

                let mut last = 0;
                for m in pattern.find_iter(&decoded) {
                    out.push_str(&markup::escape(&decoded[last..m.start()]));
                    out.push_str(HIGHLIGHT_OPEN);
                    out.push_str(&markup::escape(m.as_str()));
                    out.push_str(HIGHLIGHT_CLOSE);
                    last = m.end();
                }
                out.push_str(&markup::escape(&decoded[last..]));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_term_is_identity() {
        let input = "<p>A &amp; B <i>weird</i>  spacing </p>";
        assert_eq!(highlight(input, ""), input);
        assert_eq!(highlight(input, "   "), input);
    }

    #[test]
    fn test_highlights_every_occurrence_case_insensitively() {
        assert_eq!(
            highlight("Pilot pilot PILOT", "pilot"),
            "<span class=\"highlight\">Pilot</span> <span class=\"highlight\">pilot</span> \
             <span class=\"highlight\">PILOT</span>"
        );
    }

    #[test]
    fn test_term_is_trimmed() {
        assert_eq!(
            highlight("Pilot", "  pil "),
            "<span class=\"highlight\">Pil</span>ot"
        );
    }

    #[test]
    fn test_tags_are_not_matched() {
        // "p" occurs in the tag names but only the text is wrapped
        let out = highlight("<p>Ape</p>", "p");
        assert_eq!(out, "<p>A<span class=\"highlight\">p</span>e</p>");
    }

    #[test]
    fn test_attribute_values_are_not_matched() {
        let input = "<a href=\"chemistry.html\">lab</a>";
        assert_eq!(highlight(input, "chemistry"), input);
    }

    #[test]
    fn test_nested_markup_stays_balanced() {
        let out = highlight("<p>The <b>teacher</b> teaches</p>", "teach");
        assert_eq!(
            out,
            "<p>The <b><span class=\"highlight\">teach</span>er</b> \
             <span class=\"highlight\">teach</span>es</p>"
        );
    }

    #[test]
    fn test_entities_are_not_split() {
        // searching "amp" must not break the &amp; reference
        let out = highlight("Salt &amp; pepper, ample", "amp");
        assert_eq!(out, "Salt &amp; pepper, <span class=\"highlight\">amp</span>le");

        let out = highlight("Salt &amp; pepper", "&");
        assert_eq!(out, "Salt <span class=\"highlight\">&amp;</span> pepper");
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert_eq!(highlight("What? Why.", "."), "What? Why<span class=\"highlight\">.</span>");
        assert_eq!(highlight("a+b", "+"), "a<span class=\"highlight\">+</span>b");
        assert_eq!(highlight("(x)", "(x"), "<span class=\"highlight\">(x</span>)");
    }

    #[test]
    fn test_reapplying_to_original_text_is_stable() {
        let original = "<p>Chemistry teacher</p>";
        assert_eq!(highlight(original, "chem"), highlight(original, "chem"));
    }

    #[test]
    fn test_matches_span_decoded_accents() {
        assert_eq!(
            highlight("<p>Caf&eacute; latte</p>", "CAFÉ"),
            "<p><span class=\"highlight\">Café</span> latte</p>"
        );
        assert_eq!(
            highlight("<p>d&eacute;j&agrave; vu</p>", "éj"),
            "<p>d<span class=\"highlight\">éj</span>à vu</p>"
        );
    }

    #[test]
    fn test_unmatched_runs_are_untouched() {
        let input = "<p>caf&eacute; &amp; more</p>";
        assert_eq!(highlight(input, "zzz"), input);
    }
}
