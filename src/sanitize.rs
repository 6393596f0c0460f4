//! Markup transforms applied to raw post content before it is placed on a
//! page. Both transforms are total: malformed markup is passed through rather
//! than rejected.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").unwrap());
static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a\s*>").unwrap());

/// Removes every tag from `html`, leaving only the text content. Entities are
/// left as they are. A lone `<` that never closes is kept as text.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Removes `<a>` wrappers from `html` while keeping whatever markup or text
/// they wrapped.
pub fn unwrap_links(html: &str) -> String {
    ANCHOR.replace_all(html, "$1").into_owned()
}

/// Truncates `text` to at most `max_chars` characters, appending `...` when
/// anything was cut off.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_owned(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

/// Builds the plain-text snippet shown on post cards: the markup-free text of
/// `html`, trimmed and truncated to `max_chars`.
pub fn snippet(html: &str, max_chars: usize) -> String {
    truncate(strip_tags(html).trim(), max_chars)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_tags_removes_all_elements() {
        assert_eq!(
            "Hello bold world",
            strip_tags(r#"<div class="x"><p>Hello <b>bold</b> world</p></div>"#)
        );
    }

    #[test]
    fn test_strip_tags_keeps_unclosed_angle() {
        assert_eq!("1 < 2 and text", strip_tags("1 < 2 <i>and</i> text"));
    }

    #[test]
    fn test_unwrap_links_preserves_inner_markup() {
        assert_eq!(
            "<p>see <em>this</em> and that</p>",
            unwrap_links(r#"<p>see <a href="/x"><em>this</em></a> and <A HREF='y'>that</A></p>"#)
        );
    }

    #[test]
    fn test_unwrap_links_spans_lines() {
        assert_eq!("one\ntwo", unwrap_links("<a href=\"#\">one\ntwo</a>"));
    }

    #[test]
    fn test_unwrap_links_ignores_other_a_elements() {
        let html = "<abbr title=\"x\">X</abbr><article>body</article>";
        assert_eq!(html, unwrap_links(html));
    }

    #[test]
    fn test_truncate() {
        assert_eq!("abc", truncate("abc", 3));
        assert_eq!("ab...", truncate("abc", 2));
        assert_eq!("ké...", truncate("kéé", 2));
    }

    #[test]
    fn test_snippet() {
        assert_eq!("Hello...", snippet("  <p>Hello world</p>", 5));
    }
}
