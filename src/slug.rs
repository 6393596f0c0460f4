//! Turns titles and label names into tokens that are safe to use as file
//! names and URL path segments.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Lower-cases `input`, collapses every run of non-word characters into a
/// single `-`, and trims `-` from both ends. Word characters are Unicode
/// letters, digits, and `_`, so `Café_au_lait` becomes `café_au_lait`.
///
/// The result can be empty (e.g., for `"!!!"`); callers that use the token as
/// a file name must handle that case themselves.
pub fn slugify(input: &str) -> String {
    NON_WORD
        .replace_all(&input.to_lowercase(), "-")
        .trim_matches('-')
        .to_owned()
}
