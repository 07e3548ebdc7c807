//! Identifier utilities: turning human titles into stable SQL names and quoting them.

use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{Alphabetic}\p{Nd}]+").expect("Hardcode regex pattern"));

/// Lowercases `value` and collapses every run of non-alphanumeric characters into a
/// single `_`. Leading and trailing separators are dropped, so a title made only of
/// punctuation slugs to the empty string.
pub(crate) fn slugify(value: &str) -> String {
    let lower = value.to_lowercase();
    SEPARATORS
        .replace_all(lower.as_str(), "_")
        .trim_matches('_')
        .to_owned()
}

/// Wraps an identifier in double quotes, doubling any embedded quote.
pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Wraps a text literal in single quotes, doubling any embedded quote.
pub(crate) fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
