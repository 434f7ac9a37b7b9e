//! Textual cleanup of model output.
//!
//! Only wrapping artifacts are removed. The remainder is not parsed or
//! validated as HTML.

use std::sync::LazyLock;

use regex::Regex;

/// Opening fence at the very start, with an optional language tag.
static LEADING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A\s*```[ \t]*[a-z0-9+_-]*[ \t]*\r?\n?").unwrap_or_else(|e| panic!("invalid fence pattern: {e}"))
});

/// Any remaining fence marker, bare or tagged `html`.
static ANY_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[ \t]*```(?:html)?[ \t]*\r?\n?").unwrap_or_else(|e| panic!("invalid fence pattern: {e}"))
});

/// Strip fenced-code markers and surrounding whitespace.
///
/// Idempotent: sanitizing already-clean output returns it unchanged.
pub fn sanitize_html(raw: &str) -> String {
    let mut text = LEADING_FENCE.replace(raw.trim(), "").into_owned();

    // removing a marker can join the backticks around it into a new one
    while ANY_FENCE.is_match(&text) {
        text = ANY_FENCE.replace_all(&text, "").into_owned();
    }

    text.trim().to_string()
}
