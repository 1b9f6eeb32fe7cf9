//! comments.rs - Neutralizes markup hidden inside comment bodies.
//!
//! Runs before anything else so that `<!-- <script> -->` cannot be picked
//! apart by the bracket balancer. Whether the comment survives at all is
//! decided later by the classifier.

use super::entities::{validate_entities, EntityMode};
use super::scan::replace_matches;
use super::FilterContext;

const OPEN: &str = "<!--";
const CLOSE: &str = "-->";

/// HTML-escapes the interior of every complete `<!-- ... -->` span. The
/// delimiters are kept verbatim. A comment ends at the first `-->`.
pub fn escape_comments(input: &str, ctx: &mut FilterContext<'_>) -> String {
    replace_matches(input, b'<', |s, i| {
        if !s[i..].starts_with(OPEN) {
            return None;
        }
        let body_start = i + OPEN.len();
        let body_end = body_start + s[body_start..].find(CLOSE)?;
        let escaped = escape_comment_body(&s[body_start..body_end], ctx);
        Some((body_end + CLOSE.len(), format!("{}{}{}", OPEN, escaped, CLOSE)))
    })
}

/// Escapes `<`, `>` and `'` in a comment body, then runs the text-mode entity
/// check, which escapes `"` and every `&` not starting an allowed reference.
/// Applying it to its own output changes nothing.
pub(crate) fn escape_comment_body(body: &str, ctx: &mut FilterContext<'_>) -> String {
    let mut escaped = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    validate_entities(&escaped, EntityMode::Text, ctx)
}
