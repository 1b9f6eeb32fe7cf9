//! text.rs - Final pass over the text between tags.

use super::entities::{validate_entities, EntityMode};
use super::FilterContext;

/// Validates entities and escapes quotes in every run of text outside tags.
///
/// Tags (`<` through the next `>`) are copied verbatim: they were already
/// rendered by the classifier. A `<` with no `>` after it cannot be a tag and is
/// escaped as text.
pub fn cleanup_non_tags(input: &str, ctx: &mut FilterContext<'_>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while !rest.is_empty() {
        match rest.find('<') {
            Some(0) => match rest.find('>') {
                Some(close) => {
                    out.push_str(&rest[..=close]);
                    rest = &rest[close + 1..];
                }
                None => {
                    out.push_str("&lt;");
                    rest = &rest[1..];
                }
            },
            Some(lt) => {
                out.push_str(&validate_entities(&rest[..lt], EntityMode::Text, ctx));
                rest = &rest[lt..];
            }
            None => {
                out.push_str(&validate_entities(rest, EntityMode::Text, ctx));
                rest = "";
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterPolicy;
    use crate::sanitizers::compiler::CompiledPolicy;

    fn cleanup(input: &str) -> String {
        let policy = FilterPolicy::default().with_entity("amp").with_entity("lt");
        let compiled = CompiledPolicy::compile(&policy);
        let mut ctx = FilterContext::new(&compiled);
        cleanup_non_tags(input, &mut ctx)
    }

    #[test]
    fn test_text_is_validated_and_tags_are_not() {
        assert_eq!(
            cleanup(r#"a & "b"<a href="x&y">c &lt; d</a>&copy;"#),
            r#"a &amp; &quot;b&quot;<a href="x&y">c &lt; d</a>&amp;copy;"#
        );
    }

    #[test]
    fn test_stray_open_bracket_is_escaped() {
        assert_eq!(cleanup("x<b>y</b><"), "x<b>y</b>&lt;");
    }

    #[test]
    fn test_plain_and_empty_input() {
        assert_eq!(cleanup(""), "");
        assert_eq!(cleanup("plain text"), "plain text");
    }
}
