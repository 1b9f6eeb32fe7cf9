//! protocol.rs - URL scheme enforcement for link-bearing attributes.

use super::entities::{validate_entities, EntityMode};
use super::FilterContext;
use crate::report::{log_filter_action_debug, FilterAction};

/// Decodes and validates `value`, then neutralizes a disallowed scheme.
///
/// The scheme is everything before the first `:` and must be non-empty. A
/// disallowed scheme and its colon are replaced by `#`, so
/// `javascript:alert(1)` becomes `#alert(1)`. Values without a scheme, such
/// as relative links, pass through. A value starting with `#` is a fragment
/// and never has a scheme, so a neutralized value is left alone next time.
pub fn check_protocol(value: &str, ctx: &mut FilterContext<'_>) -> String {
    let decoded = validate_entities(value, EntityMode::Attribute, ctx);
    if decoded.starts_with('#') {
        return decoded;
    }

    match decoded.find(':') {
        Some(colon) if colon > 0 && !ctx.policy.is_allowed_protocol(&decoded[..colon]) => {
            log_filter_action_debug(module_path!(), FilterAction::NeutralizedProtocol, &decoded[..colon]);
            ctx.record(FilterAction::NeutralizedProtocol);
            format!("#{}", &decoded[colon + 1..])
        }
        _ => decoded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterPolicy;
    use crate::sanitizers::compiler::CompiledPolicy;

    fn check(value: &str) -> String {
        let policy = FilterPolicy::default()
            .with_protocol("http")
            .with_protocol("mailto")
            .with_entity("amp");
        let compiled = CompiledPolicy::compile(&policy);
        let mut ctx = FilterContext::new(&compiled);
        check_protocol(value, &mut ctx)
    }

    #[test]
    fn test_allowed_schemes_pass() {
        assert_eq!(check("http://example.com/?a=1&amp;b=2"), "http://example.com/?a=1&amp;b=2");
        assert_eq!(check("HTTP://example.com/"), "HTTP://example.com/");
        assert_eq!(check("mailto:someone@example.com"), "mailto:someone@example.com");
    }

    #[test]
    fn test_disallowed_scheme_is_neutralized() {
        assert_eq!(check("javascript:alert(1)"), "#alert(1)");
        assert_eq!(check("https://example.com/"), "#//example.com/");
    }

    #[test]
    fn test_neutralized_value_is_stable() {
        let once = check("javascript:javascript:alert(1)");
        assert_eq!(once, "#javascript:alert(1)");
        assert_eq!(check(&once), once);
        assert_eq!(check("#top:section"), "#top:section");
    }

    #[test]
    fn test_obfuscated_scheme_is_decoded_first() {
        assert_eq!(check("&#106;avascript:alert(1)"), "#alert(1)");
        assert_eq!(check("javascript&#x3a;alert(1)"), "#alert(1)");
        assert_eq!(check("javascript%3Aalert(1)"), "#alert(1)");
    }

    #[test]
    fn test_values_without_scheme_are_unchanged() {
        assert_eq!(check("/relative/path"), "/relative/path");
        assert_eq!(check(":leading-colon"), ":leading-colon");
        assert_eq!(check(""), "");
    }
}
