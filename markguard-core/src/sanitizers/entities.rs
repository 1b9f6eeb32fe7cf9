//! entities.rs - Character-reference decoding and validation.
//!
//! Every ampersand that leaves the filter either starts a valid,
//! semicolon-terminated reference allowed by the policy, or is escaped to
//! `&amp;`. Inside URL attributes, numeric references and percent escapes are
//! decoded first so `&#106;avascript:` cannot slip past the protocol check.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;

use log::trace;

use super::scan::replace_matches;
use super::FilterContext;
use crate::report::FilterAction;

/// Where the text being validated lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityMode {
    /// A URL-bearing attribute value: always decode, including `%HH`.
    Attribute,
    /// Ordinary text or a non-URL attribute value: decode only when the policy
    /// asks for ASCII normalization, and never touch `%HH`.
    Text,
}

/// HTML-escapes one of the five characters that matter in markup.
fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#039;"),
        other => out.push(other),
    }
}

/// Parses a run of digits, saturating instead of overflowing.
fn parse_saturating(digits: &str, radix: u32) -> u64 {
    digits.chars().fold(0u64, |acc, c| {
        let digit = c.to_digit(radix).map_or(0, u64::from);
        acc.saturating_mul(u64::from(radix)).saturating_add(digit)
    })
}

/// Renders one decoded code point. ASCII becomes the literal (escaped)
/// character; anything higher is re-encoded canonically instead of emitted raw.
fn decode_code_point(prefix: u8, value: u64) -> String {
    // NUL has no business in markup; treat it like any other invalid value.
    let value = if value == 0 { u64::from(b' ') } else { value };

    if value > 127 {
        return match prefix {
            b'%' => format!("%{:x}", value),
            _ => format!("&#{};", value),
        };
    }
    // A bare `%` would start a new escape on the next pass.
    if prefix == b'%' && value == u64::from(b'%') {
        return "%25".to_string();
    }

    let mut out = String::with_capacity(6);
    push_escaped(&mut out, char::from(value as u8));
    out
}

/// Length of the run at the start of `bytes` accepted by `pred`.
fn run_len(bytes: &[u8], pred: fn(&u8) -> bool) -> usize {
    bytes.iter().take_while(|b| pred(b)).count()
}

/// End offset after an optional `;` at `pos`.
fn skip_semicolon(input: &str, pos: usize) -> usize {
    if input.as_bytes().get(pos) == Some(&b';') {
        pos + 1
    } else {
        pos
    }
}

/// Decodes `&#DDD;`, `&#xHHH;` and, when `in_attribute`, `%HH` escapes. The
/// semicolon is optional. Passes run in that order over the whole string.
pub fn decode_entities(input: &str, in_attribute: bool, ctx: &mut FilterContext<'_>) -> String {
    let decimal = replace_matches(input, b'&', |s, i| {
        let bytes = s.as_bytes();
        if bytes.get(i + 1) != Some(&b'#') {
            return None;
        }
        let digits = run_len(&bytes[i + 2..], u8::is_ascii_digit);
        if digits == 0 {
            return None;
        }
        let value = parse_saturating(&s[i + 2..i + 2 + digits], 10);
        ctx.record(FilterAction::DecodedReference);
        Some((skip_semicolon(s, i + 2 + digits), decode_code_point(b'&', value)))
    });

    let hex = replace_matches(&decimal, b'&', |s, i| {
        let bytes = s.as_bytes();
        if bytes.get(i + 1) != Some(&b'#') || !matches!(bytes.get(i + 2), Some(b'x' | b'X')) {
            return None;
        }
        let digits = run_len(&bytes[i + 3..], u8::is_ascii_hexdigit);
        if digits == 0 {
            return None;
        }
        let value = parse_saturating(&s[i + 3..i + 3 + digits], 16);
        ctx.record(FilterAction::DecodedReference);
        Some((skip_semicolon(s, i + 3 + digits), decode_code_point(b'&', value)))
    });

    if !in_attribute {
        return hex;
    }

    replace_matches(&hex, b'%', |s, i| {
        let bytes = s.as_bytes();
        if bytes.len() < i + 3 || !bytes[i + 1].is_ascii_hexdigit() || !bytes[i + 2].is_ascii_hexdigit() {
            return None;
        }
        let value = parse_saturating(&s[i + 1..i + 3], 16);
        ctx.record(FilterAction::DecodedReference);
        Some((skip_semicolon(s, i + 3), decode_code_point(b'%', value)))
    })
}

/// Whether the body of a reference (the text between `&` and `;`) is allowed.
pub fn is_valid_entity(body: &str, ctx: &FilterContext<'_>) -> bool {
    let numeric = |digits: &str, radix: u32| {
        parse_saturating(digits, radix) > 127 || ctx.policy.allow_numbered_entities
    };

    if let Some(number) = body.strip_prefix('#') {
        if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
            return numeric(number, 10);
        }
        if let Some(hex) = number.strip_prefix(['x', 'X']) {
            if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return numeric(hex, 16);
            }
        }
        return false;
    }

    ctx.policy.is_allowed_entity(body)
}

/// Makes every ampersand in `input` safe, then escapes double quotes.
///
/// Each `&` is checked against the text up to the next `;`, `&` or end of
/// input. Unterminated or disallowed references get their `&` escaped; the
/// body text itself is kept as-is.
pub fn validate_entities(input: &str, mode: EntityMode, ctx: &mut FilterContext<'_>) -> String {
    let decoded: Cow<'_, str> = if mode == EntityMode::Attribute || ctx.policy.normalize_ascii_entities {
        Cow::Owned(decode_entities(input, mode == EntityMode::Attribute, ctx))
    } else {
        Cow::Borrowed(input)
    };

    let checked = replace_matches(&decoded, b'&', |s, i| {
        let body_start = i + 1;
        let end = s[body_start..]
            .find([';', '&'])
            .map_or(s.len(), |offset| body_start + offset);
        let body = &s[body_start..end];
        let terminated = s.as_bytes().get(end) == Some(&b';');

        if terminated && is_valid_entity(body, ctx) {
            Some((end, format!("&{}", body)))
        } else {
            trace!("Escaping ampersand before {} body bytes", body.len());
            ctx.record(FilterAction::EscapedEntity);
            Some((end, format!("&amp;{}", body)))
        }
    });

    checked.replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterPolicy;
    use crate::sanitizers::compiler::CompiledPolicy;

    fn policy(numbered: bool, normalize: bool) -> CompiledPolicy {
        let mut p = FilterPolicy::default().with_entity("amp").with_entity("lt").with_entity("quot");
        p.allow_numbered_entities = numbered;
        p.normalize_ascii_entities = normalize;
        CompiledPolicy::compile(&p)
    }

    fn validate(input: &str, mode: EntityMode, policy: &CompiledPolicy) -> String {
        let mut ctx = FilterContext::new(policy);
        validate_entities(input, mode, &mut ctx)
    }

    #[test]
    fn test_unknown_named_entity_is_escaped() {
        let p = policy(true, false);
        assert_eq!(validate("&foo;", EntityMode::Text, &p), "&amp;foo;");
        assert_eq!(validate("&amp;", EntityMode::Text, &p), "&amp;");
        assert_eq!(validate("&AMP;", EntityMode::Text, &p), "&amp;AMP;");
    }

    #[test]
    fn test_unterminated_ampersands_are_escaped() {
        let p = policy(true, false);
        assert_eq!(validate("fish & chips", EntityMode::Text, &p), "fish &amp; chips");
        assert_eq!(validate("a&&b", EntityMode::Text, &p), "a&amp;&amp;b");
        assert_eq!(validate("&lt", EntityMode::Text, &p), "&amp;lt");
        assert_eq!(validate("&;", EntityMode::Text, &p), "&amp;;");
    }

    #[test]
    fn test_numbered_entities_follow_policy() {
        let allowed = policy(true, false);
        let denied = policy(false, false);
        assert_eq!(validate("&#65;", EntityMode::Text, &allowed), "&#65;");
        assert_eq!(validate("&#65;", EntityMode::Text, &denied), "&amp;#65;");
        assert_eq!(validate("&#x41;", EntityMode::Text, &denied), "&amp;#x41;");
        // Above ASCII is always allowed.
        assert_eq!(validate("&#233;", EntityMode::Text, &denied), "&#233;");
        assert_eq!(validate("&#XE9;", EntityMode::Text, &denied), "&#XE9;");
        assert_eq!(validate("&#x;", EntityMode::Text, &allowed), "&amp;#x;");
    }

    #[test]
    fn test_quotes_are_always_escaped() {
        let p = policy(true, false);
        assert_eq!(validate(r#"say "hi""#, EntityMode::Text, &p), "say &quot;hi&quot;");
    }

    #[test]
    fn test_attribute_mode_decodes_obfuscation() {
        let p = policy(true, false);
        assert_eq!(validate("&#106;avascript&#x3A;", EntityMode::Attribute, &p), "javascript:");
        assert_eq!(validate("java%73cript%3a", EntityMode::Attribute, &p), "javascript:");
        assert_eq!(validate("&#60;b&#62;", EntityMode::Attribute, &p), "&lt;b&amp;gt;");
        assert_eq!(validate("&#34;", EntityMode::Attribute, &p), "&quot;");
    }

    #[test]
    fn test_high_code_points_are_reencoded_not_emitted_raw() {
        let p = policy(true, false);
        assert_eq!(validate("&#x00E9;", EntityMode::Attribute, &p), "&#233;");
        assert_eq!(validate("%E9", EntityMode::Attribute, &p), "%e9");
        assert_eq!(validate("&#99999999999999999999999;", EntityMode::Attribute, &p), format!("&#{};", u64::MAX));
    }

    #[test]
    fn test_escaped_percent_stays_escaped() {
        let p = policy(true, false);
        let once = validate("/x/%2526", EntityMode::Attribute, &p);
        assert_eq!(once, "/x/%2526");
        assert_eq!(validate(&once, EntityMode::Attribute, &p), once);
        assert_eq!(validate("100%25", EntityMode::Attribute, &p), "100%25");
    }

    #[test]
    fn test_nul_decodes_to_space() {
        let p = policy(true, false);
        assert_eq!(validate("a&#0;b", EntityMode::Attribute, &p), "a b");
        assert_eq!(validate("a%00b", EntityMode::Attribute, &p), "a b");
    }

    #[test]
    fn test_text_mode_decodes_only_when_normalizing() {
        let plain = policy(true, false);
        let normalizing = policy(false, true);
        assert_eq!(validate("googl&#101;.com", EntityMode::Text, &plain), "googl&#101;.com");
        assert_eq!(validate("googl&#101;.com", EntityMode::Text, &normalizing), "google.com");
        assert_eq!(validate("100%41", EntityMode::Text, &normalizing), "100%41");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let p = policy(false, false);
        let once = validate("a & b &foo; &#65; \"q\" &amp;", EntityMode::Text, &p);
        let twice = validate(&once, EntityMode::Text, &p);
        assert_eq!(once, twice);
    }
}
