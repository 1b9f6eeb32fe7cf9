//! attributes.rs - Attribute extraction from the body of an opening tag.
//!
//! Three shapes are recognized, each scanned independently over the whole body:
//!
//! * quoted: `key="value"` or `key='value'`, closed by the same quote;
//! * bare: `key=value`, the value running up to whitespace or a quote;
//! * unterminated: `key="value` where no quote follows before the end of the
//!   body. Trailing whitespace is trimmed from the value.
//!
//! The results are concatenated in that order. Nothing here is lowercased or
//! filtered; the classifier decides what survives.

use super::scan::{alnum_run, is_space};

/// All `(name, raw value)` pairs found in `body`, duplicates included.
pub fn extract_attributes(body: &str) -> Vec<(String, String)> {
    let mut pairs = quoted_pairs(body);
    pairs.extend(bare_pairs(body));
    pairs.extend(unterminated_pair(body));
    pairs
}

/// Calls `at` for the start of every alphanumeric run immediately followed by
/// `=`. `at` returns the offset to resume scanning from, or `None` to skip past
/// the run.
fn scan_assignments<F>(body: &str, mut at: F)
where
    F: FnMut(usize, usize) -> Option<usize>,
{
    let bytes = body.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let run = alnum_run(bytes, pos);
        if run == 0 {
            pos += 1;
            continue;
        }
        let name_end = pos + run;
        if bytes.get(name_end) == Some(&b'=') {
            if let Some(resume) = at(pos, name_end) {
                pos = resume;
                continue;
            }
        }
        pos = name_end;
    }
}

fn quoted_pairs(body: &str) -> Vec<(String, String)> {
    let bytes = body.as_bytes();
    let mut pairs = Vec::new();
    scan_assignments(body, |start, name_end| {
        let quote = *bytes.get(name_end + 1)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let value_start = name_end + 2;
        let value_len = bytes[value_start..].iter().position(|&b| b == quote)?;
        let value_end = value_start + value_len;
        pairs.push((body[start..name_end].to_string(), body[value_start..value_end].to_string()));
        Some(value_end + 1)
    });
    pairs
}

fn bare_pairs(body: &str) -> Vec<(String, String)> {
    let bytes = body.as_bytes();
    let mut pairs = Vec::new();
    scan_assignments(body, |start, name_end| {
        let value_start = name_end + 1;
        let value_len = bytes[value_start..]
            .iter()
            .take_while(|&&b| b != b'"' && b != b'\'' && !is_space(b))
            .count();
        if value_len == 0 {
            return None;
        }
        let value_end = value_start + value_len;
        pairs.push((body[start..name_end].to_string(), body[value_start..value_end].to_string()));
        Some(value_end)
    });
    pairs
}

fn unterminated_pair(body: &str) -> Option<(String, String)> {
    let bytes = body.as_bytes();
    let quote = bytes.iter().rposition(|&b| b == b'"' || b == b'\'')?;
    if quote < 2 || bytes[quote - 1] != b'=' || !bytes[quote - 2].is_ascii_alphanumeric() {
        return None;
    }
    let name_end = quote - 1;
    let name_start = bytes[..name_end]
        .iter()
        .rposition(|b| !b.is_ascii_alphanumeric())
        .map_or(0, |p| p + 1);
    let value = body[quote + 1..].trim_end_matches(|c: char| c.is_ascii() && is_space(c as u8));
    Some((body[name_start..name_end].to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(body: &str) -> Vec<(String, String)> {
        extract_attributes(body)
    }

    fn owned(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_quoted_values_with_either_quote() {
        assert_eq!(
            pairs(r#" href="http://x/" title='a "b"'"#),
            owned(&[("href", "http://x/"), ("title", r#"a "b""#)])
        );
    }

    #[test]
    fn test_bare_values_stop_at_space_or_quote() {
        assert_eq!(pairs(" href=foo.html title=x"), owned(&[("href", "foo.html"), ("title", "x")]));
        assert_eq!(pairs(" a= b"), owned(&[]));
    }

    #[test]
    fn test_unterminated_value_is_trimmed() {
        assert_eq!(pairs(" title=\"hello  "), owned(&[("title", "hello")]));
        assert_eq!(pairs(" href='x"), owned(&[("href", "x")]));
    }

    #[test]
    fn test_shapes_are_merged_in_priority_order() {
        assert_eq!(
            pairs(r#" title="q" href=b title='c"#),
            owned(&[("title", "q"), ("href", "b"), ("title", "c")])
        );
    }

    #[test]
    fn test_names_are_kept_verbatim() {
        assert_eq!(pairs(" HREF=\"x\""), owned(&[("HREF", "x")]));
    }

    #[test]
    fn test_no_attributes() {
        assert!(extract_attributes("").is_empty());
        assert!(extract_attributes(" disabled").is_empty());
        assert!(extract_attributes(" =\"x\"").is_empty());
    }
}
