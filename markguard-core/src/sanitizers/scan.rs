//! scan.rs - The scan-and-replace primitive every pipeline stage is built on.
//!
//! Each stage needs "find every occurrence of a shape, replace it, copy the
//! rest". Rather than a regex engine, stages describe their shape with a
//! closure anchored at a trigger byte, and this module does the walking.
//!
//! License: MIT OR APACHE 2.0

/// Walks `input` and offers every occurrence of the ASCII byte `trigger` to `at`.
///
/// `at` receives the whole input and the byte offset of the trigger. It returns
/// `Some((end, replacement))` to replace `input[start..end]`, or `None` to leave
/// the trigger in place. Scanning resumes at `end`, so matches never overlap.
/// A match must consume at least the trigger byte; an `end` that does not is
/// treated as no match.
pub(crate) fn replace_matches<F>(input: &str, trigger: u8, mut at: F) -> String
where
    F: FnMut(&str, usize) -> Option<(usize, String)>,
{
    debug_assert!(trigger.is_ascii());

    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(offset) = input.as_bytes()[pos..].iter().position(|&b| b == trigger) {
        let start = pos + offset;
        match at(input, start) {
            Some((end, replacement)) if end > start && end <= input.len() => {
                out.push_str(&input[copied..start]);
                out.push_str(&replacement);
                copied = end;
                pos = end;
            }
            _ => pos = start + 1,
        }
    }

    out.push_str(&input[copied..]);
    out
}

/// Offset of the first `<` or `>` at or after `from`.
pub(crate) fn next_bracket(input: &str, from: usize) -> Option<usize> {
    input.as_bytes()[from..]
        .iter()
        .position(|&b| b == b'<' || b == b'>')
        .map(|offset| from + offset)
}

/// Whitespace as the classic `\s` class sees it: space, tab, LF, VT, FF, CR.
pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Length of the run of ASCII alphanumerics starting at `from`.
pub(crate) fn alnum_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|b| b.is_ascii_alphanumeric()).count()
}
