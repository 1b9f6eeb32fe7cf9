//! balance.rs - Bracket repair.
//!
//! After this stage every `<` is followed by a `>` before the next `<`, so the
//! classifier can treat each `<...>` span as one candidate tag. With
//! `auto_repair_brackets` the missing half of a bracket pair is inserted
//! (`b>` becomes `<b>`). Without it, stray brackets are escaped to text.

use log::debug;

use super::scan::{next_bracket, replace_matches};
use super::FilterContext;
use crate::report::FilterAction;

/// Balances the brackets in `input` according to the policy.
pub fn balance_brackets(input: &str, ctx: &mut FilterContext<'_>) -> String {
    let mut repairs = 0;

    let balanced = if ctx.policy.auto_repair_brackets {
        let data = collapse_runs(input, '>');
        let data = collapse_runs(&data, '<');
        let data = data.strip_prefix('>').unwrap_or(&data);
        let data = close_open_brackets(data, true, &mut repairs);
        open_bare_runs(&data, true, &mut repairs)
    } else {
        let data = close_open_brackets(input, false, &mut repairs);
        let data = open_bare_runs(&data, false, &mut repairs);
        // Escaping a stray `>` leaves a `<` before the next real `>`.
        data.replace("<>", "")
    };

    if repairs > 0 {
        debug!("Balanced {} stray bracket(s).", repairs);
    }
    ctx.report.record_n(FilterAction::RepairedBracket, repairs);
    balanced
}

/// Collapses every run of two or more `bracket` characters into one.
fn collapse_runs(input: &str, bracket: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous = None;
    for c in input.chars() {
        if c == bracket && previous == Some(bracket) {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

/// Handles every `<` whose next bracket is another `<` or the end of input.
/// Repairing closes it just before that point; escaping turns it into `&lt;`.
fn close_open_brackets(input: &str, repair: bool, repairs: &mut usize) -> String {
    replace_matches(input, b'<', |s, i| {
        let end = match next_bracket(s, i + 1) {
            Some(j) if s.as_bytes()[j] == b'>' => return None,
            Some(j) => j,
            None => s.len(),
        };
        *repairs += 1;
        let inner = &s[i + 1..end];
        Some(if repair {
            (end, format!("<{}>", inner))
        } else {
            (end, format!("&lt;{}", inner))
        })
    })
}

/// Handles every run of text that starts at the beginning of input or right
/// after a `>`, and ends at another `>`. Repairing opens it with `<`; escaping
/// escapes the `>` that ends it.
fn open_bare_runs(input: &str, repair: bool, repairs: &mut usize) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len() + 8);
    let mut copied = 0;

    let run_starts = std::iter::once(0).chain(
        bytes
            .iter()
            .enumerate()
            .filter(|(_, &b)| b == b'>')
            .map(|(i, _)| i + 1),
    );

    for run_start in run_starts {
        let Some(end) = next_bracket(input, run_start) else {
            continue;
        };
        if bytes[end] != b'>' {
            continue;
        }
        *repairs += 1;
        let run = &input[run_start..end];
        out.push_str(&input[copied..run_start]);
        if repair {
            out.push('<');
            out.push_str(run);
        } else {
            out.push_str(run);
            out.push_str("&gt;<");
        }
        copied = end;
    }

    out.push_str(&input[copied..]);
    out
}
