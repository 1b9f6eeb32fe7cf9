//! blanks.rs - Removes tag pairs that ended up with no content.

use log::debug;

use super::scan::{is_space, replace_matches};
use super::FilterContext;
use crate::report::FilterAction;

/// Repeatedly removes `<name ...></name>` and `<name .../>` for every name in
/// the policy's remove-blank list, until a pass no longer shrinks the input.
/// Nested blanks such as `<b><i></i></b>` therefore disappear completely.
pub fn remove_blank_tags(input: &str, ctx: &mut FilterContext<'_>) -> String {
    let policy = ctx.policy;
    let names = policy.remove_blank_tags();
    if names.is_empty() {
        return input.to_string();
    }

    let mut data = input.to_string();
    let mut removed = 0;
    let mut passes = 0;
    loop {
        passes += 1;
        let before = data.len();
        data = replace_matches(&data, b'<', |s, i| {
            let end = names.iter().find_map(|name| blank_tag_end(s, i, name))?;
            removed += 1;
            Some((end, String::new()))
        });
        if data.len() == before {
            break;
        }
    }

    if removed > 0 {
        debug!("Removed {} blank tag(s) in {} pass(es).", removed, passes);
    }
    ctx.report.record_n(FilterAction::RemovedBlankTag, removed);
    data
}

/// If a blank `name` tag starts at `start`, the offset just past it.
fn blank_tag_end(s: &str, start: usize, name: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let name_end = start + 1 + name.len();
    if !s[start + 1..].starts_with(name) {
        return None;
    }

    let closer = format!("></{}>", name);
    match *bytes.get(name_end)? {
        b'>' => s[name_end..].starts_with(&closer).then(|| name_end + closer.len()),
        b'/' => (bytes.get(name_end + 1) == Some(&b'>')).then_some(name_end + 2),
        b if is_space(b) => {
            let gt = name_end + s[name_end..].find('>')?;
            if s[gt..].starts_with(&closer) {
                Some(gt + closer.len())
            } else if bytes[gt - 1] == b'/' {
                Some(gt + 1)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterPolicy;
    use crate::sanitizers::compiler::CompiledPolicy;

    fn remove(input: &str) -> String {
        let policy = FilterPolicy::default()
            .with_remove_blank_tag("b")
            .with_remove_blank_tag("i")
            .with_remove_blank_tag("a");
        let compiled = CompiledPolicy::compile(&policy);
        let mut ctx = FilterContext::new(&compiled);
        remove_blank_tags(input, &mut ctx)
    }

    #[test]
    fn test_removes_empty_pairs_and_self_closed_tags() {
        assert_eq!(remove("foo<b></b>bar"), "foobar");
        assert_eq!(remove("x<i/>y<i />z"), "xyz");
        assert_eq!(remove(r#"<a href="http://x/"></a>"#), "");
    }

    #[test]
    fn test_nested_blanks_are_removed_completely() {
        assert_eq!(remove("<b><i><b></b></i></b>!"), "!");
    }

    #[test]
    fn test_tags_with_content_are_kept() {
        assert_eq!(remove("<b>x</b>"), "<b>x</b>");
        assert_eq!(remove("<b> </b>"), "<b> </b>");
        assert_eq!(remove(r#"<a href="x">y</a>"#), r#"<a href="x">y</a>"#);
    }

    #[test]
    fn test_only_listed_names_match() {
        assert_eq!(remove("<u></u><br/><bx></bx>"), "<u></u><br/><bx></bx>");
        assert_eq!(remove("<b></i>"), "<b></i>");
    }

    #[test]
    fn test_empty_list_is_a_no_op() {
        let compiled = CompiledPolicy::compile(&FilterPolicy::default());
        let mut ctx = FilterContext::new(&compiled);
        assert_eq!(remove_blank_tags("<b></b>", &mut ctx), "<b></b>");
        assert!(ctx.report.is_clean());
    }

    #[test]
    fn test_removals_are_counted() {
        let compiled = CompiledPolicy::compile(&FilterPolicy::default().with_remove_blank_tag("b"));
        let mut ctx = FilterContext::new(&compiled);
        remove_blank_tags("<b><b></b></b><b/>", &mut ctx);
        assert_eq!(ctx.report.count(FilterAction::RemovedBlankTag), 3);
    }
}
