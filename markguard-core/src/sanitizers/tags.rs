//! tags.rs - Tag classification and allow-list enforcement.
//!
//! Every `<...>` token left by the bracket balancer is classified by shape and
//! re-rendered from scratch: nothing from the source token is copied to the
//! output except through the attribute validators. Opening tags bump the
//! per-call counter, closing tags must be matched against it, and anything
//! still open at the end of the document is closed there.

use std::collections::HashSet;

use log::debug;

use super::attributes::extract_attributes;
use super::comments::escape_comment_body;
use super::entities::{validate_entities, EntityMode};
use super::protocol::check_protocol;
use super::scan::replace_matches;
use super::FilterContext;
use crate::report::{log_filter_action_debug, FilterAction};

/// The shape of one bracketed token, before any policy is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedTag {
    /// `name attrs` or `name attrs /`. The name is lowercased; attributes are
    /// raw `(name, value)` pairs in extraction order, duplicates included.
    OpeningTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    /// `/name...`. Anything after the name is ignored.
    ClosingTag { name: String },
    /// `!--text--`.
    CommentBody { text: String },
    /// Anything else.
    Garbage,
}

/// Classifies the text between `<` and `>`. First matching shape wins.
pub fn classify(inner: &str) -> ClassifiedTag {
    let bytes = inner.as_bytes();

    if let Some(rest) = inner.strip_prefix('/') {
        let run = rest.bytes().take_while(u8::is_ascii_alphanumeric).count();
        if run > 0 {
            return ClassifiedTag::ClosingTag {
                name: rest[..run].to_ascii_lowercase(),
            };
        }
    }

    let run = bytes.iter().take_while(|b| b.is_ascii_alphanumeric()).count();
    if run > 0 {
        let (body, self_closing) = match inner[run..].strip_suffix('/') {
            Some(body) => (body, true),
            None => (&inner[run..], false),
        };
        return ClassifiedTag::OpeningTag {
            name: inner[..run].to_ascii_lowercase(),
            attributes: extract_attributes(body),
            self_closing,
        };
    }

    if inner.len() >= 5 && inner.starts_with("!--") && inner.ends_with("--") {
        return ClassifiedTag::CommentBody {
            text: inner[3..inner.len() - 2].to_string(),
        };
    }

    ClassifiedTag::Garbage
}

/// Classifies and re-renders every tag in `input`, then appends closers for
/// every tag left open.
pub fn check_tags(input: &str, ctx: &mut FilterContext<'_>) -> String {
    let mut out = replace_matches(input, b'<', |s, i| {
        let close = i + 1 + s[i + 1..].find('>')?;
        let inner = &s[i + 1..close];
        Some((close + 1, render_tag(inner, ctx)))
    });

    let open_tags = std::mem::take(&mut ctx.open_tags);
    for (name, count) in open_tags.into_unclosed() {
        debug!("Auto-closing {} unclosed <{}> tag(s).", count, name);
        for _ in 0..count {
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        }
        ctx.report.record_n(FilterAction::AutoClosedTag, count);
    }
    out
}

fn drop_token(inner: &str, action: FilterAction, ctx: &mut FilterContext<'_>) -> String {
    log_filter_action_debug(module_path!(), action, inner);
    ctx.record(action);
    String::new()
}

/// Renders a single token under the policy. Dropped tokens render as nothing.
fn render_tag(inner: &str, ctx: &mut FilterContext<'_>) -> String {
    match classify(inner) {
        ClassifiedTag::ClosingTag { name } => {
            let policy = ctx.policy;
            if policy.is_allowed_tag(&name) && !policy.is_no_close(&name) && ctx.open_tags.decrement(&name) {
                format!("</{}>", name)
            } else {
                drop_token(inner, FilterAction::DroppedClosingTag, ctx)
            }
        }
        ClassifiedTag::OpeningTag {
            name,
            attributes,
            self_closing,
        } => {
            if !ctx.policy.is_allowed_tag(&name) {
                return drop_token(inner, FilterAction::DroppedTag, ctx);
            }
            let params = render_attributes(&name, attributes, ctx);

            let self_closing = if ctx.policy.is_always_close(&name) {
                false
            } else {
                self_closing || ctx.policy.is_no_close(&name)
            };

            if self_closing {
                format!("<{}{} />", name, params)
            } else {
                ctx.open_tags.increment(&name);
                format!("<{}{}>", name, params)
            }
        }
        ClassifiedTag::CommentBody { text } => {
            if ctx.policy.strip_comments {
                drop_token(inner, FilterAction::StrippedComment, ctx)
            } else {
                format!("<!--{}-->", escape_comment_body(&text, ctx))
            }
        }
        ClassifiedTag::Garbage => drop_token(inner, FilterAction::DroppedGarbage, ctx),
    }
}

/// Renders the allowed attributes of `tag` as ` key="value"` pairs. Only the
/// first occurrence of each attribute name is considered.
fn render_attributes(tag: &str, attributes: Vec<(String, String)>, ctx: &mut FilterContext<'_>) -> String {
    let mut params = String::new();
    let mut seen = HashSet::new();

    for (key, value) in attributes {
        let key = key.to_ascii_lowercase();
        if !seen.insert(key.clone()) || !ctx.policy.is_allowed_attribute(tag, &key) {
            log_filter_action_debug(module_path!(), FilterAction::DroppedAttribute, &key);
            ctx.record(FilterAction::DroppedAttribute);
            continue;
        }

        let value = if ctx.policy.is_protocol_attribute(&key) {
            check_protocol(&value, ctx)
        } else {
            validate_entities(&value, EntityMode::Text, ctx)
        };
        params.push(' ');
        params.push_str(&key);
        params.push_str("=\"");
        params.push_str(&value);
        params.push('"');
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterPolicy;
    use crate::sanitizers::compiler::CompiledPolicy;

    fn default_policy() -> CompiledPolicy {
        CompiledPolicy::compile(&FilterPolicy::load_default_policy().unwrap())
    }

    fn check(input: &str, policy: &CompiledPolicy) -> String {
        let mut ctx = FilterContext::new(policy);
        check_tags(input, &mut ctx)
    }

    #[test]
    fn test_classify_shapes() {
        assert_eq!(classify("/B foo"), ClassifiedTag::ClosingTag { name: "b".into() });
        assert_eq!(
            classify("A href=x/"),
            ClassifiedTag::OpeningTag {
                name: "a".into(),
                attributes: vec![("href".into(), "x".into())],
                self_closing: true,
            }
        );
        assert_eq!(classify("!-- hi --"), ClassifiedTag::CommentBody { text: " hi ".into() });
        assert_eq!(classify("!----"), ClassifiedTag::CommentBody { text: String::new() });
        assert_eq!(classify("!---"), ClassifiedTag::Garbage);
        assert_eq!(classify(" b"), ClassifiedTag::Garbage);
        assert_eq!(classify("/"), ClassifiedTag::Garbage);
        assert_eq!(classify(""), ClassifiedTag::Garbage);
    }

    #[test]
    fn test_allowed_tags_are_rendered_lowercase() {
        let p = default_policy();
        assert_eq!(check("<B>x</B>", &p), "<b>x</b>");
    }

    #[test]
    fn test_disallowed_tags_are_dropped() {
        let p = default_policy();
        assert_eq!(check("<script>alert(1)</script>", &p), "alert(1)");
        assert_eq!(check("< x>y", &p), "y");
    }

    #[test]
    fn test_unclosed_tags_are_closed_in_first_opened_order() {
        let p = default_policy();
        assert_eq!(check("<b>x", &p), "<b>x</b>");
        assert_eq!(check("<b><i>x", &p), "<b><i>x</b></i>");
        assert_eq!(check("<b><b>x</b>", &p), "<b><b>x</b></b>");
    }

    #[test]
    fn test_unmatched_closing_tag_is_dropped() {
        let p = default_policy();
        assert_eq!(check("<b>x</b></b>", &p), "<b>x</b>");
        assert_eq!(check("</i>x", &p), "x");
    }

    #[test]
    fn test_attributes_are_filtered_and_quoted() {
        let p = default_policy();
        assert_eq!(
            check(r#"<a href="javascript:alert(1)" onclick="x">y</a>"#, &p),
            r##"<a href="#alert(1)">y</a>"##
        );
        assert_eq!(
            check(r#"<A HREF=http://x/ title='say "hi"'>"#, &p),
            r#"<a title="say &quot;hi&quot;" href="http://x/"></a>"#
        );
    }

    #[test]
    fn test_first_duplicate_attribute_wins() {
        let p = default_policy();
        assert_eq!(check(r#"<a title="x" title="y">"#, &p), r#"<a title="x"></a>"#);
        assert_eq!(check(r#"<a title=bare title="quoted">"#, &p), r#"<a title="quoted"></a>"#);
    }

    #[test]
    fn test_always_close_overrides_self_closing() {
        let p = default_policy();
        assert_eq!(check("<b/>", &p), "<b></b>");
    }

    #[test]
    fn test_no_close_tags_self_close_and_drop_closers() {
        let policy = FilterPolicy::default().with_tag("br", Vec::<String>::new()).with_no_close_tag("br");
        let p = CompiledPolicy::compile(&policy);
        assert_eq!(check("<br>a</br><BR/>", &p), "<br />a<br />");
    }

    #[test]
    fn test_other_tags_keep_their_own_closing_form() {
        let policy = FilterPolicy::default().with_tag("img", ["alt"]);
        let p = CompiledPolicy::compile(&policy);
        assert_eq!(check(r#"<img alt="x"/>"#, &p), r#"<img alt="x" />"#);
        assert_eq!(check("<img>", &p), "<img></img>");
    }

    #[test]
    fn test_comments_follow_strip_toggle() {
        let strip = default_policy();
        assert_eq!(check("a<!-- hi -->b", &strip), "ab");

        let mut keep = FilterPolicy::load_default_policy().unwrap();
        keep.strip_comments = false;
        let keep = CompiledPolicy::compile(&keep);
        assert_eq!(check("a<!-- hi -->b", &keep), "a<!-- hi -->b");
        // A body that never went through the comment escaper is escaped here.
        assert_eq!(check(r#"<!-- " & x -->"#, &keep), "<!-- &quot; &amp; x -->");
        assert_eq!(check("<!-- &quot; &amp; x -->", &keep), "<!-- &quot; &amp; x -->");
    }

    #[test]
    fn test_actions_are_reported() {
        let p = default_policy();
        let mut ctx = FilterContext::new(&p);
        check_tags(r#"<b><x><a onclick="y" href="vbscript:z"></u>"#, &mut ctx);
        assert_eq!(ctx.report.count(FilterAction::DroppedTag), 1);
        assert_eq!(ctx.report.count(FilterAction::DroppedAttribute), 1);
        assert_eq!(ctx.report.count(FilterAction::NeutralizedProtocol), 1);
        assert_eq!(ctx.report.count(FilterAction::DroppedClosingTag), 1);
        assert_eq!(ctx.report.count(FilterAction::AutoClosedTag), 2);
    }
}
