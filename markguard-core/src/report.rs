// markguard-core/src/report.rs
//! Data structures for reporting what a sanitization run changed, plus the
//! helpers that keep untrusted markup out of debug logs.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

lazy_static! {
    /// Whether raw untrusted content may be written to debug logs. Off unless
    /// `MARKGUARD_ALLOW_DEBUG_CONTENT=true`, since log viewers are rarely
    /// hardened against the very markup this library filters.
    static ref DEBUG_CONTENT_ALLOWED: bool = {
        std::env::var("MARKGUARD_ALLOW_DEBUG_CONTENT")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// One kind of change the filter can make to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    /// A bracket was inserted or escaped while balancing.
    RepairedBracket,
    /// An opening tag was not on the allow-list.
    DroppedTag,
    /// A closing tag was disallowed or had nothing to close.
    DroppedClosingTag,
    /// An attribute was not allowed on its tag, or repeated.
    DroppedAttribute,
    /// A disallowed URL scheme was replaced by `#`.
    NeutralizedProtocol,
    /// A numeric reference or percent escape was decoded.
    DecodedReference,
    /// An ampersand that did not start a valid entity was escaped.
    EscapedEntity,
    /// A comment was removed.
    StrippedComment,
    /// A bracketed token matched no known shape.
    DroppedGarbage,
    /// A closing tag was appended for a tag left open.
    AutoClosedTag,
    /// An empty tag pair was removed.
    RemovedBlankTag,
}

impl FilterAction {
    pub fn label(&self) -> &'static str {
        match self {
            FilterAction::RepairedBracket => "repaired brackets",
            FilterAction::DroppedTag => "dropped tags",
            FilterAction::DroppedClosingTag => "dropped closing tags",
            FilterAction::DroppedAttribute => "dropped attributes",
            FilterAction::NeutralizedProtocol => "neutralized protocols",
            FilterAction::DecodedReference => "decoded references",
            FilterAction::EscapedEntity => "escaped ampersands",
            FilterAction::StrippedComment => "stripped comments",
            FilterAction::DroppedGarbage => "dropped garbage tokens",
            FilterAction::AutoClosedTag => "auto-closed tags",
            FilterAction::RemovedBlankTag => "removed blank tags",
        }
    }
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts of every change made during a single `sanitize` call.
///
/// Purely informational: the report never influences the sanitized output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    counts: BTreeMap<FilterAction, usize>,
}

/// A single row of the summary shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSummaryItem {
    pub action: FilterAction,
    pub occurrences: usize,
}

impl FilterReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: FilterAction) {
        self.record_n(action, 1);
    }

    pub fn record_n(&mut self, action: FilterAction, n: usize) {
        if n > 0 {
            *self.counts.entry(action).or_insert(0) += n;
        }
    }

    pub fn count(&self, action: FilterAction) -> usize {
        self.counts.get(&action).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// `true` when the input passed through without any change being recorded.
    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }

    /// Summary rows in a stable order.
    pub fn summary(&self) -> Vec<FilterSummaryItem> {
        self.counts
            .iter()
            .map(|(&action, &occurrences)| FilterSummaryItem { action, occurrences })
            .collect()
    }
}

/// Replaces untrusted content with a length marker.
pub fn redact_untrusted(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[CONTENT]".to_string()
    } else {
        format!("[CONTENT: {} chars]", s.len())
    }
}

fn get_loggable_content(untrusted: &str) -> String {
    if *DEBUG_CONTENT_ALLOWED {
        untrusted.to_string()
    } else {
        redact_untrusted(untrusted)
    }
}

/// Logs one filter action along with the token that triggered it.
pub fn log_filter_action_debug(module_path: &str, action: FilterAction, untrusted: &str) {
    debug!(
        "{} Filter action: {} on '{}'",
        module_path,
        action,
        get_loggable_content(untrusted)
    );
}
