// markguard-core/src/sanitizers/mod.rs
//! The markup filtering pipeline.
//!
//! Each stage consumes the previous stage's whole output and produces a new
//! string. The order is fixed:
//!
//! 1. [`comments`]: escape markup inside `<!-- -->` bodies.
//! 2. [`balance`]: make every bracketed fragment a complete `<...>` token.
//! 3. [`tags`]: classify tokens and enforce the allow-lists. Calls into
//!    [`protocol`] and [`entities`] for attribute values.
//! 4. [`blanks`]: remove empty tag pairs until nothing changes.
//! 5. [`text`]: validate entities and quotes in the text between tags.
//!
//! All per-call state is held in a [`FilterContext`] created by
//! [`run_pipeline`] and dropped when it returns.

pub mod attributes;
pub mod balance;
pub mod blanks;
pub mod comments;
pub mod compiler;
pub mod counter;
pub mod entities;
pub mod protocol;
pub mod tags;
pub mod text;

pub(crate) mod scan;

use log::debug;

use crate::report::{FilterAction, FilterReport};
use compiler::CompiledPolicy;
use counter::OpenTagCounter;

/// Mutable state for a single `sanitize` call.
///
/// Never stored in an engine and never shared between calls: the policy is the
/// only thing borrowed from outside.
#[derive(Debug)]
pub struct FilterContext<'p> {
    pub policy: &'p CompiledPolicy,
    pub open_tags: OpenTagCounter,
    pub report: FilterReport,
}

impl<'p> FilterContext<'p> {
    pub fn new(policy: &'p CompiledPolicy) -> Self {
        Self {
            policy,
            open_tags: OpenTagCounter::new(),
            report: FilterReport::new(),
        }
    }

    pub(crate) fn record(&mut self, action: FilterAction) {
        self.report.record(action);
    }
}

/// Runs every stage over `content` with a fresh context.
pub fn run_pipeline(content: &str, policy: &CompiledPolicy) -> (String, FilterReport) {
    let mut ctx = FilterContext::new(policy);

    let data = comments::escape_comments(content, &mut ctx);
    let data = balance::balance_brackets(&data, &mut ctx);
    let data = tags::check_tags(&data, &mut ctx);
    let data = blanks::remove_blank_tags(&data, &mut ctx);
    let data = text::cleanup_non_tags(&data, &mut ctx);

    debug!(
        "Pipeline finished. Input length: {}, output length: {}, changes: {}",
        content.len(),
        data.len(),
        ctx.report.total()
    );
    (data, ctx.report)
}
