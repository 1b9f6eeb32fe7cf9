// markguard-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot, non-interactive sanitization.
//!
//! `sanitize` and `sanitize_with_report` are total and never fail. They trust
//! the policy as given. `headless_sanitize_string` validates the policy first
//! and is the entry point for policies that come from users.

use anyhow::{Context, Result};

use crate::config::FilterPolicy;
use crate::engine::SanitizationEngine;
use crate::engines::markup_engine::MarkupEngine;
use crate::report::FilterReport;
use crate::sanitizers::compiler::get_or_compile_policy;
use crate::sanitizers::run_pipeline;

/// Filters `raw` under `policy` and returns safe markup.
pub fn sanitize(raw: &str, policy: &FilterPolicy) -> String {
    sanitize_with_report(raw, policy).0
}

/// Like [`sanitize`], also returning what was changed.
pub fn sanitize_with_report(raw: &str, policy: &FilterPolicy) -> (String, FilterReport) {
    let compiled = get_or_compile_policy(policy);
    run_pipeline(raw, &compiled)
}

/// Validates `policy`, then fully sanitizes `content` with it.
///
/// # Arguments
///
/// * `policy` - The filter policy (default, user file, or profile-adjusted).
/// * `content` - The string to be sanitized.
pub fn headless_sanitize_string(policy: FilterPolicy, content: &str) -> Result<String> {
    policy
        .validate()
        .context("Refusing to sanitize with an invalid filter policy")?;
    let engine = MarkupEngine::new(policy);
    Ok(engine.sanitize(content))
}
