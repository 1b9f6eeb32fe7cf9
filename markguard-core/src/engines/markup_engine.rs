// markguard-core/src/engines/markup_engine.rs
//! A `SanitizationEngine` that runs the full markup filtering pipeline.
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::FilterPolicy;
use crate::engine::SanitizationEngine;
use crate::report::FilterReport;
use crate::sanitizers::compiler::{get_or_compile_policy, CompiledPolicy};
use crate::sanitizers::run_pipeline;

#[derive(Debug)]
pub struct MarkupEngine {
    compiled: Arc<CompiledPolicy>,
    policy: FilterPolicy,
}

impl MarkupEngine {
    /// Builds an engine for `policy`. The policy is used as given; call
    /// `FilterPolicy::validate` first to reject names that can never match.
    pub fn new(policy: FilterPolicy) -> Self {
        let compiled = get_or_compile_policy(&policy);
        debug!(
            "MarkupEngine ready: {} allowed tags, {} allowed protocols.",
            policy.allowed_tags.len(),
            policy.allowed_protocols.len()
        );
        Self { compiled, policy }
    }

    /// Builds an engine for the embedded default policy.
    pub fn with_default_policy() -> Result<Self> {
        let policy = FilterPolicy::load_default_policy()
            .context("Failed to load default policy for MarkupEngine")?;
        Ok(Self::new(policy))
    }
}

impl SanitizationEngine for MarkupEngine {
    fn sanitize_with_report(&self, content: &str) -> (String, FilterReport) {
        let (output, report) = run_pipeline(content, &self.compiled);
        if !report.is_clean() {
            info!("Sanitization changed the input in {} place(s).", report.total());
        }
        (output, report)
    }

    fn compiled_policy(&self) -> &CompiledPolicy {
        &self.compiled
    }

    fn get_policy(&self) -> &FilterPolicy {
        &self.policy
    }
}
