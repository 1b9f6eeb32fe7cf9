// markguard-core/src/engine.rs
//! Defines the core SanitizationEngine trait.
//!
//! The `SanitizationEngine` trait provides a pluggable interface over the
//! filtering pipeline so callers (the CLI, headless helpers, tests) do not
//! depend on how a policy is compiled or which stages run.
//!
//! License: MIT OR APACHE 2.0

use crate::config::FilterPolicy;
use crate::report::FilterReport;
use crate::sanitizers::compiler::CompiledPolicy;

/// A trait that defines the core functionality of a sanitization engine.
///
/// Sanitization is total: every input string produces an output string, so
/// neither method returns a `Result`. Engines hold only read-only state and
/// may be shared between threads; all per-call state is created inside each
/// call.
pub trait SanitizationEngine: Send + Sync {
    /// Filters `content` and returns the safe markup.
    fn sanitize(&self, content: &str) -> String {
        self.sanitize_with_report(content).0
    }

    /// Filters `content` and also reports every change that was made.
    fn sanitize_with_report(&self, content: &str) -> (String, FilterReport);

    /// Returns a reference to the `CompiledPolicy` used by the engine.
    fn compiled_policy(&self) -> &CompiledPolicy;

    /// Returns a reference to the engine's policy.
    fn get_policy(&self) -> &FilterPolicy;
}
