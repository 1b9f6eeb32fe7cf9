// markguard-core/src/lib.rs
//! # Markguard Core Library
//!
//! `markguard-core` filters untrusted, user-authored rich text so it can be
//! embedded in a trusted page. Only an allow-listed set of tags and attributes
//! survives; URL-bearing attributes are restricted to allowed schemes; every
//! ampersand is either a valid entity or escaped; and the output is always
//! tag-balanced.
//!
//! The library is pure and stateless: `sanitize` never fails and keeps no state
//! between calls. I/O is limited to loading policies and profiles.
//!
//! ## Modules
//!
//! * `config`: Defines the `FilterPolicy` and loads it from YAML.
//! * `sanitizers`: The pipeline stages and the policy compiler/cache.
//! * `validators`: Syntactic checks for names used in a policy.
//! * `report`: Counts of what a sanitization run changed, and log redaction.
//! * `engine`: Defines the `SanitizationEngine` trait.
//! * `engines`: Contains the `MarkupEngine` implementation.
//! * `profiles`: Named adjustments applied on top of a base policy.
//! * `headless`: One-shot helpers for non-interactive use.
//! * `errors`: The library error type.
//!
//! ## Pipeline
//!
//! Each call runs, in order: comment escaping, bracket balancing, tag
//! classification (with attribute, protocol and entity validation), blank-tag
//! removal, and a final entity pass over the text between tags.
//!
//! ## Usage Example
//!
//! ```rust
//! use markguard_core::{sanitize, FilterPolicy};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let policy = FilterPolicy::load_default_policy()?;
//!
//!     let output = sanitize(r#"<b>hi<script>alert(1)</script> <a href="javascript:x()">go"#, &policy);
//!     assert_eq!(output, r##"<b>hialert(1) <a href="#x()">go</b></a>"##);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Sanitization itself is infallible. Loading and validating policies and
//! profiles returns `anyhow::Result`, with `MarkguardError` as the typed error
//! for policy problems.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod profiles;
pub mod report;
pub mod sanitizers;
pub mod validators;

/// Re-exports the policy type.
pub use config::FilterPolicy;

/// Re-exports the custom error type for clear error reporting.
pub use errors::MarkguardError;

/// Re-exports types related to the core sanitization engine trait.
pub use engine::SanitizationEngine;
pub use engines::markup_engine::MarkupEngine;

/// Re-exports the change report.
pub use report::{FilterAction, FilterReport, FilterSummaryItem};

/// Re-exports profile types and loaders.
pub use profiles::{
    apply_profile_to_policy,
    list_available_profiles,
    load_profile_by_name,
    profile_candidate_paths,
    CloseMode,
    PolicyProfile,
    ProfileSummary,
    ProfileTag,
};

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{headless_sanitize_string, sanitize, sanitize_with_report};

// Re-export key types from the sanitizers module for advanced usage.
pub use sanitizers::compiler::{get_or_compile_policy, CompiledPolicy};
pub use sanitizers::tags::ClassifiedTag;
