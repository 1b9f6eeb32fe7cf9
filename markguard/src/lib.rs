// markguard/src/lib.rs
//! # Markguard CLI Application
//!
//! This crate provides the command-line interface for the `markguard-core`
//! markup filter: reading input, resolving the policy and profile, printing
//! the sanitized result with an optional diff, and summarizing what changed.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

pub use commands::policy::resolve_policy;
pub use commands::sanitize::{run_sanitize_opts, SanitizeOptions};
