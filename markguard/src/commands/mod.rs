// markguard/src/commands/mod.rs
pub mod policy;
pub mod sanitize;
