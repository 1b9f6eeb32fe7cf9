// markguard-core/src/engines/mod.rs
//! Implementations of the `SanitizationEngine` trait.
//!
//! # License
//! MIT OR APACHE 2.0

pub mod markup_engine;
