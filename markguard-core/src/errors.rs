//! errors.rs - Custom error types for the markguard-core library.
//!
//! The filtering pipeline itself never fails: malformed markup is neutralized,
//! not rejected. These errors cover everything around it, such as loading and
//! validating a `FilterPolicy` or reading a profile from disk.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `markguard-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MarkguardError {
    #[error("Invalid {kind} name '{name}' in filter policy")]
    InvalidName { kind: &'static str, name: String },

    #[error("Tag '{0}' cannot be both a no-close tag and an always-close tag")]
    ConflictingClosePolicy(String),

    #[error("Filter policy validation failed:\n{0}")]
    PolicyValidation(String),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterPolicy;

    #[test]
    fn test_yaml_errors_convert_into_yaml_variant() {
        let err = FilterPolicy::from_yaml_str("allowed_tags: [unterminated").unwrap_err();
        assert!(matches!(err, MarkguardError::YamlError(_)));
    }

    #[test]
    fn test_validation_errors_are_collected() {
        let err = FilterPolicy::default()
            .with_tag("my-tag", ["x"])
            .validate()
            .unwrap_err();
        assert!(matches!(err, MarkguardError::PolicyValidation(_)));
        assert!(err.to_string().contains("Invalid tag name 'my-tag'"));
    }
}
