// File: markguard-core/src/validators.rs
//! Syntactic checks for the names that appear in a `FilterPolicy`.
//!
//! The classifier only ever recognizes ASCII alphanumeric tag and attribute
//! names, so a policy entry like `"my-tag"` could never match anything. These
//! checks let policy loading reject such entries up front instead of silently
//! carrying dead configuration.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

static SCHEME_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*$").unwrap());

static ENTITY_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap());

/// Returns `true` if `name` can be matched as a tag or attribute name.
pub fn is_valid_markup_name(name: &str) -> bool {
    MARKUP_NAME.is_match(name)
}

/// Returns `true` if `scheme` is a syntactically valid URL scheme (RFC 3986, section 3.1).
pub fn is_valid_scheme(scheme: &str) -> bool {
    SCHEME_NAME.is_match(scheme)
}

/// Returns `true` if `name` is usable as a named character reference, e.g. `amp` or `nbsp`.
pub fn is_valid_entity_name(name: &str) -> bool {
    ENTITY_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_names() {
        assert!(is_valid_markup_name("a"));
        assert!(is_valid_markup_name("H1"));
        assert!(!is_valid_markup_name(""));
        assert!(!is_valid_markup_name("data-id"));
        assert!(!is_valid_markup_name("on click"));
    }

    #[test]
    fn test_schemes() {
        assert!(is_valid_scheme("https"));
        assert!(is_valid_scheme("svn+ssh"));
        assert!(!is_valid_scheme("1http"));
        assert!(!is_valid_scheme("java script"));
    }

    #[test]
    fn test_entity_names() {
        assert!(is_valid_entity_name("amp"));
        assert!(is_valid_entity_name("frac12"));
        assert!(!is_valid_entity_name("#65"));
        assert!(!is_valid_entity_name("amp;"));
    }
}
