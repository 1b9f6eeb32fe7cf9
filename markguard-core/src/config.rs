//! Configuration management for `markguard-core`.
//!
//! This module defines the `FilterPolicy`: the allow-lists and toggles that decide
//! which markup survives sanitization. It handles serialization/deserialization of
//! YAML policies, loads the embedded default policy and validates user policies
//! before they reach the engine.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::errors::MarkguardError;
use crate::validators;

/// The complete, caller-supplied description of what the filter lets through.
///
/// A policy is plain data: it is never mutated by sanitization and can be shared
/// freely between threads. Every field is optional in YAML; missing sets are
/// empty and missing toggles take their documented defaults, so an empty file
/// yields a policy that strips every tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterPolicy {
    /// Tag name to the attribute names permitted on it.
    pub allowed_tags: BTreeMap<String, BTreeSet<String>>,
    /// Tags that are always emitted self-closing, e.g. `<img />`.
    pub no_close_tags: BTreeSet<String>,
    /// Tags that always need a separate closing tag; a trailing `/` is ignored.
    pub always_close_tags: BTreeSet<String>,
    /// Tags removed when they end up with no content, e.g. `<b></b>`.
    pub remove_blank_tags: BTreeSet<String>,
    /// Attributes whose values are URLs and must pass the protocol check.
    pub protocol_attributes: BTreeSet<String>,
    /// URL schemes allowed in protocol attributes.
    pub allowed_protocols: BTreeSet<String>,
    /// Named character references allowed through, without `&` and `;`.
    pub allowed_entities: BTreeSet<String>,
    /// Remove `<!-- -->` comments instead of keeping them.
    pub strip_comments: bool,
    /// Repair stray brackets into tags instead of escaping them.
    pub auto_repair_brackets: bool,
    /// Allow decimal/hex references to ASCII code points, e.g. `&#65;`.
    pub allow_numbered_entities: bool,
    /// Decode ASCII numeric references in text into literal characters.
    pub normalize_ascii_entities: bool,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            allowed_tags: BTreeMap::new(),
            no_close_tags: BTreeSet::new(),
            always_close_tags: BTreeSet::new(),
            remove_blank_tags: BTreeSet::new(),
            protocol_attributes: BTreeSet::new(),
            allowed_protocols: BTreeSet::new(),
            allowed_entities: BTreeSet::new(),
            strip_comments: true,
            auto_repair_brackets: true,
            allow_numbered_entities: true,
            normalize_ascii_entities: false,
        }
    }
}

impl FilterPolicy {
    /// Loads a filter policy from a YAML file and validates it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading filter policy from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file {}", path.display()))?;
        let policy = Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse policy file {}", path.display()))?;

        policy
            .validate()
            .with_context(|| format!("Invalid policy file {}", path.display()))?;
        info!(
            "Loaded policy with {} allowed tags from file {}.",
            policy.allowed_tags.len(),
            path.display()
        );

        Ok(policy)
    }

    /// Loads the built-in policy: a handful of inline formatting tags and
    /// `<a>` links restricted to http, https, ftp and mailto.
    pub fn load_default_policy() -> Result<Self> {
        debug!("Loading default policy from embedded string...");
        let default_yaml = include_str!("../config/default_policy.yaml");
        let policy = Self::from_yaml_str(default_yaml).context("Failed to parse default policy")?;

        debug!("Default policy allows {} tags.", policy.allowed_tags.len());
        Ok(policy)
    }

    /// Parses a policy from YAML without validating it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MarkguardError> {
        // An empty document deserializes to `null`, which means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Serializes the policy back to YAML, e.g. for `markguard policy show`.
    pub fn to_yaml(&self) -> Result<String, MarkguardError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Allows `tag` with the given attributes, merging with any attributes
    /// already allowed on it.
    pub fn with_tag<I, S>(mut self, tag: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags
            .entry(tag.to_string())
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn with_no_close_tag(mut self, tag: &str) -> Self {
        self.no_close_tags.insert(tag.to_string());
        self
    }

    pub fn with_always_close_tag(mut self, tag: &str) -> Self {
        self.always_close_tags.insert(tag.to_string());
        self
    }

    pub fn with_remove_blank_tag(mut self, tag: &str) -> Self {
        self.remove_blank_tags.insert(tag.to_string());
        self
    }

    pub fn with_protocol_attribute(mut self, attribute: &str) -> Self {
        self.protocol_attributes.insert(attribute.to_string());
        self
    }

    pub fn with_protocol(mut self, scheme: &str) -> Self {
        self.allowed_protocols.insert(scheme.to_string());
        self
    }

    pub fn with_entity(mut self, name: &str) -> Self {
        self.allowed_entities.insert(name.to_string());
        self
    }

    /// Checks that every name in the policy can actually be matched and that
    /// the closing-policy sets do not contradict each other.
    pub fn validate(&self) -> Result<(), MarkguardError> {
        let mut errors: Vec<MarkguardError> = Vec::new();
        let mut check = |kind: &'static str, name: &str, valid: fn(&str) -> bool| {
            if !valid(name) {
                errors.push(MarkguardError::InvalidName { kind, name: name.to_string() });
            }
        };

        for (tag, attributes) in &self.allowed_tags {
            check("tag", tag, validators::is_valid_markup_name);
            for attribute in attributes {
                check("attribute", attribute, validators::is_valid_markup_name);
            }
        }
        for tag in self.no_close_tags.iter().chain(&self.always_close_tags).chain(&self.remove_blank_tags) {
            check("tag", tag, validators::is_valid_markup_name);
        }
        for attribute in &self.protocol_attributes {
            check("attribute", attribute, validators::is_valid_markup_name);
        }
        for scheme in &self.allowed_protocols {
            check("protocol", scheme, validators::is_valid_scheme);
        }
        for entity in &self.allowed_entities {
            check("entity", entity, validators::is_valid_entity_name);
        }

        let always_close: BTreeSet<String> =
            self.always_close_tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        for tag in &self.no_close_tags {
            if always_close.contains(&tag.to_ascii_lowercase()) {
                errors.push(MarkguardError::ConflictingClosePolicy(tag.clone()));
            }
        }

        let allowed: BTreeSet<String> =
            self.allowed_tags.keys().map(|t| t.to_ascii_lowercase()).collect();
        for (list, tags) in [
            ("no_close_tags", &self.no_close_tags),
            ("always_close_tags", &self.always_close_tags),
            ("remove_blank_tags", &self.remove_blank_tags),
        ] {
            for tag in tags.iter().filter(|t| !allowed.contains(&t.to_ascii_lowercase())) {
                warn!("Tag '{}' in `{}` is not an allowed tag and has no effect.", tag, list);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            let message = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
            Err(MarkguardError::PolicyValidation(message))
        }
    }
}
