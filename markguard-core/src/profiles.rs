// File: markguard-core/src/profiles.rs

//! profiles.rs - Named policy profiles for markguard.
//!
//! A profile is a small YAML document that adjusts a base `FilterPolicy`
//! instead of replacing it: it can allow extra tags (with their attributes and
//! closing behavior), forbid tags, add or remove URL schemes and named
//! entities, and override the policy toggles. This keeps site-specific needs
//! ("comments may contain images", "bios may not contain links") out of the
//! base policy.
//!
//! Profiles are looked up by name in a fixed list of directories, or loaded
//! directly from a path.
//!
//! license: MIT OR Apache-2.0

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::FilterPolicy;
use crate::validators;

/// The top-level structure of a profile file.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct PolicyProfile {
    pub profile_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub version: String,
    /// Tags to allow, or to adjust when already allowed.
    pub tags: BTreeMap<String, ProfileTag>,
    /// Tags to forbid, along with any closing or blank-removal rules for them.
    pub remove_tags: Vec<String>,
    pub add_protocols: Vec<String>,
    pub remove_protocols: Vec<String>,
    pub add_entities: Vec<String>,
    pub remove_entities: Vec<String>,
    pub strip_comments: Option<bool>,
    pub auto_repair_brackets: Option<bool>,
    pub allow_numbered_entities: Option<bool>,
    pub normalize_ascii_entities: Option<bool>,
}

/// How a profile wants one tag treated.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct ProfileTag {
    /// Attributes allowed on the tag, added to any the base policy allows.
    pub attributes: Vec<String>,
    /// Attributes among `attributes` whose values are URLs.
    pub protocol_attributes: Vec<String>,
    /// Closing behavior; absent keeps the base policy's choice.
    pub close: Option<CloseMode>,
    /// Whether the tag is removed when empty; absent keeps the base policy's choice.
    pub remove_blank: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CloseMode {
    /// Self-closing only when written that way.
    Auto,
    /// Always self-closing, e.g. `<br />`.
    Never,
    /// Always needs a separate closing tag.
    Always,
}

impl PolicyProfile {
    pub fn validate(&self) -> Result<()> {
        if self.profile_name.trim().is_empty() {
            bail!("Profile validation failed: 'profile_name' field cannot be empty.");
        }
        if self.version.trim().is_empty() {
            bail!("Profile '{}' validation failed: 'version' field cannot be empty.", self.profile_name);
        }

        for (tag, spec) in &self.tags {
            if !validators::is_valid_markup_name(tag) {
                bail!("Profile '{}' validation failed: invalid tag name '{}'.", self.profile_name, tag);
            }
            for attribute in spec.attributes.iter().chain(&spec.protocol_attributes) {
                if !validators::is_valid_markup_name(attribute) {
                    bail!(
                        "Profile '{}' validation failed: invalid attribute name '{}' on tag '{}'.",
                        self.profile_name, attribute, tag
                    );
                }
            }
            for attribute in &spec.protocol_attributes {
                if !spec.attributes.iter().any(|a| a.eq_ignore_ascii_case(attribute)) {
                    warn!(
                        "Profile '{}': protocol attribute '{}' on tag '{}' is not in its attribute list.",
                        self.profile_name, attribute, tag
                    );
                }
            }
            if self.remove_tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                bail!(
                    "Profile '{}' validation failed: tag '{}' is both allowed and removed.",
                    self.profile_name, tag
                );
            }
        }

        for scheme in self.add_protocols.iter().chain(&self.remove_protocols) {
            if !validators::is_valid_scheme(scheme) {
                bail!("Profile '{}' validation failed: invalid protocol '{}'.", self.profile_name, scheme);
            }
        }
        for entity in self.add_entities.iter().chain(&self.remove_entities) {
            if !validators::is_valid_entity_name(entity) {
                bail!("Profile '{}' validation failed: invalid entity name '{}'.", self.profile_name, entity);
            }
        }

        Ok(())
    }
}

/// Directories searched for profiles, most specific first.
fn profile_dirs() -> Vec<PathBuf> {
    vec![
        dirs::home_dir().map(|p| p.join(".markguard").join("profiles")),
        dirs::config_dir().map(|p| p.join("markguard").join("profiles")),
        Some(PathBuf::from("/etc/markguard/profiles")),
        Some(PathBuf::from("./config")),
        Some(PathBuf::from("../config")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn profile_candidate_paths(name: &str) -> Vec<PathBuf> {
    profile_dirs()
        .into_iter()
        .map(|dir| dir.join(format!("{}.yaml", name)))
        .collect()
}

/// Loads a profile from a file path, or by name from the profile directories.
/// The profile is validated before it is returned.
pub fn load_profile_by_name(name_or_path: &str) -> Result<PolicyProfile> {
    debug!("Attempting to load profile from: '{}'", name_or_path);

    let path_to_load = {
        let path = Path::new(name_or_path);
        if path.is_file() {
            debug!("Input is a valid file path. Loading directly from: {}", path.display());
            Some(path.to_path_buf())
        } else {
            profile_candidate_paths(name_or_path)
                .into_iter()
                .find(|p| p.exists())
        }
    }
    .with_context(|| {
        format!(
            "Profile '{}' not found. It is not a valid file path, and was not found in expected locations.",
            name_or_path
        )
    })?;

    let text = fs::read_to_string(&path_to_load)
        .with_context(|| format!("reading profile file {}", path_to_load.display()))?;
    let profile: PolicyProfile = serde_yml::from_str(&text)
        .with_context(|| format!("parsing profile YAML {}", path_to_load.display()))?;
    profile.validate()?;

    debug!("Successfully loaded profile '{}'.", profile.profile_name);
    Ok(profile)
}

fn remove_ignore_case(set: &mut BTreeSet<String>, name: &str) {
    set.retain(|item| !item.eq_ignore_ascii_case(name));
}

/// Returns `base` adjusted by `profile`.
///
/// Removals are applied after additions, so a scheme listed in both
/// `add_protocols` and `remove_protocols` ends up removed.
pub fn apply_profile_to_policy(profile: &PolicyProfile, mut base: FilterPolicy) -> FilterPolicy {
    debug!("Applying profile '{}' to filter policy.", profile.profile_name);

    for (tag, spec) in &profile.tags {
        base.allowed_tags
            .entry(tag.clone())
            .or_default()
            .extend(spec.attributes.iter().cloned());
        base.protocol_attributes
            .extend(spec.protocol_attributes.iter().cloned());

        if let Some(close) = spec.close {
            remove_ignore_case(&mut base.no_close_tags, tag);
            remove_ignore_case(&mut base.always_close_tags, tag);
            match close {
                CloseMode::Auto => {}
                CloseMode::Never => {
                    base.no_close_tags.insert(tag.clone());
                }
                CloseMode::Always => {
                    base.always_close_tags.insert(tag.clone());
                }
            }
        }
        match spec.remove_blank {
            Some(true) => {
                base.remove_blank_tags.insert(tag.clone());
            }
            Some(false) => remove_ignore_case(&mut base.remove_blank_tags, tag),
            None => {}
        }
    }

    for tag in &profile.remove_tags {
        let before = base.allowed_tags.len();
        base.allowed_tags.retain(|allowed, _| !allowed.eq_ignore_ascii_case(tag));
        if base.allowed_tags.len() == before {
            warn!(
                "Profile '{}' removes tag '{}', which the policy does not allow. It will be ignored.",
                profile.profile_name, tag
            );
        }
        remove_ignore_case(&mut base.no_close_tags, tag);
        remove_ignore_case(&mut base.always_close_tags, tag);
        remove_ignore_case(&mut base.remove_blank_tags, tag);
    }

    base.allowed_protocols.extend(profile.add_protocols.iter().cloned());
    for scheme in &profile.remove_protocols {
        remove_ignore_case(&mut base.allowed_protocols, scheme);
    }

    base.allowed_entities.extend(profile.add_entities.iter().cloned());
    for entity in &profile.remove_entities {
        // Entity names are case-sensitive.
        base.allowed_entities.remove(entity);
    }

    if let Some(v) = profile.strip_comments {
        base.strip_comments = v;
    }
    if let Some(v) = profile.auto_repair_brackets {
        base.auto_repair_brackets = v;
    }
    if let Some(v) = profile.allow_numbered_entities {
        base.allow_numbered_entities = v;
    }
    if let Some(v) = profile.normalize_ascii_entities {
        base.normalize_ascii_entities = v;
    }

    debug!("Finished applying profile. Allowed tag count: {}", base.allowed_tags.len());
    base
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileSummary {
    pub profile_name: String,
    pub display_name: Option<String>,
    pub version: String,
    pub description: Option<String>,
    pub path: Option<PathBuf>,
}

/// List available profiles by scanning the profile directories for `*.yaml`.
pub fn list_available_profiles() -> Vec<ProfileSummary> {
    list_profiles_in(&profile_dirs())
}

/// Best-effort scan of `dirs` for parseable profile files. Unreadable or
/// malformed files are logged and skipped.
pub fn list_profiles_in(dirs: &[PathBuf]) -> Vec<ProfileSummary> {
    let mut out = Vec::new();
    let mut seen_paths: HashSet<PathBuf> = HashSet::new();

    for dir in dirs {
        let Ok(entries) = fs::read_dir(dir) else {
            debug!("Candidate profile directory not found: {}", dir.display());
            continue;
        };
        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("yaml"))
            .collect();
        paths.sort();

        for path in paths {
            if !seen_paths.insert(path.clone()) {
                continue;
            }
            debug!("Found potential profile at: {}", path.display());
            match fs::read_to_string(&path) {
                Ok(s) => match serde_yml::from_str::<PolicyProfile>(&s) {
                    Ok(profile) if !profile.profile_name.is_empty() => out.push(ProfileSummary {
                        profile_name: profile.profile_name,
                        display_name: profile.display_name,
                        version: profile.version,
                        description: profile.description,
                        path: Some(path),
                    }),
                    _ => warn!("Failed to parse YAML for profile at: {}", path.display()),
                },
                Err(e) => warn!("Failed to read profile file at '{}': {}", path.display(), e),
            }
        }
    }
    out
}
