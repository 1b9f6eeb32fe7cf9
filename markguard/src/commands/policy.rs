// markguard/src/commands/policy.rs
//! `policy show`, `policy check` and `profiles list`, plus the policy
//! resolution shared with `sanitize`.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::io::{self, Write};
use std::path::Path;

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use markguard_core::{
    apply_profile_to_policy,
    list_available_profiles,
    load_profile_by_name,
    FilterPolicy,
    ProfileSummary,
};

use crate::cli::PolicySource;
use crate::commands::sanitize::{info_msg, warn_msg};
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// Builds the effective policy: the policy file (or the built-in default),
/// then the profile on top, then validation.
pub fn resolve_policy(source: &PolicySource) -> Result<FilterPolicy> {
    let base = match &source.policy {
        Some(path) => {
            debug!("Loading policy from {}", path.display());
            FilterPolicy::load_from_file(path)?
        }
        None => FilterPolicy::load_default_policy()?,
    };

    let policy = match &source.profile {
        Some(name) => {
            let profile = load_profile_by_name(name)
                .with_context(|| format!("Failed to load profile '{}'", name))?;
            info!("Applying profile '{}' (version {})", profile.profile_name, profile.version);
            apply_profile_to_policy(&profile, base)
        }
        None => base,
    };

    policy
        .validate()
        .context("The effective policy is invalid after applying the profile")?;
    Ok(policy)
}

/// Prints the effective policy as YAML to stdout.
pub fn run_policy_show(source: &PolicySource) -> Result<()> {
    let policy = resolve_policy(source)?;
    let yaml = policy.to_yaml().context("Failed to serialize policy")?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(yaml.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Loads and validates a policy file, reporting a short description on success.
pub fn run_policy_check(path: &Path, theme_map: &ThemeMap, quiet: bool) -> Result<()> {
    let policy = FilterPolicy::load_from_file(path)?;
    if !quiet {
        let msg = format!(
            "Policy '{}' is valid: {} tags, {} protocols, {} entities.",
            path.display(),
            policy.allowed_tags.len(),
            policy.allowed_protocols.len(),
            policy.allowed_entities.len()
        );
        let _ = output_format::print_success_message(&mut io::stderr(), &msg, theme_map, io::stderr().is_terminal());
    }
    Ok(())
}

/// Lists discovered profiles as a table on stdout.
pub fn run_profiles_list(theme_map: &ThemeMap) -> Result<()> {
    let profiles = list_available_profiles();
    if profiles.is_empty() {
        warn_msg("No profiles found.", theme_map);
        return Ok(());
    }
    info_msg(format!("Found {} profile(s).", profiles.len()), theme_map);

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", profiles_table(&profiles))?;
    Ok(())
}

fn profiles_table(profiles: &[ProfileSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Version", "Description", "Path"]);
    for profile in profiles {
        table.add_row(vec![
            profile.display_name.clone().unwrap_or_else(|| profile.profile_name.clone()),
            profile.version.clone(),
            profile.description.clone().unwrap_or_default(),
            profile.path.as_ref().map(|p| p.display().to_string()).unwrap_or_default(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use test_log::test;

    #[test]
    fn resolve_default_policy_without_overrides() -> Result<()> {
        let policy = resolve_policy(&PolicySource::default())?;
        assert_eq!(policy, FilterPolicy::load_default_policy()?);
        Ok(())
    }

    #[test]
    fn resolve_applies_profile_over_policy_file() -> Result<()> {
        let dir = tempdir()?;
        let policy_path = dir.path().join("policy.yaml");
        fs::write(&policy_path, "allowed_tags:\n  b: []\n  i: []\n")?;
        let profile_path = dir.path().join("no-italics.yaml");
        fs::write(&profile_path, "profile_name: no-italics\nversion: '1'\nremove_tags: [i]\n")?;

        let policy = resolve_policy(&PolicySource {
            policy: Some(policy_path),
            profile: Some(profile_path.to_string_lossy().into_owned()),
        })?;
        assert!(policy.allowed_tags.contains_key("b"));
        assert!(!policy.allowed_tags.contains_key("i"));
        Ok(())
    }

    #[test]
    fn resolve_reports_missing_profile() {
        let err = resolve_policy(&PolicySource { policy: None, profile: Some("nope-not-here".into()) }).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load profile 'nope-not-here'"));
    }
}
