// markguard-core/tests/profile_tests.rs
use anyhow::Result;
use std::fs;
use tempfile::tempdir;

use markguard_core::config::FilterPolicy;
use markguard_core::profiles::*;
use markguard_core::sanitize;

const IMAGES_PROFILE: &str = r#"
profile_name: images
display_name: Images allowed
description: Lets comments embed https images.
version: "1.0"
tags:
  img:
    attributes: [src, alt]
    protocol_attributes: [src]
    close: never
remove_protocols: [http, ftp]
"#;

#[test]
fn test_load_profile_by_path_and_apply() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("images.yaml");
    fs::write(&path, IMAGES_PROFILE)?;

    let profile = load_profile_by_name(path.to_str().unwrap())?;
    assert_eq!(profile.profile_name, "images");
    assert_eq!(profile.tags["img"].close, Some(CloseMode::Never));

    let policy = apply_profile_to_policy(&profile, FilterPolicy::load_default_policy()?);
    policy.validate()?;

    assert_eq!(
        sanitize(r#"<img src="https://x/cat.png" alt="cat">"#, &policy),
        r#"<img src="https://x/cat.png" alt="cat" />"#
    );
    assert_eq!(
        sanitize(r#"<a href="http://x/">x</a>"#, &policy),
        r##"<a href="#//x/">x</a>"##
    );
    Ok(())
}

#[test]
fn test_load_profile_rejects_invalid_profile() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "profile_name: broken\nversion: ''\n")?;

    let err = load_profile_by_name(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("'version' field cannot be empty"));
    Ok(())
}

#[test]
fn test_load_unknown_profile_fails() {
    let err = load_profile_by_name("no-such-profile-anywhere").unwrap_err();
    assert!(err.to_string().contains("Profile 'no-such-profile-anywhere' not found"));
}

#[test]
fn test_list_profiles_in_skips_unparseable_files() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("images.yaml"), IMAGES_PROFILE)?;
    fs::write(dir.path().join("strict.yaml"), "profile_name: strict\nversion: '2'\nremove_tags: [a]\n")?;
    fs::write(dir.path().join("garbage.yaml"), "tags: [not, a, map]\n")?;
    fs::write(dir.path().join("notes.txt"), "profile_name: ignored\n")?;

    let summaries = list_profiles_in(&[dir.path().to_path_buf(), dir.path().join("missing")]);
    let names: Vec<_> = summaries.iter().map(|s| s.profile_name.as_str()).collect();
    assert_eq!(names, vec!["images", "strict"]);
    assert_eq!(summaries[0].display_name.as_deref(), Some("Images allowed"));
    assert_eq!(summaries[1].version, "2");
    Ok(())
}

#[test]
fn test_profile_toggles_override_policy() -> Result<()> {
    let profile: PolicyProfile = serde_yml::from_str(
        "profile_name: plain\nversion: '1'\nallow_numbered_entities: false\nremove_tags: [a, b, i, u, em, code, strong]\n",
    )?;
    let policy = apply_profile_to_policy(&profile, FilterPolicy::load_default_policy()?);
    assert!(policy.allowed_tags.is_empty());
    assert!(policy.always_close_tags.is_empty());
    assert_eq!(sanitize("<b>&#65;</b>", &policy), "&amp;#65;");
    Ok(())
}
