// markguard/src/cli.rs
//! This file defines the command-line interface (CLI) for the markguard application,
//! including all available commands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "markguard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Filter untrusted markup down to an allow-listed subset of HTML",
    long_about = "Markguard filters untrusted, user-authored rich text (comments, posts, profiles) so it can be embedded in a trusted page. Only allow-listed tags and attributes survive, URL attributes are limited to allowed schemes, every ampersand becomes a valid entity, and the output is always tag-balanced.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG for markguard crates to DEBUG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, env = "MARKGUARD_THEME", help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `markguard` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitizes an input file or stdin.
    #[command(about = "Sanitizes an input file or stdin against a filter policy.")]
    Sanitize(SanitizeCommand),

    /// Inspects and validates filter policies.
    #[command(subcommand, about = "Inspects and validates filter policies.")]
    Policy(PolicyCommand),

    /// Provides tools for managing policy profiles.
    #[command(subcommand, about = "Provides tools for managing policy profiles.")]
    Profiles(ProfilesCommand),
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug)]
pub struct SanitizeCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write sanitized output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub source: PolicySource,

    /// Show a unified diff to highlight the changes made.
    #[arg(long, short = 'D', help = "Show a unified diff to highlight the changes made.")]
    pub diff: bool,

    /// Suppress the filter summary.
    #[arg(long = "no-summary", help = "Suppress the filter summary printed to stderr.")]
    pub no_summary: bool,

    /// Export the filter report as JSON.
    #[arg(long = "json-report", value_name = "FILE", help = "Export the counts of every change made to a JSON file.")]
    pub json_report: Option<PathBuf>,
}

/// Where the effective policy comes from. Shared by `sanitize` and `policy show`.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct PolicySource {
    /// Path to a custom policy file (YAML).
    #[arg(long = "policy", value_name = "FILE", env = "MARKGUARD_POLICY", help = "Path to a custom filter policy file (YAML). Replaces the built-in default policy.")]
    pub policy: Option<PathBuf>,

    /// Loads a profile and applies it on top of the base policy.
    #[arg(long = "profile", value_name = "NAME", help = "Apply a profile (by name or path) on top of the base policy.")]
    pub profile: Option<String>,
}

/// Subcommands for the `policy` command.
#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    #[command(about = "Prints the effective filter policy as YAML.")]
    Show {
        #[command(flatten)]
        source: PolicySource,
    },
    #[command(about = "Validates a filter policy file.")]
    Check {
        /// The path to the policy YAML file to validate.
        #[arg(value_name = "FILE", help = "The path to the policy YAML file to validate.")]
        path: PathBuf,
    },
}

/// Subcommands for the `profiles` command.
#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    #[command(about = "Lists all available local profiles.")]
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sanitize_with_policy_and_profile() {
        let cli = Cli::try_parse_from([
            "markguard", "--quiet", "sanitize", "-i", "in.html", "--policy", "p.yaml", "--profile", "images", "--diff",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Sanitize(cmd) => {
                assert_eq!(cmd.input_file, Some(PathBuf::from("in.html")));
                assert_eq!(cmd.source.policy, Some(PathBuf::from("p.yaml")));
                assert_eq!(cmd.source.profile.as_deref(), Some("images"));
                assert!(cmd.diff);
                assert!(!cmd.no_summary);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn quiet_and_debug_conflict() {
        assert!(Cli::try_parse_from(["markguard", "-q", "-d", "profiles", "list"]).is_err());
    }
}
