// markguard/src/main.rs
//! Markguard entry point.
//!
//! Parses the CLI, sets up logging and the theme, then dispatches the subcommand.

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use markguard::cli::{Cli, Commands, PolicyCommand, ProfilesCommand};
use markguard::commands::policy::{resolve_policy, run_policy_check, run_policy_show, run_profiles_list};
use markguard::commands::sanitize::{error_msg, read_input, run_sanitize_opts, SanitizeOptions};
use markguard::logger;
use markguard::ui::theme::{build_theme_map, ThemeMap, ThemeStyle};
use markguard_core::MarkupEngine;

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        Some(LevelFilter::Debug)
    } else if cli.quiet {
        Some(LevelFilter::Error)
    } else {
        None
    };
    logger::init_logger(level);

    let theme_map = match build_theme_map(cli.theme.as_ref()).context("Theme error") {
        Ok(theme_map) => theme_map,
        Err(e) => {
            error_msg(format!("{:#}", e), &ThemeStyle::default_theme_map());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, &theme_map) {
        error_msg(format!("{:#}", e), &theme_map);
        std::process::exit(1);
    }
}

fn run(cli: Cli, theme_map: &ThemeMap) -> Result<()> {
    match cli.command {
        Commands::Sanitize(cmd) => {
            let policy = resolve_policy(&cmd.source)?;
            let engine = MarkupEngine::new(policy);
            let input = read_input(cmd.input_file.as_ref())?;
            run_sanitize_opts(
                &engine,
                SanitizeOptions {
                    input,
                    diff: cmd.diff,
                    output_path: cmd.output,
                    json_report: cmd.json_report,
                    no_summary: cmd.no_summary,
                    quiet: cli.quiet,
                },
                theme_map,
            )
        }
        Commands::Policy(PolicyCommand::Show { source }) => run_policy_show(&source),
        Commands::Policy(PolicyCommand::Check { path }) => run_policy_check(&path, theme_map, cli.quiet),
        Commands::Profiles(ProfilesCommand::List) => run_profiles_list(theme_map),
    }
}
