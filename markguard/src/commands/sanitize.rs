// markguard/src/commands/sanitize.rs
//! The `sanitize` command: read markup, filter it, write the result.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use markguard_core::{FilterReport, FilterSummaryItem, SanitizationEngine};

use crate::ui::diff_viewer;
use crate::ui::filter_summary;
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// Options for a single sanitize run.
pub struct SanitizeOptions {
    pub input: String,
    pub diff: bool,
    pub output_path: Option<PathBuf>,
    pub json_report: Option<PathBuf>,
    pub no_summary: bool,
    pub quiet: bool,
}

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_error_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_warn_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Reads the whole input from `path`, or from stdin when no path is given.
pub fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

/// Shape of the `--json-report` file.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub total_changes: usize,
    pub actions: &'a [FilterSummaryItem],
}

/// Runs the engine over `opts.input` and routes output, diff, summary and
/// report to their destinations.
pub fn run_sanitize_opts(
    engine: &dyn SanitizationEngine,
    opts: SanitizeOptions,
    theme_map: &ThemeMap,
) -> Result<()> {
    info!("Starting markguard sanitize operation.");

    let (sanitized_content, report) = engine.sanitize_with_report(&opts.input);

    debug!(
        "Content sanitized. Original length: {}, Sanitized length: {}",
        opts.input.len(),
        sanitized_content.len()
    );

    handle_primary_output(&opts, &sanitized_content, theme_map)?;
    handle_json_report(&opts, &sanitized_content, &report, theme_map)?;
    handle_filter_summary(&report, &opts, theme_map)?;

    info!("Markguard sanitize operation completed.");
    Ok(())
}

fn handle_primary_output(
    opts: &SanitizeOptions,
    sanitized_content: &str,
    theme_map: &ThemeMap,
) -> Result<()> {
    if let Some(path) = &opts.output_path {
        if !opts.quiet {
            info_msg(format!("Writing sanitized content to file: {}", path.display()), theme_map);
        }
        let mut file = fs::File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;

        if opts.diff {
            diff_viewer::print_diff(&opts.input, sanitized_content, &mut file, theme_map, false)?;
        } else {
            file.write_all(sanitized_content.as_bytes())
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        }
    } else {
        let stdout = io::stdout();
        let supports_color = stdout.is_terminal();
        let mut writer = stdout.lock();

        if opts.diff {
            diff_viewer::print_diff(&opts.input, sanitized_content, &mut writer, theme_map, supports_color)?;
        } else {
            writer.write_all(sanitized_content.as_bytes())?;
        }
        writer.flush()?;
    }
    Ok(())
}

fn handle_json_report(
    opts: &SanitizeOptions,
    sanitized_content: &str,
    report: &FilterReport,
    theme_map: &ThemeMap,
) -> Result<()> {
    let Some(path) = &opts.json_report else {
        return Ok(());
    };
    let actions = report.summary();
    let json = serde_json::to_string_pretty(&JsonReport {
        input_bytes: opts.input.len(),
        output_bytes: sanitized_content.len(),
        total_changes: report.total(),
        actions: &actions,
    })
    .context("Failed to serialize filter report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;
    if !opts.quiet {
        info_msg(format!("Filter report written to {}", path.display()), theme_map);
    }
    Ok(())
}

fn handle_filter_summary(
    report: &FilterReport,
    opts: &SanitizeOptions,
    theme_map: &ThemeMap,
) -> Result<()> {
    if !opts.no_summary && !opts.quiet {
        let stderr_supports_color = io::stderr().is_terminal();
        filter_summary::print_summary(&report.summary(), &mut io::stderr(), theme_map, stderr_supports_color)?;
    }
    Ok(())
}
