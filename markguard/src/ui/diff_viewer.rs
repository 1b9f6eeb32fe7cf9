// markguard/src/ui/diff_viewer.rs
//! Unified diff between the raw input and the sanitized output.

use anyhow::Result;
use diffy::{create_patch, Line as DiffLine};
use std::io::Write;

use crate::ui::output_format::paint;
use crate::ui::theme::{ThemeEntry, ThemeMap};

/// Writes a line-oriented diff of `original` against `sanitized` to `writer`.
/// Removed lines are prefixed `-`, added lines `+`.
pub fn print_diff<W: Write>(
    original: &str,
    sanitized: &str,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> Result<()> {
    writeln!(writer, "{}", paint("--- Diff View ---", ThemeEntry::DiffHeader, theme, supports_color))?;

    let patch = create_patch(original, sanitized);
    let mut changed = false;
    for hunk in patch.hunks() {
        for line in hunk.lines() {
            match line {
                DiffLine::Delete(s) => {
                    changed = true;
                    let text = format!("-{}", s.trim_end_matches('\n'));
                    writeln!(writer, "{}", paint(&text, ThemeEntry::DiffRemoved, theme, supports_color))?;
                }
                DiffLine::Insert(s) => {
                    changed = true;
                    let text = format!("+{}", s.trim_end_matches('\n'));
                    writeln!(writer, "{}", paint(&text, ThemeEntry::DiffAdded, theme, supports_color))?;
                }
                DiffLine::Context(s) => writeln!(writer, " {}", s.trim_end_matches('\n'))?,
            }
        }
    }

    if !changed {
        writeln!(writer, "No changes.")?;
    }
    writeln!(writer, "{}", paint("-----------------", ThemeEntry::DiffHeader, theme, supports_color))?;
    Ok(())
}
