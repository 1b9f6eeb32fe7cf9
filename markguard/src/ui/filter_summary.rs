// markguard/src/ui/filter_summary.rs
//! Table of the changes a sanitization run made, printed to stderr.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use std::io::{self, Write};

use markguard_core::FilterSummaryItem;

use crate::ui::output_format::paint;
use crate::ui::theme::{ThemeEntry, ThemeMap};

/// Prints the filter summary, or a one-line note when nothing changed.
pub fn print_summary<W: Write>(
    summary: &[FilterSummaryItem],
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    if summary.is_empty() {
        return writeln!(
            writer,
            "{}",
            paint("No changes were needed; input already conforms to the policy.", ThemeEntry::Success, theme, supports_color)
        );
    }

    writeln!(writer, "{}", paint("Filter Summary:", ThemeEntry::Header, theme, supports_color))?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Action", "Occurrences"]);

    for item in summary {
        table.add_row(vec![
            Cell::new(paint(item.action.label(), ThemeEntry::SummaryAction, theme, supports_color)),
            Cell::new(paint(&item.occurrences.to_string(), ThemeEntry::SummaryOccurrences, theme, supports_color))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    let total: usize = summary.iter().map(|item| item.occurrences).sum();
    writeln!(writer, "{}", table)?;
    writeln!(writer, "Total changes: {}", total)
}
