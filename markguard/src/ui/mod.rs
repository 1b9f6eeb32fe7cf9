// markguard/src/ui/mod.rs
pub mod diff_viewer;
pub mod filter_summary;
pub mod output_format;
pub mod theme;
