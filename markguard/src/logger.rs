// markguard/src/logger.rs
//! Logger setup for the markguard binary.
//!
//! `RUST_LOG` is honored as the base filter. An explicit level (from `--debug`
//! or `--quiet`) is applied to the markguard crates on top of it.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

const CRATES: [&str; 2] = ["markguard", "markguard_core"];

/// Initializes the global logger. Safe to call more than once; later calls are no-ops.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        for krate in CRATES {
            builder.filter_module(krate, level);
        }
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{} {}] {}",
            record.level(),
            record.target(),
            record.args()
        )
    });
    let _ = builder.try_init();
}
