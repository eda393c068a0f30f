//! Logging infrastructure for dupsift.
//!
//! This module provides structured logging using the `log` facade and the
//! `env_logger` backend. Logs go to stderr so they never mix with a report
//! written to stdout. Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Verbosity flags only raise the level of dupsift's own records; other
//! crates log at warn and above unless `RUST_LOG` says otherwise.
//!
//! # Example
//!
//! ```rust,no_run
//! use dupsift::logging::init_logging;
//!
//! // Initialize with verbose mode (-v)
//! init_logging(1, false);
//! log::debug!("Hashing started");
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Crate whose records follow the CLI verbosity. Dependencies stay at warn.
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Call once at startup, before any logging calls are made. Later calls
/// leave the first logger in place.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=info, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
pub fn init_logging(verbose: u8, quiet: bool) {
    let rust_log = env::var("RUST_LOG").ok();
    let level = determine_level(verbose, quiet);

    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    match &rust_log {
        Some(filters) => {
            builder.parse_filters(filters);
        }
        None => {
            // `ignore` and `globset` log every pattern match at debug/trace
            builder
                .filter_level(level.min(LevelFilter::Warn))
                .filter_module(CRATE_TARGET, level);
        }
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    match rust_log {
        Some(filters) => log::debug!("Log filters taken from RUST_LOG: {filters}"),
        None => log::debug!("Logging initialized at level: {level}"),
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Configure the log format based on build type and verbosity.
///
/// Debug builds prefix a timestamp, and with `-v` the module path as well.
fn configure_format(builder: &mut Builder, verbose: u8) {
    let timestamps = cfg!(debug_assertions);
    let module_paths = timestamps && verbose >= 1;

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);

        if timestamps {
            let timestamp = buf.timestamp_seconds();
            write!(buf, "{timestamp} ")?;
        }
        write!(buf, "{style}{level:<5}{style:#} ")?;
        if module_paths {
            write!(buf, "[{}] ", record.module_path().unwrap_or("unknown"))?;
        }
        writeln!(buf, "{}", record.args())
    });
}
