//! Command-line interface definitions for dupsift.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Every flag that has a configuration-file counterpart is optional here, so that
//! only flags the user actually passed override the layered settings.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and print the numbered report
//! dupsift scan ~/Downloads
//!
//! # JSON output, sampling files above 8 MiB with 64 KiB windows
//! dupsift scan ~/Downloads --output json --sample-threshold 8MiB --sample-window 64KiB
//!
//! # Show the fingerprint the quick stage would compute for one file
//! dupsift hash --quick ~/Downloads/movie.mkv
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::scanner::DigestAlgorithm;

/// Duplicate file finder.
///
/// Files are compared by size first, then by a quick fingerprint that samples
/// large files, and finally by a digest of the whole content. Only files whose
/// full digests match are reported.
#[derive(Debug, Parser)]
#[command(name = "dupsift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and the report itself
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Report fatal errors as a JSON object on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupsift.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Print the fingerprint of a single file
    Hash(HashArgs),
    /// Print the effective settings as TOML
    Config,
}

/// Sampling and digest overrides shared by `scan` and `hash`.
#[derive(Debug, Default, Args)]
pub struct HashingArgs {
    /// Files larger than this are sampled in the quick stage (e.g., 3MiB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub sample_threshold: Option<u64>,

    /// Length of each sample window (e.g., 4KiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub sample_window: Option<u64>,

    /// Sample only the first and last window, not the middle one
    #[arg(long)]
    pub no_middle_sample: bool,

    /// Digest for whole-file fingerprints
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub digest: Option<DigestAlgorithm>,

    /// Digest for sampled fingerprints
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub quick_digest: Option<DigestAlgorithm>,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Output format (text for people, json/csv for scripting)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    #[command(flatten)]
    pub hashing: HashingArgs,

    /// Gitignore-style patterns to exclude (can be specified multiple times)
    ///
    /// These are added to the built-in VCS and marker-file exclusions.
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude_patterns: Vec<String>,

    /// Do not apply the built-in exclusions (.git/, .DS_Store, ...)
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: Symlinked files are reported as duplicates of their targets.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Abort on the first unreadable path instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the hash subcommand.
#[derive(Debug, Args)]
pub struct HashArgs {
    /// File to fingerprint
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Compute the quick-stage fingerprint (sampled for large files)
    #[arg(long)]
    pub quick: bool,

    #[command(flatten)]
    pub hashing: HashingArgs,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupsift::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("4KiB").unwrap(), 4096);
/// assert_eq!(parse_size("3MiB").unwrap(), 3 * 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    if num_str.is_empty() {
        return Err(format!("Invalid number: '{s}'"));
    }

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
