//! dupsift - duplicate file finder
//!
//! Finds files with identical content under a directory tree while reading
//! as little as possible: files are grouped by size, then by a quick
//! fingerprint that samples large files, and only the survivors are hashed
//! in full. Every reported group is confirmed by a whole-file digest.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use cli::{Cli, Commands, HashArgs, ScanArgs};
use config::Settings;
use duplicates::{DuplicateFinder, FinderConfig};
use error::ExitCode;
use output::{CsvOutput, JsonOutput, OutputFormat, TextOutput};
use progress::Progress;
use scanner::{HashMode, Hasher};

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns an error if settings are invalid, the scan root is unusable, a
/// candidate file cannot be hashed, or the report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Scan(args) => run_scan(settings, &args, cli.quiet),
        Commands::Hash(args) => run_hash(settings, &args),
        Commands::Config => {
            print!("{}", settings.to_toml()?);
            // Shown anyway so the offending values are visible
            if let Err(e) = settings.validate() {
                log::warn!("{e}");
            }
            Ok(ExitCode::Success)
        }
    }
}

fn run_scan(mut settings: Settings, args: &ScanArgs, quiet: bool) -> Result<ExitCode> {
    settings.apply_scan_args(args)?;

    let mut config = FinderConfig::default()
        .with_hashing(settings.hashing.clone())
        .with_walker_config(settings.walker_config())
        .with_strict(settings.strict);

    if !quiet && !args.no_progress && io::stderr().is_terminal() {
        config = config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(config)?;
    let (groups, summary) = finder
        .find_duplicates(&args.path)
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;

    let exit_code = ExitCode::for_scan(&groups, &summary);

    let stdout = io::stdout();
    let color = yansi::is_enabled() && stdout.is_terminal();
    let mut out = stdout.lock();
    match settings.output {
        OutputFormat::Text => TextOutput::new(&groups, &summary)
            .with_color(color)
            .write_to(&mut out)?,
        OutputFormat::Json => JsonOutput::new(&groups, &summary, exit_code).write_to(&mut out, true)?,
        OutputFormat::Csv => CsvOutput::new(&groups).write_to(&mut out)?,
    }
    out.flush()?;

    Ok(exit_code)
}

fn run_hash(mut settings: Settings, args: &HashArgs) -> Result<ExitCode> {
    settings.apply_hashing_args(&args.hashing)?;
    let hasher = Hasher::new(settings.hashing)?;

    let mode = if args.quick {
        HashMode::Quick
    } else {
        HashMode::Full
    };
    let fingerprint = hasher
        .fingerprint_path(&args.file, mode)
        .with_context(|| format!("Failed to hash {}", args.file.display()))?;

    log::info!(
        "{} {:?} fingerprint of {}",
        fingerprint.algorithm,
        fingerprint.kind,
        args.file.display()
    );
    println!("{}  {}", fingerprint.hex, args.file.display());
    Ok(ExitCode::Success)
}
