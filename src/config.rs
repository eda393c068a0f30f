//! Layered application settings.
//!
//! Settings are merged from, lowest priority first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config FILE`, or `config.toml` in the platform config
//!    directory when it exists)
//! 3. `DUPSIFT_*` environment variables, `__` separating nested keys
//!    (`DUPSIFT_HASHING__SAMPLE_WINDOW=65536`)
//! 4. command-line flags
//!
//! ```toml
//! strict = false
//! output = "text"
//!
//! [hashing]
//! sample_threshold = 3145728
//! sample_window = 4096
//! sample_middle = true
//! digest = "blake3"
//! quick_digest = "blake3"
//!
//! [walk]
//! exclude = ["node_modules/", "*.part"]
//! skip_hidden = false
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{HashingArgs, ScanArgs};
use crate::output::OutputFormat;
use crate::scanner::{HashConfig, HashConfigError, WalkerConfig};

/// Prefix of environment variables read into [`Settings`].
pub const ENV_PREFIX: &str = "DUPSIFT_";

/// Errors raised while loading settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// A config file given explicitly does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Invalid(#[source] Box<figment::Error>),

    /// The merged hashing section is inconsistent.
    #[error("Invalid hashing settings: {0}")]
    Hashing(#[from] HashConfigError),

    /// Settings could not be rendered as TOML.
    #[error("Failed to render settings: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Directory traversal settings (`[walk]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkSettings {
    /// Extra gitignore-style exclusion patterns
    pub exclude: Vec<String>,
    /// Apply the built-in VCS and marker-file exclusions
    pub default_excludes: bool,
    /// Skip names starting with `.`
    pub skip_hidden: bool,
    /// Follow symbolic links
    pub follow_symlinks: bool,
    /// Ignore files smaller than this many bytes
    pub min_size: Option<u64>,
    /// Ignore files larger than this many bytes
    pub max_size: Option<u64>,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            default_excludes: true,
            skip_hidden: false,
            follow_symlinks: false,
            min_size: None,
            max_size: None,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Abort on the first unreadable path
    pub strict: bool,
    /// Report format
    pub output: OutputFormat,
    /// Sampling and digest parameters (`[hashing]`)
    pub hashing: HashConfig,
    /// Traversal options (`[walk]`)
    pub walk: WalkSettings,
}

impl Settings {
    /// Default config file location, e.g. `~/.config/dupsift/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupsift").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the layered figment without extracting it.
    ///
    /// An explicit `config_file` must exist; the default file is used only
    /// when present.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotFound`] for a missing explicit file.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, SettingsError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(SettingsError::NotFound(path.to_path_buf()));
                }
                log::debug!("Loading settings from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading settings from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load defaults, the config file and the environment.
    ///
    /// The hashing section is not validated here: command-line flags may
    /// still repair it. [`Settings::apply_hashing_args`] validates the
    /// final result.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if a layer is missing or malformed.
    pub fn load(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        Self::figment(config_file)?
            .extract()
            .map_err(|e| SettingsError::Invalid(Box::new(e)))
    }

    /// Check the merged settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Hashing`] if the sampling parameters are
    /// inconsistent.
    pub fn validate(&self) -> Result<(), SettingsError> {
        Ok(self.hashing.validate()?)
    }

    /// Apply hashing flags given on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Hashing`] if the result is inconsistent.
    pub fn apply_hashing_args(&mut self, args: &HashingArgs) -> Result<(), SettingsError> {
        if let Some(threshold) = args.sample_threshold {
            self.hashing.sample_threshold = threshold;
        }
        if let Some(window) = args.sample_window {
            self.hashing.sample_window = window;
        }
        if args.no_middle_sample {
            self.hashing.sample_middle = false;
        }
        if let Some(digest) = args.digest {
            self.hashing.digest = digest;
        }
        if let Some(digest) = args.quick_digest {
            self.hashing.quick_digest = digest;
        }
        self.validate()
    }

    /// Apply scan flags given on the command line.
    ///
    /// Boolean flags can only switch an option on; exclusion patterns are
    /// appended to the configured ones.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Hashing`] if the hashing result is inconsistent.
    pub fn apply_scan_args(&mut self, args: &ScanArgs) -> Result<(), SettingsError> {
        self.apply_hashing_args(&args.hashing)?;

        if let Some(output) = args.output {
            self.output = output;
        }
        self.strict |= args.strict;
        self.walk.skip_hidden |= args.skip_hidden;
        self.walk.follow_symlinks |= args.follow_symlinks;
        if args.no_default_excludes {
            self.walk.default_excludes = false;
        }
        if args.min_size.is_some() {
            self.walk.min_size = args.min_size;
        }
        if args.max_size.is_some() {
            self.walk.max_size = args.max_size;
        }
        self.walk
            .exclude
            .extend(args.exclude_patterns.iter().cloned());
        Ok(())
    }

    /// Walker configuration derived from `[walk]`.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.walk.follow_symlinks,
            skip_hidden: self.walk.skip_hidden,
            min_size: self.walk.min_size,
            max_size: self.walk.max_size,
            default_excludes: self.walk.default_excludes,
            exclude_patterns: self.walk.exclude.clone(),
        }
    }

    /// Render the settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Render`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
