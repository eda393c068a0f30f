//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Directory walking with VCS/marker-file exclusion
//! - Content fingerprinting (full or window-sampled)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: File fingerprinting with a pluggable digest
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path().display(), file.size()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

// Re-export main types
pub use hasher::{
    DigestAlgorithm, Fingerprint, FingerprintKind, HashConfig, HashMode, Hasher,
    DEFAULT_SAMPLE_THRESHOLD, DEFAULT_SAMPLE_WINDOW,
};
pub use walker::{Walker, DEFAULT_EXCLUDES};

/// A discovered regular file.
///
/// Path and size are fixed at discovery time. The only mutable part is the
/// cached fingerprint, which is written by [`Hasher::fingerprint`] and
/// reused for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    size: u64,
    fingerprint: Option<Fingerprint>,
}

impl FileRecord {
    /// Create a record with no cached fingerprint.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes at discovery time
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            fingerprint: None,
        }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size recorded when the file was discovered.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Consume the record, returning its path.
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// Cached fingerprint usable for `mode`, if any.
    ///
    /// A full fingerprint answers both quick and full requests. A sampled
    /// fingerprint only answers quick requests and is never returned for
    /// [`HashMode::Full`].
    #[must_use]
    pub fn cached_fingerprint(&self, mode: HashMode) -> Option<&Fingerprint> {
        self.fingerprint
            .as_ref()
            .filter(|fp| mode == HashMode::Quick || fp.kind.is_exact())
    }

    /// Store a computed fingerprint.
    ///
    /// A full fingerprint is never replaced by a sampled one.
    pub(crate) fn remember(&mut self, fingerprint: Fingerprint) {
        if let Some(existing) = &self.fingerprint {
            if existing.kind.is_exact() && !fingerprint.kind.is_exact() {
                return;
            }
        }
        self.fingerprint = Some(fingerprint);
    }
}

/// Configuration for directory walking.
///
/// Controls exclusion, symlink handling, and size filters.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,

    /// Apply [`DEFAULT_EXCLUDES`] (VCS metadata, platform marker files).
    pub default_excludes: bool,

    /// Extra gitignore-style patterns to exclude.
    pub exclude_patterns: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            skip_hidden: false,
            min_size: None,
            max_size: None,
            default_excludes: true,
            exclude_patterns: Vec::new(),
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A sample window returned fewer bytes than requested.
    #[error("Short read for {path}: expected {expected} bytes at offset {offset}")]
    ShortRead {
        /// File being sampled
        path: PathBuf,
        /// Start of the window
        offset: u64,
        /// Window length
        expected: u64,
    },

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Invalid sampling parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HashConfigError {
    /// The sample window must hold at least one byte.
    #[error("Sample window must be greater than zero")]
    ZeroWindow,

    /// The window is larger than one read buffer may be.
    #[error("Sample window of {window} bytes exceeds the maximum of {max} bytes")]
    WindowTooLarge {
        /// Configured window
        window: u64,
        /// Largest accepted window
        max: u64,
    },

    /// Sampling must only apply to files larger than one window.
    #[error("Sample threshold ({threshold} bytes) must exceed the sample window ({window} bytes)")]
    ThresholdNotAboveWindow {
        /// Configured threshold
        threshold: u64,
        /// Configured window
        window: u64,
    },
}
