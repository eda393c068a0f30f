//! File fingerprinting with optional window sampling.
//!
//! # Overview
//!
//! [`Hasher`] turns a file into a [`Fingerprint`]: a lowercase hex digest
//! plus the algorithm and whether the whole file or only sample windows were
//! read.
//!
//! In [`HashMode::Quick`], files larger than the sample threshold are
//! fingerprinted from fixed-size windows at the beginning, (optionally) the
//! middle, and the end of the file. Everything else, and every request in
//! [`HashMode::Full`], streams the complete content.
//!
//! Sampled fingerprints only narrow candidates. The record cache never hands
//! one back for a full request, so confirmation always rests on a full read.
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{FileRecord, HashConfig, HashMode, Hasher};
//!
//! let hasher = Hasher::new(HashConfig::default()).unwrap();
//! let mut record = FileRecord::new("movie.mkv", 700 * 1024 * 1024);
//!
//! let quick = hasher.fingerprint(&mut record, HashMode::Quick).unwrap();
//! let full = hasher.fingerprint(&mut record, HashMode::Full).unwrap();
//! assert!(!quick.kind.is_exact());
//! assert!(full.kind.is_exact());
//! ```

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{FileRecord, HashConfigError, HashError};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Files larger than this are sampled in quick mode (3 MiB).
pub const DEFAULT_SAMPLE_THRESHOLD: u64 = 3 * MIB;

/// Size of each sample window (4 KiB).
pub const DEFAULT_SAMPLE_WINDOW: u64 = 4 * KIB;

/// Largest accepted sample window; one window is buffered in memory.
pub const MAX_SAMPLE_WINDOW: u64 = 64 * MIB;

/// Buffer size for streaming full reads.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Digest used to fingerprint file content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// BLAKE3 (256-bit)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl DigestAlgorithm {
    /// Display label, as used in report headers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Blake3 => "BLAKE3",
            Self::Sha256 => "SHA256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How much of a file a fingerprint covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintKind {
    /// Digest of the concatenated sample windows.
    Sampled,
    /// Digest of the whole file.
    Full,
}

impl FingerprintKind {
    /// Whether the fingerprint may confirm a duplicate.
    #[must_use]
    pub fn is_exact(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Which stage is asking for a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashMode {
    /// Cheap pre-filter; large files may be sampled.
    Quick,
    /// Authoritative; always covers the whole file.
    Full,
}

impl HashMode {
    /// Phase name reported to progress callbacks.
    #[must_use]
    pub fn phase_name(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Full => "full",
        }
    }
}

/// A content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Whole-file or sampled
    pub kind: FingerprintKind,
    /// Digest that produced `hex`
    pub algorithm: DigestAlgorithm,
    /// Lowercase hexadecimal digest
    pub hex: String,
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Sampling and digest parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Files strictly larger than this are sampled in quick mode.
    pub sample_threshold: u64,
    /// Length of each sample window.
    pub sample_window: u64,
    /// Also sample a window from the middle of the file.
    pub sample_middle: bool,
    /// Digest for full reads.
    pub digest: DigestAlgorithm,
    /// Digest for sampled reads.
    pub quick_digest: DigestAlgorithm,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            sample_threshold: DEFAULT_SAMPLE_THRESHOLD,
            sample_window: DEFAULT_SAMPLE_WINDOW,
            sample_middle: true,
            digest: DigestAlgorithm::Blake3,
            quick_digest: DigestAlgorithm::Blake3,
        }
    }
}

impl HashConfig {
    /// Check the sampling parameters.
    ///
    /// # Errors
    ///
    /// Returns [`HashConfigError`] if the window is empty or too large, or
    /// if the threshold does not exceed the window. The last rule keeps the
    /// end-window offset `size - window` from underflowing.
    pub fn validate(&self) -> Result<(), HashConfigError> {
        if self.sample_window == 0 {
            return Err(HashConfigError::ZeroWindow);
        }
        if self.sample_window > MAX_SAMPLE_WINDOW {
            return Err(HashConfigError::WindowTooLarge {
                window: self.sample_window,
                max: MAX_SAMPLE_WINDOW,
            });
        }
        if self.sample_threshold <= self.sample_window {
            return Err(HashConfigError::ThresholdNotAboveWindow {
                threshold: self.sample_threshold,
                window: self.sample_window,
            });
        }
        Ok(())
    }

    /// Number of windows read per sampled file.
    #[must_use]
    pub fn window_count(&self) -> u64 {
        if self.sample_middle {
            3
        } else {
            2
        }
    }
}

/// Incremental digest state for one fingerprint.
enum DigestState {
    Blake3(Box<blake3::Hasher>),
    Sha256(Sha256),
}

impl DigestState {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Blake3(hasher) => {
                hasher.update(bytes);
            }
            Self::Sha256(hasher) => Digest::update(hasher, bytes),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Blake3(hasher) => hasher.finalize().to_hex().to_string(),
            Self::Sha256(hasher) => format!("{:x}", hasher.finalize()),
        }
    }
}

/// File fingerprinter.
///
/// Holds a validated [`HashConfig`]; construct it once per run and share it
/// across stages.
#[derive(Debug, Clone)]
pub struct Hasher {
    config: HashConfig,
}

impl Hasher {
    /// Create a hasher after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HashConfigError`] if the sampling parameters are invalid.
    pub fn new(config: HashConfig) -> Result<Self, HashConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a hasher with the default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            config: HashConfig::default(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Whether a quick request for a file of `size` bytes is sampled.
    #[must_use]
    pub fn samples(&self, size: u64) -> bool {
        size > self.config.sample_threshold && size > self.config.sample_window
    }

    /// Start offsets of the sample windows for a file of `size` bytes,
    /// in read order: begin, middle (if enabled), end.
    ///
    /// Empty when [`Hasher::samples`] does not hold for `size`.
    #[must_use]
    pub fn sample_offsets(&self, size: u64) -> Vec<u64> {
        if !self.samples(size) {
            return Vec::new();
        }
        let last = size - self.config.sample_window;
        let mut offsets = vec![0];
        if self.config.sample_middle {
            offsets.push(last / 2);
        }
        offsets.push(last);
        offsets
    }

    /// Bytes read to produce `fingerprint` for a file of `size` bytes.
    #[must_use]
    pub fn bytes_read(&self, fingerprint: &Fingerprint, size: u64) -> u64 {
        match fingerprint.kind {
            FingerprintKind::Full => size,
            FingerprintKind::Sampled => self.config.sample_window * self.config.window_count(),
        }
    }

    /// Fingerprint `record`, reusing its cached value when it fits `mode`.
    ///
    /// The computed fingerprint is stored back on the record. A quick request
    /// on a file at or below the sample threshold reads the whole file and
    /// stores a full fingerprint, which a later full request reuses.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened, stat'd, or read,
    /// or if a sample window comes back short.
    pub fn fingerprint(
        &self,
        record: &mut FileRecord,
        mode: HashMode,
    ) -> Result<Fingerprint, HashError> {
        if let Some(cached) = record.cached_fingerprint(mode) {
            log::trace!("Fingerprint cache hit: {}", record.path().display());
            return Ok(cached.clone());
        }

        let fingerprint = self.fingerprint_path(record.path(), mode)?;
        record.remember(fingerprint.clone());
        Ok(fingerprint)
    }

    /// Fingerprint the file at `path` without any caching.
    ///
    /// The sampling decision uses the size of the open file, not a size
    /// recorded earlier.
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::fingerprint`].
    pub fn fingerprint_path(&self, path: &Path, mode: HashMode) -> Result<Fingerprint, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let size = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();

        if mode == HashMode::Quick && self.samples(size) {
            log::trace!("Sampling {} ({} bytes)", path.display(), size);
            self.sampled(&mut file, path, size)
        } else {
            log::trace!("Reading {} ({} bytes)", path.display(), size);
            self.full(&mut file, path)
        }
    }

    fn full(&self, file: &mut File, path: &Path) -> Result<Fingerprint, HashError> {
        let mut state = DigestState::new(self.config.digest);
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            state.update(&buffer[..n]);
        }

        Ok(Fingerprint {
            kind: FingerprintKind::Full,
            algorithm: self.config.digest,
            hex: state.finalize_hex(),
        })
    }

    fn sampled(&self, file: &mut File, path: &Path, size: u64) -> Result<Fingerprint, HashError> {
        let mut state = DigestState::new(self.config.quick_digest);
        // validate() caps the window at MAX_SAMPLE_WINDOW
        let mut window = vec![0u8; self.config.sample_window as usize];

        for offset in self.sample_offsets(size) {
            read_window(file, path, offset, &mut window)?;
            state.update(&window);
        }

        Ok(Fingerprint {
            kind: FingerprintKind::Sampled,
            algorithm: self.config.quick_digest,
            hex: state.finalize_hex(),
        })
    }
}

/// Fill `buffer` from `offset`, failing unless every byte arrives.
fn read_window<R: Read + Seek>(
    reader: &mut R,
    path: &Path,
    offset: u64,
    buffer: &mut [u8],
) -> Result<(), HashError> {
    reader
        .seek(SeekFrom::Start(offset))
        .map_err(|e| HashError::from_io(path, e))?;
    reader.read_exact(buffer).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            HashError::ShortRead {
                path: path.to_path_buf(),
                offset,
                expected: buffer.len() as u64,
            }
        } else {
            HashError::from_io(path, e)
        }
    })
}
