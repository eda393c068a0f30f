//! Duplicate finder implementation with multi-stage detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Size** - Group files by size (see [`crate::duplicates::groups`] module)
//! 2. **Quick hash** - Fingerprint same-size files; large files are sampled
//! 3. **Full hash** - Fingerprint the whole content of quick-hash matches
//!
//! Each stage drops groups with a single member, so a file whose size or
//! fingerprint is unique never reaches a later stage. Only stage 3 can
//! confirm a duplicate.
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{FileRecord, Hasher, HashMode};
//! use dupsift::duplicates::{group_by_size, partition_by_hash};
//!
//! let files = vec![FileRecord::new("a.bin", 10), FileRecord::new("b.bin", 10)];
//! let (size_groups, _) = group_by_size(files);
//!
//! let hasher = Hasher::with_defaults();
//! let (quick_groups, stats) =
//!     partition_by_hash(size_groups.into_values(), &hasher, HashMode::Quick, None).unwrap();
//!
//! println!("Quick stage: {} candidates remain", stats.candidates);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use crate::progress::ProgressCallback;
use crate::scanner::{
    FileRecord, Fingerprint, HashConfig, HashConfigError, HashError, HashMode, Hasher,
    ScanError, Walker, WalkerConfig,
};

use super::{group_by_size, DuplicateGroup};

/// Composite key of the hash stages: equal size and equal fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashKey {
    /// File size in bytes
    pub size: u64,
    /// Fingerprint computed in the stage
    pub fingerprint: Fingerprint,
}

/// Statistics from one hash stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStats {
    /// Files that entered the stage
    pub input_files: usize,
    /// Files opened and read
    pub files_read: usize,
    /// Files whose fingerprint came from the record cache
    pub cache_hits: usize,
    /// Files fingerprinted from sample windows
    pub sampled_files: usize,
    /// Bytes read from disk
    pub bytes_read: u64,
    /// Files dropped because their fingerprint was unique
    pub eliminated: usize,
    /// Files still possibly duplicated after the stage
    pub candidates: usize,
    /// Groups with 2+ files after the stage
    pub groups: usize,
}

impl HashStats {
    /// Percentage of files eliminated by this stage.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            (self.eliminated as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Regroup candidate files by (size, fingerprint) (stages 2 and 3).
///
/// Every record of every input group is fingerprinted in `mode` and filed
/// under its [`HashKey`]; groups with a single member are dropped.
/// Fingerprints are memoized on the records, so a record that already holds
/// a usable fingerprint is not read again. In [`HashMode::Full`] a sampled
/// fingerprint is never reused.
///
/// # Arguments
///
/// * `groups` - Candidate groups from the previous stage
/// * `hasher` - The hasher to use
/// * `mode` - Quick (may sample) or full
/// * `progress` - Optional progress callback
///
/// # Errors
///
/// Returns the first [`HashError`]; no partial result is produced.
pub fn partition_by_hash(
    groups: impl IntoIterator<Item = Vec<FileRecord>>,
    hasher: &Hasher,
    mode: HashMode,
    progress: Option<&dyn ProgressCallback>,
) -> Result<(HashMap<HashKey, Vec<FileRecord>>, HashStats), HashError> {
    let records: Vec<FileRecord> = groups.into_iter().flatten().collect();
    let phase = mode.phase_name();
    let mut stats = HashStats {
        input_files: records.len(),
        ..Default::default()
    };

    if records.is_empty() {
        log::debug!("{} stage: no files to process", phase);
        return Ok((HashMap::new(), stats));
    }

    if let Some(callback) = progress {
        callback.on_phase_start(phase, records.len());
    }

    log::info!("{} stage: fingerprinting {} files", phase, records.len());

    let mut partitions: HashMap<HashKey, Vec<FileRecord>> = HashMap::new();

    for (idx, mut record) in records.into_iter().enumerate() {
        if let Some(callback) = progress {
            callback.on_progress(idx + 1, record.path().to_string_lossy().as_ref());
        }

        let cached = record.cached_fingerprint(mode).is_some();
        let fingerprint = hasher.fingerprint(&mut record, mode).inspect_err(|e| {
            log::error!("Failed to fingerprint {}: {}", record.path().display(), e);
        })?;

        if cached {
            stats.cache_hits += 1;
        } else {
            let bytes = hasher.bytes_read(&fingerprint, record.size());
            stats.files_read += 1;
            stats.bytes_read += bytes;
            if !fingerprint.kind.is_exact() {
                stats.sampled_files += 1;
            }
            if let Some(callback) = progress {
                callback.on_item_completed(bytes);
            }
        }

        let key = HashKey {
            size: record.size(),
            fingerprint,
        };
        partitions.entry(key).or_default().push(record);
    }

    partitions.retain(|key, files| {
        if files.len() < 2 {
            stats.eliminated += files.len();
            log::trace!(
                "Eliminated unique {} fingerprint {}: {}",
                phase,
                key.fingerprint,
                files[0].path().display()
            );
            false
        } else {
            stats.candidates += files.len();
            stats.groups += 1;
            log::debug!(
                "{} group {} ({} bytes): {} potential duplicates",
                phase,
                key.fingerprint,
                key.size,
                files.len()
            );
            true
        }
    });

    if let Some(callback) = progress {
        callback.on_phase_end(phase);
    }

    log::info!(
        "{} stage complete: {} files → {} potential duplicates ({:.1}% eliminated, {} read)",
        phase,
        stats.input_files,
        stats.candidates,
        stats.elimination_rate(),
        ByteSize(stats.bytes_read)
    );

    Ok((partitions, stats))
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
///
/// Controls the behavior of the multi-stage duplicate detection pipeline.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Sampling thresholds and digest algorithms.
    pub hashing: HashConfig,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Abort on the first traversal error instead of recording it.
    pub strict: bool,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("hashing", &self.hashing)
            .field("walker_config", &self.walker_config)
            .field("strict", &self.strict)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the sampling and digest configuration.
    #[must_use]
    pub fn with_hashing(mut self, hashing: HashConfig) -> Self {
        self.hashing = hashing;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set fail-fast on traversal errors.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files that entered the pipeline
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Files eliminated by the quick hash stage
    pub eliminated_by_quick_hash: usize,
    /// Files eliminated by the full hash stage
    pub eliminated_by_full_hash: usize,
    /// Files fingerprinted from sample windows
    pub sampled_files: usize,
    /// Full-hash requests answered from the quick stage's cache
    pub reused_fingerprints: usize,
    /// Bytes read across both hash stages
    pub bytes_read: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the directory walk
    pub walk_duration: Duration,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Traversal errors recorded in non-strict mode
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }

    /// Whether some paths could not be walked.
    #[must_use]
    pub fn has_scan_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The sampling configuration is invalid.
    #[error("Invalid hashing configuration: {0}")]
    Config(#[from] HashConfigError),

    /// A traversal error occurred in strict mode.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A file could not be fingerprinted.
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Duplicate finder that orchestrates the multi-stage detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupsift::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::new(FinderConfig::default()).unwrap();
/// let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate groups", summary.duplicate_groups);
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Config`] if the hashing configuration is invalid.
    pub fn new(config: FinderConfig) -> Result<Self, FinderError> {
        let hasher = Hasher::new(config.hashing.clone())?;
        Ok(Self { config, hasher })
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            config: FinderConfig::default(),
            hasher: Hasher::with_defaults(),
        }
    }

    /// The hasher used by the hash stages.
    #[must_use]
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    fn progress(&self) -> Option<&dyn ProgressCallback> {
        self.config.progress_callback.as_deref()
    }

    /// Find all duplicate files under the given directory.
    ///
    /// Walks `path` and runs the pipeline on every file found.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - A traversal error occurs in strict mode
    /// - Any candidate file cannot be fingerprinted
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Looking for duplicated files under {}", path.display());

        let walk_start = Instant::now();
        if let Some(callback) = self.progress() {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", path.display()));
        }

        let walker = Walker::new(path, self.config.walker_config.clone());
        let mut records = Vec::new();
        let mut scan_errors = Vec::new();

        for result in walker.walk() {
            match result {
                Ok(record) => {
                    records.push(record);
                    if let Some(callback) = self.progress() {
                        callback.on_progress(records.len(), "");
                    }
                }
                Err(e) if self.config.strict => return Err(FinderError::Scan(e)),
                Err(e) => scan_errors.push(e),
            }
        }

        if let Some(callback) = self.progress() {
            callback.on_phase_end("walking");
        }
        let walk_duration = walk_start.elapsed();

        if !scan_errors.is_empty() {
            log::warn!(
                "{} path(s) could not be read during the walk",
                scan_errors.len()
            );
        }

        let (groups, mut summary) = self.find_duplicates_in_records(records)?;
        summary.walk_duration = walk_duration;
        summary.scan_duration += walk_duration;
        summary.scan_errors = scan_errors;
        Ok((groups, summary))
    }

    /// Find duplicates among already-enumerated file records.
    ///
    /// This is the pipeline proper: size grouping, quick hash, full hash.
    /// It stops early when a stage leaves no candidates.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Hash`] on the first file that cannot be
    /// fingerprinted.
    pub fn find_duplicates_in_records(
        &self,
        records: impl IntoIterator<Item = FileRecord>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        // Stage 1: size
        let (size_groups, size_stats) = group_by_size(records);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        if size_groups.is_empty() {
            log::info!("No duplication found after size grouping");
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        // Stage 2: quick hash
        let (quick_groups, quick_stats) = partition_by_hash(
            size_groups.into_values(),
            &self.hasher,
            HashMode::Quick,
            self.progress(),
        )?;
        summary.eliminated_by_quick_hash = quick_stats.eliminated;
        summary.sampled_files = quick_stats.sampled_files;
        summary.bytes_read = quick_stats.bytes_read;

        if quick_groups.is_empty() {
            log::info!("No duplication found after quick hashing");
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        // Stage 3: full hash
        let (full_groups, full_stats) = partition_by_hash(
            quick_groups.into_values(),
            &self.hasher,
            HashMode::Full,
            self.progress(),
        )?;
        summary.eliminated_by_full_hash = full_stats.eliminated;
        summary.reused_fingerprints = full_stats.cache_hits;
        summary.bytes_read += full_stats.bytes_read;

        let groups = into_duplicate_groups(full_groups);

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        if groups.is_empty() {
            log::info!("No duplication found!");
        } else {
            log::info!(
                "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
                summary.duplicate_groups,
                summary.duplicate_files,
                summary.reclaimable_display()
            );
        }

        Ok((groups, summary))
    }
}

/// Convert final partitions into duplicate groups, largest files first.
fn into_duplicate_groups(partitions: HashMap<HashKey, Vec<FileRecord>>) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = partitions
        .into_iter()
        .map(|(key, files)| {
            let paths = files.into_iter().map(FileRecord::into_path).collect();
            DuplicateGroup::new(key.size, key.fingerprint, paths)
        })
        .collect();

    groups.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.hash.cmp(&b.hash)));
    groups
}
