//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module holds the size partitioner (stage 1 of duplicate detection)
//! and [`DuplicateGroup`], the confirmed result handed to output formatters.
//!
//! ## Size Grouping
//!
//! Files with different sizes cannot be duplicates, so grouping by exact
//! size removes every file whose size is unique without reading a byte.
//!
//! # Example
//!
//! ```
//! use dupsift::scanner::FileRecord;
//! use dupsift::duplicates::group_by_size;
//!
//! let files = vec![
//!     FileRecord::new("/file1.txt", 1024),
//!     FileRecord::new("/file2.txt", 1024),
//!     FileRecord::new("/file3.txt", 2048),
//! ];
//!
//! // Group by size - only groups with 2+ files are potential duplicates
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);  // Two 1024-byte files
//! assert_eq!(groups.len(), 1);  // Only one size group with multiple files
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scanner::{DigestAlgorithm, FileRecord, Fingerprint};

/// Confirmed duplicate group of files.
///
/// Every member has the same size and the same full-content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// File size in bytes (shared by all files)
    pub size: u64,
    /// Full-content digest as lowercase hex
    pub hash: String,
    /// Digest that produced `hash`
    pub algorithm: DigestAlgorithm,
    /// Paths of the identical files, sorted
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Arguments
    ///
    /// * `size` - File size in bytes
    /// * `fingerprint` - Full-content fingerprint shared by the files
    /// * `files` - Paths of the identical files
    #[must_use]
    pub fn new(size: u64, fingerprint: Fingerprint, mut files: Vec<PathBuf>) -> Self {
        debug_assert!(
            fingerprint.kind.is_exact(),
            "duplicate groups require a full fingerprint"
        );
        files.sort();
        Self {
            size,
            hash: fingerprint.hex,
            algorithm: fingerprint.algorithm,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }
}

impl fmt::Display for DuplicateGroup {
    /// Header line followed by one indented path per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<Size: {} Bytes, {}: {}, Duplication: {}>",
            self.size,
            self.algorithm,
            self.hash,
            self.files.len()
        )?;
        for path in &self.files {
            writeln!(f, "  {}", path.display())?;
        }
        Ok(())
    }
}

/// Statistics from size grouping phase.
///
/// Provides insight into the distribution of files by size and
/// the effectiveness of the size grouping filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of empty files dropped (the walker normally filters these)
    pub empty_files: usize,
    /// Number of size groups with 2+ files (potential duplicate groups)
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (stage 1 of duplicate detection).
///
/// Pure and infallible: no file I/O is performed. Records keep the order in
/// which they were supplied within their group. Groups with fewer than two
/// members are removed.
///
/// # Arguments
///
/// * `files` - Records to group
///
/// # Returns
///
/// A tuple of:
/// - `HashMap<u64, Vec<FileRecord>>` - Records grouped by size (only groups with 2+ files)
/// - `GroupingStats` - Statistics about the grouping operation
///
/// # Example
///
/// ```
/// use dupsift::scanner::FileRecord;
/// use dupsift::duplicates::group_by_size;
///
/// let files = vec![
///     FileRecord::new("/a.txt", 100),
///     FileRecord::new("/b.txt", 100),
///     FileRecord::new("/c.txt", 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// // Only the 100-byte group is returned (has 2 files)
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[&100].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);  // The 200-byte file
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (HashMap<u64, Vec<FileRecord>>, GroupingStats) {
    let mut groups: HashMap<u64, Vec<FileRecord>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size();

        if file.size() == 0 {
            stats.empty_files += 1;
            log::debug!("Empty file encountered: {}", file.path().display());
            continue;
        }

        groups.entry(file.size()).or_default().push(file);
    }

    if stats.empty_files > 0 {
        log::warn!(
            "Dropped {} empty file(s) that should have been filtered during the walk",
            stats.empty_files
        );
    }

    stats.unique_sizes = groups.len();

    groups.retain(|size, files| {
        if files.len() < 2 {
            stats.eliminated_unique += files.len();
            log::trace!("Eliminated unique size {}: {}", size, files[0].path().display());
            false
        } else {
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Size group {} bytes: {} potential duplicates",
                size,
                files.len()
            );
            true
        }
    });

    log::info!(
        "Size stage complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}
