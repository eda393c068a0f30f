//! Directory walker producing [`FileRecord`]s for the duplicate pipeline.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree with [`walkdir`] and yielding one record per regular file.
//!
//! # Features
//!
//! - Deterministic, name-sorted traversal
//! - Gitignore-style exclusion via the `ignore` crate, seeded with
//!   [`DEFAULT_EXCLUDES`] (VCS metadata and platform marker files)
//! - Excluded directories are pruned, never descended into
//! - Zero-byte files are skipped
//! - Optional hidden-file and size filtering
//!
//! # Example
//!
//! ```no_run
//! use dupsift::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     exclude_patterns: vec!["node_modules/".to_string()],
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError, WalkerConfig};

/// Patterns excluded unless [`WalkerConfig::default_excludes`] is off.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git/",
    ".svn/",
    ".hg/",
    ".bzr/",
    "CVS/",
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
];

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Build the exclusion matcher from defaults and configured patterns.
    fn build_excludes(&self) -> Option<Gitignore> {
        let mut builder = GitignoreBuilder::new(&self.root);

        let defaults: &[&str] = if self.config.default_excludes {
            DEFAULT_EXCLUDES
        } else {
            &[]
        };

        for pattern in defaults
            .iter()
            .copied()
            .chain(self.config.exclude_patterns.iter().map(String::as_str))
        {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid exclude pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(matcher) if !matcher.is_empty() => Some(matcher),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build exclude patterns: {}", e);
                None
            }
        }
    }

    /// Whether `entry` (file or directory) should be left out of the walk.
    fn is_excluded(&self, entry: &DirEntry, excludes: Option<&Gitignore>) -> bool {
        if entry.depth() == 0 {
            return false;
        }

        if self.config.skip_hidden && entry.file_name().to_string_lossy().starts_with('.') {
            log::trace!("Skipping hidden entry: {}", entry.path().display());
            return true;
        }

        let Some(matcher) = excludes else {
            return false;
        };

        let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
        let is_dir = entry.file_type().is_dir();
        if matcher.matched(relative, is_dir).is_ignore() {
            log::trace!("Excluding: {}", entry.path().display());
            return true;
        }
        false
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; the caller decides whether they are fatal.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let excludes = self.build_excludes();

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded(entry, excludes.as_ref()))
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(&entry),
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Turn a directory entry into a record, if it is a file we keep.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileRecord, ScanError>> {
        // Symlinks only report as files here when follow_symlinks is set
        if !entry.file_type().is_file() {
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walk_error(e))),
        };

        let size = metadata.len();
        if size == 0 {
            log::debug!("Skipping empty file: {}", entry.path().display());
            return None;
        }

        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                entry.path().display()
            );
            return None;
        }

        Some(Ok(FileRecord::new(entry.path().to_path_buf(), size)))
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        match error.io_error().map(std::io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                let source = error
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                ScanError::Io { path, source }
            }
        }
    }
}
