//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (stage 1)
//! - Quick, possibly sampled, hash partitioning (stage 2)
//! - Full hash partitioning (stage 3)
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    partition_by_hash, DuplicateFinder, FinderConfig, FinderError, HashKey, HashStats, ScanSummary,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats};
