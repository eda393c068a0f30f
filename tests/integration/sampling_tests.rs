use dupsift::duplicates::{DuplicateFinder, FinderConfig};
use dupsift::scanner::{DigestAlgorithm, HashConfig};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const WINDOW: u64 = 4096;

fn finder(hashing: HashConfig) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_hashing(hashing)).unwrap()
}

fn small_sampling(sample_middle: bool) -> HashConfig {
    HashConfig {
        sample_threshold: 64 * 1024,
        sample_window: WINDOW,
        sample_middle,
        ..Default::default()
    }
}

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 239) as u8).collect()
}

fn write(path: &Path, content: &[u8]) {
    fs::write(path, content).unwrap();
}

#[test]
fn test_window_collision_is_rejected_by_full_hash() {
    // 20 MB files with identical first and last windows but different middles
    let dir = tempdir().unwrap();
    let size = 20 * 1024 * 1024;
    let a = patterned(size);
    let mut b = a.clone();
    b[size / 2] ^= 0xFF;
    write(&dir.path().join("a.bin"), &a);
    write(&dir.path().join("b.bin"), &b);

    let hashing = HashConfig {
        sample_middle: false,
        ..Default::default()
    };
    let (groups, summary) = finder(hashing).find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    // Quick stage grouped them, full stage split them
    assert_eq!(summary.sampled_files, 2);
    assert_eq!(summary.eliminated_by_quick_hash, 0);
    assert_eq!(summary.eliminated_by_full_hash, 2);
}

#[test]
fn test_middle_window_eliminates_early() {
    let dir = tempdir().unwrap();
    let size = 1024 * 1024;
    let a = patterned(size);
    let mut b = a.clone();
    let middle = (size - WINDOW as usize) / 2;
    b[middle + 10] ^= 0xFF;
    write(&dir.path().join("a.bin"), &a);
    write(&dir.path().join("b.bin"), &b);

    let (groups, summary) = finder(small_sampling(true))
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_by_quick_hash, 2);
    assert_eq!(summary.eliminated_by_full_hash, 0);
    // Three windows per file, no full reads
    assert_eq!(summary.bytes_read, 2 * 3 * WINDOW);
}

#[test]
fn test_sampled_duplicates_are_confirmed_by_full_read() {
    let dir = tempdir().unwrap();
    let size = 1024 * 1024;
    let content = patterned(size);
    write(&dir.path().join("a.bin"), &content);
    write(&dir.path().join("b.bin"), &content);

    let (groups, summary) = finder(small_sampling(true))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].hash, blake3::hash(&content).to_hex().to_string());
    assert_eq!(summary.sampled_files, 2);
    assert_eq!(summary.reused_fingerprints, 0);
    assert_eq!(summary.bytes_read, 2 * 3 * WINDOW + 2 * size as u64);
}

#[test]
fn test_files_at_threshold_are_read_once() {
    let dir = tempdir().unwrap();
    let content = patterned(64 * 1024);
    write(&dir.path().join("a.bin"), &content);
    write(&dir.path().join("b.bin"), &content);

    let (groups, summary) = finder(small_sampling(true))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.sampled_files, 0);
    assert_eq!(summary.reused_fingerprints, 2);
    assert_eq!(summary.bytes_read, 2 * content.len() as u64);
}

#[test]
fn test_sha256_digest() {
    let dir = tempdir().unwrap();
    let content = patterned(200 * 1024);
    write(&dir.path().join("a.bin"), &content);
    write(&dir.path().join("b.bin"), &content);

    let hashing = HashConfig {
        digest: DigestAlgorithm::Sha256,
        quick_digest: DigestAlgorithm::Sha256,
        ..small_sampling(false)
    };
    let (groups, _) = finder(hashing).find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].algorithm, DigestAlgorithm::Sha256);
    assert_eq!(groups[0].hash, format!("{:x}", Sha256::digest(&content)));
}

#[test]
fn test_mixed_digests_still_group_by_full_hash() {
    let dir = tempdir().unwrap();
    let content = patterned(200 * 1024);
    write(&dir.path().join("a.bin"), &content);
    write(&dir.path().join("b.bin"), &content);

    let hashing = HashConfig {
        digest: DigestAlgorithm::Blake3,
        quick_digest: DigestAlgorithm::Sha256,
        ..small_sampling(true)
    };
    let (groups, _) = finder(hashing).find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].algorithm, DigestAlgorithm::Blake3);
}
