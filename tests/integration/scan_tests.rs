use dupsift::duplicates::{DuplicateFinder, FinderConfig};
use dupsift::scanner::WalkerConfig;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn membership(groups: &[dupsift::duplicates::DuplicateGroup]) -> BTreeSet<Vec<PathBuf>> {
    groups.iter().map(|g| g.files.clone()).collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.bytes_read, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_quick_hash, 3);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"duplicate");
    write(&dir.path().join("b.txt"), b"duplicate");
    write(&dir.path().join("c.txt"), b"unique");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(groups[0].hash, blake3::hash(b"duplicate").to_hex().to_string());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 9);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir").join("deeper");
    fs::create_dir_all(&sub).unwrap();

    write(&dir.path().join("a.txt"), b"nested duplicate");
    write(&sub.join("b.txt"), b"nested duplicate");

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].files,
        vec![dir.path().join("a.txt"), sub.join("b.txt")]
    );
}

#[test]
fn test_scan_three_way_and_pairs() {
    let dir = tempdir().unwrap();
    for name in ["x1", "x2", "x3"] {
        write(&dir.path().join(name), b"triplicated content");
    }
    write(&dir.path().join("y1"), b"pair");
    write(&dir.path().join("y2"), b"pair");
    // Same size as the pair, different bytes
    write(&dir.path().join("y3"), b"PAIR");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].files.len(), 3);
    assert_eq!(groups[1].files.len(), 2);
    assert!(!groups[1].files.contains(&dir.path().join("y3")));
    assert_eq!(summary.duplicate_files, 3);
    assert_eq!(summary.reclaimable_space, 2 * 19 + 4);
}

#[test]
fn test_scan_same_size_last_byte_differs() {
    let dir = tempdir().unwrap();
    let x = vec![b'x'; 1000];
    let mut y = x.clone();
    y[999] = b'y';
    write(&dir.path().join("a"), &x);
    write(&dir.path().join("b"), &x);
    write(&dir.path().join("c"), &y);

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(
        membership(&groups),
        BTreeSet::from([vec![dir.path().join("a"), dir.path().join("b")]])
    );
}

#[test]
fn test_scan_off_by_one_sizes() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), &vec![0u8; 500]);
    write(&dir.path().join("b"), &vec![0u8; 501]);

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_by_size, 2);
    assert_eq!(summary.bytes_read, 0);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write(&dir.path().join(format!("f{i}")), format!("group {}", i % 3).as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(membership(&first), membership(&second));
}

#[test]
fn test_scan_ignores_vcs_directories() {
    let dir = tempdir().unwrap();
    let objects = dir.path().join(".git").join("objects");
    fs::create_dir_all(&objects).unwrap();
    write(&objects.join("blob1"), b"same blob");
    write(&objects.join("blob2"), b"same blob");
    write(&dir.path().join("a.txt"), b"only one");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_with_custom_excludes() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("keep1.dat"), b"payload");
    write(&dir.path().join("keep2.dat"), b"payload");
    write(&dir.path().join("skip.tmp"), b"payload");

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        exclude_patterns: vec!["*.tmp".to_string()],
        ..Default::default()
    });
    let finder = DuplicateFinder::new(config).unwrap();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].files,
        vec![dir.path().join("keep1.dat"), dir.path().join("keep2.dat")]
    );
}

#[test]
fn test_scan_with_size_filters() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1"), b"tiny");
    write(&dir.path().join("small2"), b"tiny");
    write(&dir.path().join("big1"), &[7u8; 2048]);
    write(&dir.path().join("big2"), &[7u8; 2048]);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        min_size: Some(1024),
        ..Default::default()
    });
    let finder = DuplicateFinder::new(config).unwrap();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 2048);
    assert_eq!(summary.total_files, 2);
}
