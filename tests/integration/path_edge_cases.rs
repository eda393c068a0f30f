use dupsift::duplicates::{DuplicateFinder, FinderError};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_scan_non_existent_path() {
    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(std::path::Path::new("/non/existent/path/12345"));

    match result {
        Err(FinderError::PathNotFound(path)) => {
            assert!(path.to_string_lossy().contains("non/existent/path/12345"));
        }
        other => panic!("Expected PathNotFound error, got {:?}", other.map(|r| r.0)),
    }
}

#[test]
fn test_scan_file_instead_of_directory() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("file.txt");
    File::create(&file_path).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(&file_path);

    match result {
        Err(FinderError::NotADirectory(path)) => {
            assert!(path.to_string_lossy().contains("file.txt"));
        }
        other => panic!("Expected NotADirectory error, got {:?}", other.map(|r| r.0)),
    }
}

#[test]
fn test_paths_with_spaces_and_unicode() {
    let dir = tempdir().unwrap();
    let names = ["file with spaces.txt", "ファイル.txt", "naïve café.txt"];
    for name in names {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"content")
            .unwrap();
    }

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 3);
    for name in names {
        assert!(groups[0].files.contains(&dir.path().join(name)));
    }
}

#[test]
fn test_paths_with_quotes_and_newlines() {
    // Windows does not allow these characters in filenames.
    if cfg!(windows) {
        return;
    }

    let dir = tempdir().unwrap();
    for name in ["file_with_\"quote\".txt", "file_with\nnewline.txt"] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"content")
            .unwrap();
    }

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0]
        .files
        .iter()
        .any(|f| f.to_string_lossy().contains('\n')));
}

#[test]
fn test_deeply_nested_paths() {
    let dir = tempdir().unwrap();
    let mut deep = dir.path().to_path_buf();
    for i in 0..20 {
        deep = deep.join(format!("level_{i}"));
    }
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("bottom.txt"), b"deep content").unwrap();
    fs::write(dir.path().join("top.txt"), b"deep content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.contains(&deep.join("bottom.txt")));
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    fs::write(&target, b"linked content").unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}
