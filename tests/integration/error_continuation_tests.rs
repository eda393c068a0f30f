use dupsift::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupsift::error::ExitCode;
use dupsift::scanner::{FileRecord, HashError};
use std::path::PathBuf;

#[test]
fn test_hash_error_aborts_without_partial_result() {
    let finder = DuplicateFinder::with_defaults();
    // Same size, so both reach the quick stage
    let file1 = FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileRecord::new(PathBuf::from("nonexistent_2.txt"), 100);

    let result = finder.find_duplicates_in_records(vec![file1, file2]);

    match result {
        Err(FinderError::Hash(HashError::NotFound(path))) => {
            assert_eq!(path, PathBuf::from("nonexistent_1.txt"));
        }
        other => panic!("Expected NotFound HashError, got: {:?}", other.map(|r| r.0)),
    }
}

#[test]
fn test_unique_size_missing_file_is_never_opened() {
    let finder = DuplicateFinder::with_defaults();
    let file1 = FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileRecord::new(PathBuf::from("nonexistent_2.txt"), 200);

    let (groups, _) = finder.find_duplicates_in_records(vec![file1, file2]).unwrap();
    assert!(groups.is_empty());
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    /// Directory with a locked subdirectory and a duplicate pair outside it.
    ///
    /// Returns `None` when permissions are not enforced (running as root).
    fn setup_locked_dir() -> Option<(TempDir, PathBuf)> {
        let dir = tempdir().unwrap();
        let locked = dir.path().join("no_access");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), b"secret").unwrap();
        fs::write(dir.path().join("a.txt"), b"public").unwrap();
        fs::write(dir.path().join("b.txt"), b"public").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            unlock(&locked);
            return None;
        }
        Some((dir, locked))
    }

    fn unlock(path: &Path) {
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_permission_denied_is_collected() {
        let Some((dir, locked)) = setup_locked_dir() else {
            return;
        };

        let finder = DuplicateFinder::with_defaults();
        let result = finder.find_duplicates(dir.path());
        unlock(&locked);

        let (groups, summary) = result.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(summary.scan_errors.len(), 1);
        assert_eq!(ExitCode::for_scan(&groups, &summary), ExitCode::PartialSuccess);
    }

    #[test]
    fn test_permission_denied_fails_in_strict_mode() {
        let Some((dir, locked)) = setup_locked_dir() else {
            return;
        };

        let finder = DuplicateFinder::new(FinderConfig::default().with_strict(true)).unwrap();
        let result = finder.find_duplicates(dir.path());
        unlock(&locked);

        assert!(matches!(result, Err(FinderError::Scan(_))));
    }

    #[test]
    fn test_unreadable_candidate_aborts_scan() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();
        fs::set_permissions(&b, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::File::open(&b).is_ok() {
            return;
        }

        let finder = DuplicateFinder::with_defaults();
        let result = finder.find_duplicates(dir.path());
        fs::set_permissions(&b, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(matches!(
            result,
            Err(FinderError::Hash(HashError::PermissionDenied(_)))
        ));
    }
}
