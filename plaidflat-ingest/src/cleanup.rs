//! Removal of stale output files before a workflow writes fresh ones.

use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

/// Delete each path that exists. Failures are logged, never returned.
/// Returns how many files were removed.
pub fn remove_stale(paths: &[PathBuf]) -> usize {
    let mut removed = 0;
    for path in paths {
        if !path.exists() {
            info!(path = %path.display(), "no existing file to remove");
            continue;
        }
        match fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "removed existing file");
                removed += 1;
            }
            Err(err) => error!(path = %path.display(), error = %err, "could not remove existing file"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_only_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("identity.csv");
        let absent = dir.path().join("identity.json");
        fs::write(&present, "x").unwrap();

        assert_eq!(remove_stale(&[present.clone(), absent.clone()]), 1);
        assert!(!present.exists());
        assert!(!absent.exists());
    }

    #[test]
    fn test_directory_is_not_removed() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("data");
        fs::create_dir(&sub).unwrap();
        assert_eq!(remove_stale(&[sub.clone()]), 0);
        assert!(sub.exists());
    }
}
