//! Install footprint estimation.

use crate::cancel::CancelToken;
use chrono::{DateTime, Utc};
use std::path::Path;
use walkdir::WalkDir;

/// Sums the sizes of all files under `dir`.
///
/// Any enumeration failure makes the whole estimate `0`; a cancelled walk
/// returns the sum accumulated so far.
pub fn directory_size(dir: &Path, cancel: &CancelToken) -> u64 {
    let mut total = 0u64;

    for entry in WalkDir::new(dir) {
        if cancel.is_cancelled() {
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("size estimate for {:?} abandoned: {}", dir, e);
                return 0;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => total = total.saturating_add(metadata.len()),
            Err(e) => {
                tracing::debug!("size estimate for {:?} abandoned: {}", dir, e);
                return 0;
            }
        }
    }

    total
}

/// Best-effort install time: the directory's creation time, or its
/// modification time where the filesystem doesn't record creation.
pub fn install_date(dir: &Path) -> Option<DateTime<Utc>> {
    let metadata = std::fs::metadata(dir).ok()?;
    let time = metadata.created().or_else(|_| metadata.modified()).ok()?;
    Some(DateTime::<Utc>::from(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sums_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), vec![0u8; 1000]).unwrap();
        fs::create_dir_all(dir.path().join("data/maps")).unwrap();
        fs::write(dir.path().join("data/maps/b.bin"), vec![0u8; 234]).unwrap();

        assert_eq!(directory_size(dir.path(), &CancelToken::new()), 1234);
    }

    #[test]
    fn test_missing_directory_is_zero() {
        assert_eq!(
            directory_size(Path::new("/no/such/install/dir"), &CancelToken::new()),
            0
        );
    }

    #[test]
    fn test_cancelled_walk_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), vec![0u8; 10]).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(directory_size(dir.path(), &cancel), 0);
    }

    #[test]
    fn test_install_date_present_for_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(install_date(dir.path()).is_some());
        assert!(install_date(Path::new("/no/such/install/dir")).is_none());
    }
}
