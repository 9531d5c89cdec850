//! Stateless operations that act on a path rather than an open handle.

use derive_more::{Display, Error, From, IsVariant};

use crate::fs::error::OsError;
use crate::fs::file::OpenError;
use crate::fs::path::PathError;
use crate::fs::sys::{NativeFs, Platform};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum PathOpError {
    Path(PathError),
    Os(OsError),
}

impl From<OpenError> for PathOpError {
    fn from(value: OpenError) -> Self {
        match value {
            OpenError::Path(e) => e.into(),
            OpenError::Os(e) => e.into(),
        }
    }
}

/// Removes a file from the filesystem namespace. Handles that are already open keep working.
pub fn delete_file(file_path: &str) -> Result<(), PathOpError> {
    Platform::delete_file(file_path)
}

/// Sets the length of the file at `file_path` without keeping it open.
pub fn truncate_path(file_path: &str, size: u64) -> Result<(), PathOpError> {
    Platform::truncate_path(file_path, size)
}

pub fn create_dir(dir_path: &str) -> Result<(), PathOpError> {
    Platform::create_dir(dir_path)
}

/// Removes a directory, which must be empty.
pub fn remove_empty_dir(dir_path: &str) -> Result<(), PathOpError> {
    Platform::remove_empty_dir(dir_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::File;

    #[test]
    fn test_delete_then_open_existing_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("doomed.txt");
        let path = path.to_str().expect("utf-8 temp path");

        File::create(path).expect("create").close().expect("close");
        delete_file(path).expect("delete should succeed on an existing file");

        assert!(
            File::open(path).is_err_and(|e| e.is_os()),
            "Opening a deleted path with open-existing should fail."
        );
        assert!(delete_file(path).is_err_and(|e| e.is_os()), "Deleting twice should fail.");
    }

    #[test]
    fn test_truncate_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sized.bin");
        let path = path.to_str().expect("utf-8 temp path");

        let file = File::create(path).expect("create");
        file.write(b"0123456789").expect("write");

        truncate_path(path, 4).expect("shrink");
        assert_eq!(file.size(), Ok(4), "Truncating by path should affect open handles.");

        truncate_path(path, 64).expect("grow");
        let mut buf = [0xAA_u8; 64];
        assert_eq!(file.read_at(&mut buf, 0), Ok(64));
        assert_eq!(&buf[..4], b"0123");
        assert!(buf[4..].iter().all(|&b| b == 0), "Growing should zero-fill.");
    }

    #[test]
    fn test_create_and_remove_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sub_path = dir.path().join("sub");
        let sub = sub_path.to_str().expect("utf-8 temp path");

        create_dir(sub).expect("create dir");
        assert!(create_dir(sub).is_err_and(|e| e.is_os()), "Creating twice should fail.");

        let inner = sub_path.join("inner.txt");
        let inner = inner.to_str().expect("utf-8 temp path");
        File::create(inner).expect("create inner").close().expect("close");
        assert!(
            remove_empty_dir(sub).is_err_and(|e| e.is_os()),
            "A non-empty directory shouldn't be removed."
        );

        delete_file(inner).expect("delete inner");
        remove_empty_dir(sub).expect("remove empty dir");
        assert!(!sub_path.exists());
    }

    #[test]
    fn test_bad_paths_fail_before_the_os() {
        assert!(delete_file("").is_err_and(|e| e.is_path()));
        assert!(truncate_path("a\0b", 0).is_err_and(|e| e.is_path()));
    }
}
