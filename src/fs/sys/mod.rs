//! The native backends. Exactly one is compiled, chosen by target, and both implement the traits
//! below so that [`File`](crate::fs::File) and [`Directory`](crate::fs::Directory) stay free of
//! platform conditionals.

use std::ffi::CString;
use std::ptr::NonNull;

use crate::fs::dir::DirError;
use crate::fs::error::OsError;
use crate::fs::file::{MapProtection, OpenError, OpenOptions, SeekMode};
use crate::fs::ops::PathOpError;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::*;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub(crate) use win32::*;

/// One open native file. Dropping it closes the descriptor, logging (not panicking) on failure.
pub(crate) trait NativeFile: Sized {
    type View: NativeView;

    fn open(path: &str, options: &OpenOptions) -> Result<Self, OpenError>;

    fn close(self) -> Result<(), OsError>;

    fn size(&self) -> Result<u64, OsError>;

    fn seek(&self, offset: i64, mode: SeekMode) -> Result<u64, OsError>;

    /// Must leave the cursor where it was.
    fn truncate(&self, size: u64) -> Result<(), OsError>;

    fn read(&self, buf: &mut [u8]) -> Result<usize, OsError>;

    fn write(&self, buf: &[u8]) -> Result<usize, OsError>;

    /// Must leave the cursor where it was. Reading past the end of the file yields `Ok(0)`.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, OsError>;

    /// Must leave the cursor where it was.
    fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize, OsError>;

    /// Establishes a shared mapping of the first `len` bytes. `len` is never zero.
    fn map(&self, len: usize, protection: MapProtection) -> Result<Self::View, OsError>;
}

/// A live mapping. Dropping it unmaps.
pub(crate) trait NativeView: Sized {
    fn as_ptr(&self) -> NonNull<u8>;

    fn len(&self) -> usize;

    fn unmap(self) -> Result<(), OsError>;
}

/// A cursor over the immediate children of one directory, `.` and `..` included.
pub(crate) trait NativeDir: Sized {
    /// Opens the cursor and reads the first entry.
    fn start(path: &str) -> Result<(Self, Option<CString>), DirError>;

    /// Moves to the next entry, `None` once there are no more.
    fn advance(&mut self) -> Result<Option<CString>, DirError>;

    /// Starts over, returning the first entry again. The old cursor is kept if this fails.
    fn restart(&mut self) -> Result<Option<CString>, DirError>;

    fn close(self) -> Result<(), OsError>;
}

/// The stateless, path-based operations.
pub(crate) trait NativeFs {
    fn delete_file(path: &str) -> Result<(), PathOpError>;

    fn truncate_path(path: &str, size: u64) -> Result<(), PathOpError>;

    fn create_dir(path: &str) -> Result<(), PathOpError>;

    fn remove_empty_dir(path: &str) -> Result<(), PathOpError>;
}
