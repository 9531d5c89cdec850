//! `pfs_directory_*`: directory cursors, plus creating and removing directories.

use std::ffi::{CStr, c_char};
use std::ptr;

use super::error::{ResultExtension, invalid_handle};
use super::path_arg;
use crate::fs::dir::Directory;
use crate::fs::ops;

/// Opens a cursor over the children of the directory at `path`, or returns `NULL`. The handle
/// must be released with [`pfs_directory_close`].
///
/// # Safety
/// `path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_directory_open(path: *const c_char) -> Option<Box<Directory>> {
    const OPERATION: &str = "pfs_directory_open";
    // SAFETY: Upheld by the caller.
    let path = unsafe { path_arg(path) }.recorded(OPERATION)?;
    Directory::open(path).map(Box::new).recorded(OPERATION)
}

/// Returns the name of the next entry, `.` and `..` included, or `NULL` once there are no more
/// (and from then on, until [`pfs_directory_rewind`]).
///
/// The name is owned by the handle and is only valid until the next call on it.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_directory_next(directory: Option<&mut Directory>) -> *const c_char {
    const OPERATION: &str = "pfs_directory_next";
    let Some(directory) = directory else {
        return invalid_handle(OPERATION, ptr::null());
    };
    directory
        .next_entry()
        .recorded(OPERATION)
        .flatten()
        .map_or(ptr::null(), CStr::as_ptr)
}

/// Starts the enumeration over, so that the next call to [`pfs_directory_next`] returns the first
/// entry again.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_directory_rewind(directory: Option<&mut Directory>) -> bool {
    const OPERATION: &str = "pfs_directory_rewind";
    let Some(directory) = directory else {
        return invalid_handle(OPERATION, false);
    };
    directory.rewind().recorded(OPERATION).is_some()
}

/// Closes the cursor and frees the handle. Does nothing when given `NULL`.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_directory_close(directory: Option<Box<Directory>>) {
    if let Some(directory) = directory {
        (*directory).close().recorded("pfs_directory_close");
    }
}

/// Creates a directory at `path`. Its parent must exist.
///
/// # Safety
/// `path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_directory_create(path: *const c_char) -> bool {
    const OPERATION: &str = "pfs_directory_create";
    // SAFETY: Upheld by the caller.
    let Some(path) = unsafe { path_arg(path) }.recorded(OPERATION) else {
        return false;
    };
    ops::create_dir(path).recorded(OPERATION).is_some()
}

/// Removes the directory at `path`, which must be empty.
///
/// # Safety
/// `path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_directory_remove_empty(path: *const c_char) -> bool {
    const OPERATION: &str = "pfs_directory_remove_empty";
    // SAFETY: Upheld by the caller.
    let Some(path) = unsafe { path_arg(path) }.recorded(OPERATION) else {
        return false;
    };
    ops::remove_empty_dir(path).recorded(OPERATION).is_some()
}
