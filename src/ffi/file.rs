//! `pfs_file_*`: file handles, plus the path-based delete and truncate.

use std::ffi::{c_char, c_void};
use std::ptr;

use super::error::{FAILURE, ResultExtension, invalid_handle};
use super::{buffer_mut, buffer_ref, path_arg};
use crate::fs::file::{File, MapProtection, OpenOptions, SeekMode};
use crate::fs::{InvalidCodeError, OsError, PositionOverflowError, ops};

fn open_options(mode: u32, disposition: u32, flags: u32) -> Result<OpenOptions, InvalidCodeError> {
    Ok(OpenOptions::from_parts(
        mode.try_into()?,
        disposition.try_into()?,
        flags.try_into()?,
    ))
}

fn byte_count(result: Result<usize, OsError>, operation: &'static str) -> i64 {
    // Slices never exceed isize::MAX bytes.
    result.recorded(operation).map_or(FAILURE, |count| count as i64)
}

pub(super) fn position(result: Result<u64, OsError>, operation: &'static str) -> i64 {
    let Some(value) = result.recorded(operation) else {
        return FAILURE;
    };
    i64::try_from(value)
        .map_err(|_| PositionOverflowError)
        .recorded(operation)
        .unwrap_or(FAILURE)
}

/// Opens the file at `path`. `mode` is an [`OpenMode`](crate::fs::file::OpenMode) code,
/// `disposition` a [`CreationDisposition`](crate::fs::file::CreationDisposition) code and `flags`
/// an [`OpenFlags`](crate::fs::file::OpenFlags) mask.
///
/// Returns `NULL` on failure. The handle must be released with [`pfs_file_close`].
///
/// # Safety
/// `path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_file_open(
    path: *const c_char,
    mode: u32,
    disposition: u32,
    flags: u32,
) -> Option<Box<File>> {
    const OPERATION: &str = "pfs_file_open";
    // SAFETY: Upheld by the caller.
    let path = unsafe { path_arg(path) }.recorded(OPERATION)?;
    let options = open_options(mode, disposition, flags).recorded(OPERATION)?;
    options.open(path).map(Box::new).recorded(OPERATION)
}

/// Releases any mapping, whatever its count, then closes the file and frees the handle. Does
/// nothing when given `NULL`.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_file_close(file: Option<Box<File>>) {
    if let Some(file) = file {
        (*file).close().recorded("pfs_file_close");
    }
}

/// Returns the size of the file in bytes, or `-1`.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_file_get_size(file: Option<&File>) -> i64 {
    const OPERATION: &str = "pfs_file_get_size";
    let Some(file) = file else {
        return invalid_handle(OPERATION, FAILURE);
    };
    position(file.size(), OPERATION)
}

/// Moves the cursor. `mode` is a [`SeekMode`] code; an unknown one leaves the cursor alone and is
/// recorded as the last error, as is a failed seek.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_file_seek(file: Option<&File>, offset: i64, mode: u32) {
    const OPERATION: &str = "pfs_file_seek";
    let Some(file) = file else {
        return invalid_handle(OPERATION, ());
    };
    let Some(mode) = SeekMode::try_from(mode).recorded(OPERATION) else {
        return;
    };
    file.seek(offset, mode).recorded(OPERATION);
}

/// Returns the position of the cursor, or `-1`.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_file_tell(file: Option<&File>) -> i64 {
    const OPERATION: &str = "pfs_file_tell";
    let Some(file) = file else {
        return invalid_handle(OPERATION, FAILURE);
    };
    position(file.tell(), OPERATION)
}

/// Sets the length of the file, leaving the cursor where it was.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_file_truncate(file: Option<&File>, size: u64) -> bool {
    const OPERATION: &str = "pfs_file_truncate";
    let Some(file) = file else {
        return invalid_handle(OPERATION, false);
    };
    file.truncate(size).recorded(OPERATION).is_some()
}

/// Reads up to `size` bytes from the cursor into `buffer + buffer_offset`. Returns the number of
/// bytes read, `0` at the end of the file, or `-1`.
///
/// # Safety
/// Unless `size` is zero, `buffer + buffer_offset` must be valid for writes of `size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_file_read(
    file: Option<&File>,
    buffer: *mut c_void,
    buffer_offset: usize,
    size: usize,
) -> i64 {
    const OPERATION: &str = "pfs_file_read";
    let Some(file) = file else {
        return invalid_handle(OPERATION, FAILURE);
    };
    // SAFETY: Upheld by the caller.
    let Some(buf) = unsafe { buffer_mut(buffer, buffer_offset, size) }.recorded(OPERATION) else {
        return FAILURE;
    };
    byte_count(file.read(buf), OPERATION)
}

/// Writes up to `size` bytes from `buffer + buffer_offset` at the cursor. Returns the number of
/// bytes written, or `-1`.
///
/// # Safety
/// Unless `size` is zero, `buffer + buffer_offset` must be valid for reads of `size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_file_write(
    file: Option<&File>,
    buffer: *const c_void,
    buffer_offset: usize,
    size: usize,
) -> i64 {
    const OPERATION: &str = "pfs_file_write";
    let Some(file) = file else {
        return invalid_handle(OPERATION, FAILURE);
    };
    // SAFETY: Upheld by the caller.
    let Some(buf) = unsafe { buffer_ref(buffer, buffer_offset, size) }.recorded(OPERATION) else {
        return FAILURE;
    };
    byte_count(file.write(buf), OPERATION)
}

/// Like [`pfs_file_read`], but reads from `offset` in the file without using or moving the
/// cursor.
///
/// # Safety
/// Unless `size` is zero, `buffer + buffer_offset` must be valid for writes of `size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_file_read_at_offset(
    file: Option<&File>,
    buffer: *mut c_void,
    buffer_offset: usize,
    size: usize,
    offset: u64,
) -> i64 {
    const OPERATION: &str = "pfs_file_read_at_offset";
    let Some(file) = file else {
        return invalid_handle(OPERATION, FAILURE);
    };
    // SAFETY: Upheld by the caller.
    let Some(buf) = unsafe { buffer_mut(buffer, buffer_offset, size) }.recorded(OPERATION) else {
        return FAILURE;
    };
    byte_count(file.read_at(buf, offset), OPERATION)
}

/// Like [`pfs_file_write`], but writes at `offset` in the file without using or moving the
/// cursor.
///
/// # Safety
/// Unless `size` is zero, `buffer + buffer_offset` must be valid for reads of `size` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_file_write_at_offset(
    file: Option<&File>,
    buffer: *const c_void,
    buffer_offset: usize,
    size: usize,
    offset: u64,
) -> i64 {
    const OPERATION: &str = "pfs_file_write_at_offset";
    let Some(file) = file else {
        return invalid_handle(OPERATION, FAILURE);
    };
    // SAFETY: Upheld by the caller.
    let Some(buf) = unsafe { buffer_ref(buffer, buffer_offset, size) }.recorded(OPERATION) else {
        return FAILURE;
    };
    byte_count(file.write_at(buf, offset), OPERATION)
}

/// Maps the whole file, or takes another reference to the live mapping. `protection` is a
/// [`MapProtection`] code. Returns the base address, or `NULL`.
///
/// The address stays valid until the matching number of [`pfs_file_memory_unmap`] calls, or
/// [`pfs_file_close`].
#[unsafe(no_mangle)]
pub extern "C" fn pfs_file_memory_map(file: Option<&mut File>, protection: u32) -> *mut c_void {
    const OPERATION: &str = "pfs_file_memory_map";
    let Some(file) = file else {
        return invalid_handle(OPERATION, ptr::null_mut());
    };
    let Some(protection) = MapProtection::try_from(protection).recorded(OPERATION) else {
        return ptr::null_mut();
    };
    file.map(protection)
        .recorded(OPERATION)
        .map_or(ptr::null_mut(), |base| base.as_ptr().cast())
}

/// Drops one reference to the mapping, releasing it once none are left. Does nothing if the file
/// isn't mapped.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_file_memory_unmap(file: Option<&mut File>) {
    const OPERATION: &str = "pfs_file_memory_unmap";
    let Some(file) = file else {
        return invalid_handle(OPERATION, ());
    };
    file.unmap().recorded(OPERATION);
}

/// Deletes the file at `path`.
///
/// # Safety
/// `path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_file_delete(path: *const c_char) -> bool {
    const OPERATION: &str = "pfs_file_delete";
    // SAFETY: Upheld by the caller.
    let Some(path) = unsafe { path_arg(path) }.recorded(OPERATION) else {
        return false;
    };
    ops::delete_file(path).recorded(OPERATION).is_some()
}

/// Sets the length of the file at `path` without leaving it open.
///
/// # Safety
/// `path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_file_truncate_path(path: *const c_char, size: u64) -> bool {
    const OPERATION: &str = "pfs_file_truncate_path";
    // SAFETY: Upheld by the caller.
    let Some(path) = unsafe { path_arg(path) }.recorded(OPERATION) else {
        return false;
    };
    ops::truncate_path(path, size).recorded(OPERATION).is_some()
}
