//! The C boundary.
//!
//! Handles are boxed Rust values passed across as opaque pointers: an open function returns
//! `Box<T>` (a non-null pointer, or `NULL` on failure) and the matching close function takes it
//! back. Everything in between borrows it as `Option<&T>` or `Option<&mut T>`, so a `NULL` handle is
//! caught and reported instead of dereferenced. Using a handle after closing it is undefined, as
//! with any C API.
//!
//! No function here panics or aborts. Failures become the sentinel listed on each function
//! (`NULL`, `false` or [`FAILURE`]) and the reason is kept as the thread's last error, see
//! [`error`].
//!
//! Enumerated arguments use the integer codes of the corresponding Rust enums, for example
//! [`OpenMode`](crate::fs::file::OpenMode) and [`SeekMode`](crate::fs::file::SeekMode). Paths are
//! NUL-terminated UTF-8.

use std::ffi::{CStr, c_char, c_void};
use std::slice;

use crate::fs::NullBufferError;
use crate::fs::path::{PathError, from_c_str};

pub mod dir;
pub mod error;
pub mod file;

pub use dir::*;
pub use error::*;
pub use file::*;

/// Borrows a C path argument as UTF-8. A null pointer counts as an empty path.
///
/// # Safety
/// `path` must be null or point to a NUL-terminated string that stays valid and unmodified for
/// `'a`.
pub(crate) unsafe fn path_arg<'a>(path: *const c_char) -> Result<&'a str, PathError> {
    if path.is_null() {
        return Err(crate::fs::EmptyPathError.into());
    }
    // SAFETY: Non-null, and the caller guarantees termination and lifetime.
    from_c_str(unsafe { CStr::from_ptr(path) })
}

/// Borrows `size` bytes starting `offset` bytes into `buffer`. `buffer` may only be null when
/// `size` is zero.
///
/// # Safety
/// Unless `size` is zero, `buffer + offset` must be valid for reads and writes of `size` bytes for
/// `'a`, and nothing else may access that memory meanwhile.
pub(crate) unsafe fn buffer_mut<'a>(
    buffer: *mut c_void,
    offset: usize,
    size: usize,
) -> Result<&'a mut [u8], NullBufferError> {
    if size == 0 {
        return Ok(&mut []);
    }
    if buffer.is_null() {
        Err(NullBufferError)?
    }
    // SAFETY: Guaranteed by the caller.
    Ok(unsafe { slice::from_raw_parts_mut(buffer.cast::<u8>().add(offset), size) })
}

/// Borrows `size` bytes starting `offset` bytes into `buffer`. `buffer` may only be null when
/// `size` is zero.
///
/// # Safety
/// Unless `size` is zero, `buffer + offset` must be valid for reads of `size` bytes for `'a`, and
/// nothing may write to that memory meanwhile.
pub(crate) unsafe fn buffer_ref<'a>(
    buffer: *const c_void,
    offset: usize,
    size: usize,
) -> Result<&'a [u8], NullBufferError> {
    if size == 0 {
        return Ok(&[]);
    }
    if buffer.is_null() {
        Err(NullBufferError)?
    }
    // SAFETY: Guaranteed by the caller.
    Ok(unsafe { slice::from_raw_parts(buffer.cast::<u8>().add(offset), size) })
}

mod tests;
