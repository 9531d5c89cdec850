//! The per-thread last-error slot.
//!
//! Every C function reports failure with a sentinel (`NULL`, `false` or [`FAILURE`]) and stores a
//! description of what went wrong here. A host reads it by asking for the length with
//! [`pfs_last_error_length`], allocating that many bytes and calling [`pfs_last_error_message`]:
//!
//! ```c
//! if (pfs_file_open(path, 0, 3, 0) == NULL) {
//!     int length = pfs_last_error_length();
//!     char *message = malloc(length);
//!     pfs_last_error_message(message, length);
//!     printf("open failed: %s\n", message);
//!     free(message);
//! }
//! ```
//!
//! Reading the message clears it. Successful calls leave the slot untouched.

use std::cell::RefCell;
use std::error::Error;
use std::ffi::{c_char, c_int};
use std::fmt::Display;
use std::ptr::{self, NonNull};

/// The sentinel every integer-returning function uses for failure. It is never a valid size,
/// position or byte count.
pub const FAILURE: i64 = -1;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Replaces the calling thread's last error.
pub fn update_last_error<E: Display>(err: E) {
    LAST_ERROR.with(|prev| {
        *prev.borrow_mut() = Some(err.to_string());
    });
}

/// Retrieves the most recent error, clearing it in the process.
pub(crate) fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|prev| prev.borrow_mut().take())
}

/// Logs a failed call and stores it as the last error.
pub(crate) fn record<E: Error>(operation: &'static str, error: &E) {
    tracing::debug!(operation, %error, "call failed at the C boundary");
    update_last_error(format_args!("{operation}: {error}"));
}

/// Records an invalid handle for `operation` and hands back its failure value.
pub(crate) fn invalid_handle<T>(operation: &'static str, sentinel: T) -> T {
    record(operation, &crate::fs::InvalidHandleError);
    sentinel
}

pub(crate) trait ResultExtension<T> {
    /// Converts the result into an [`Option`], recording the error (if any) as the last error of
    /// the calling thread.
    fn recorded(self, operation: &'static str) -> Option<T>;
}

impl<T, E: Error> ResultExtension<T> for Result<T, E> {
    fn recorded(self, operation: &'static str) -> Option<T> {
        match self {
            Ok(val) => Some(val),
            Err(error) => {
                record(operation, &error);
                None
            },
        }
    }
}

/// Gets the length in bytes of the last error, including the NUL terminator, or zero if there
/// isn't one.
#[unsafe(no_mangle)]
pub extern "C" fn pfs_last_error_length() -> c_int {
    LAST_ERROR.with(|prev| match *prev.borrow() {
        Some(ref err) => c_int::try_from(err.len() + 1).unwrap_or(c_int::MAX),
        None => 0,
    })
}

/// Copies the last error into `buffer`, which is `length` bytes long, and clears it.
///
/// Returns the number of bytes written including the trailing NUL, `0` if there was no error, or
/// `-1` if `buffer` is null or too small. The error is cleared whenever `buffer` is non-null, even
/// if it turns out to be too small.
///
/// # Safety
/// `buffer` must be null or valid for writes of `length` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pfs_last_error_message(
    buffer: Option<NonNull<c_char>>,
    length: c_int,
) -> c_int {
    let Some(buffer) = buffer else {
        return -1;
    };

    let Some(error_message) = take_last_error() else {
        return 0;
    };

    let Ok(length) = usize::try_from(length) else {
        return -1;
    };
    if error_message.len() >= length {
        return -1;
    }

    let buffer = buffer.cast::<u8>().as_ptr();
    // SAFETY: The caller guarantees length writable bytes at buffer, and the message plus its
    // terminator is shorter than that. A freshly taken String can't overlap a foreign buffer.
    unsafe {
        ptr::copy_nonoverlapping(error_message.as_ptr(), buffer, error_message.len());
        buffer.add(error_message.len()).write(0);
    }

    // The length check above keeps this within c_int.
    error_message.len() as c_int + 1
}
