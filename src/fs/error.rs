use std::fmt::{self, Formatter};
use std::io;

use derive_more::{Display, Error};

/// A failed native call, carrying the raw `errno` value on unix or the Win32 error code on
/// Windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct OsError(#[error(not(source))] pub i32);

impl OsError {
    /// Captures the calling thread's last OS error. Must be called straight after the failing
    /// native call, before anything else can overwrite it.
    pub fn last() -> OsError {
        // SAFETY: raw_os_error guarantees Some if constructed from last_os_error.
        OsError(unsafe { io::Error::last_os_error().raw_os_error().unwrap_unchecked() })
    }

    pub const fn code(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", io::Error::from_raw_os_error(self.0))
    }
}

impl From<OsError> for io::Error {
    fn from(value: OsError) -> Self {
        io::Error::from_raw_os_error(value.0)
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path is empty")]
pub struct EmptyPathError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path is not valid UTF-8")]
pub struct InvalidUtf8Error;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path contains an interior nul byte")]
pub struct InteriorNulError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("cannot map a zero-length file")]
pub struct ZeroLengthError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("file is too large to map into the address space")]
pub struct OversizedFileError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("file is already mapped read-only and cannot be remapped read-write")]
pub struct ProtectionMismatchError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("position does not fit in a signed 64-bit integer")]
pub struct PositionOverflowError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("handle is null or has been closed")]
pub struct InvalidHandleError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("buffer is null but the requested size is not zero")]
pub struct NullBufferError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("invalid {kind} code: {value}")]
pub struct InvalidCodeError {
    pub kind: &'static str,
    pub value: u32,
}
