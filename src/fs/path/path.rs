use std::ffi::{CStr, CString};

use super::PathError;
use crate::fs::error::{EmptyPathError, InteriorNulError, InvalidUtf8Error};

/// The representation native calls take a path in: a nul-terminated byte string.
#[cfg(unix)]
pub type NativePath = CString;

/// The representation native calls take a path in: nul-terminated UTF-16, prefixed with `\\?\`
/// when absolute.
#[cfg(windows)]
pub type NativePath = Vec<u16>;

/// Converts a portable path into the platform's native form. Nothing is touched on disk, so a
/// failure here means the native call is never attempted.
pub fn translate(path: &str) -> Result<NativePath, PathError> {
    #[cfg(unix)]
    {
        to_c_path(path)
    }
    #[cfg(windows)]
    {
        super::to_wide(path)
    }
}

pub fn to_c_path(path: &str) -> Result<CString, PathError> {
    check(path)?;
    CString::new(path).map_err(|_| InteriorNulError.into())
}

/// Reads a path that was handed across the C boundary.
pub fn from_c_str(path: &CStr) -> Result<&str, PathError> {
    if path.is_empty() {
        Err(EmptyPathError)?
    }
    path.to_str().map_err(|_| InvalidUtf8Error.into())
}

pub(crate) fn check(path: &str) -> Result<(), PathError> {
    match path {
        "" => Err(EmptyPathError)?,
        p if p.contains('\0') => Err(InteriorNulError)?,
        _ => Ok(()),
    }
}
