use std::ffi::CString;
use std::iter;

use super::PathError;
use super::path::check;
use crate::fs::error::InteriorNulError;

/// Prepended to absolute drive paths so they may exceed `MAX_PATH`.
pub const EXTENDED_LENGTH_PREFIX: &str = r"\\?\";

const WILDCARD_SUFFIX: &str = r"\*";

/// Matches the `X:\...` form. Relative paths, UNC paths and drive-relative paths (`X:foo`) are
/// left alone, the prefix would change their meaning.
pub fn is_absolute_drive_path(path: &str) -> bool {
    matches!(path.as_bytes(), [drive, b':', b'\\', ..] if drive.is_ascii_alphabetic())
}

pub fn to_wide(path: &str) -> Result<Vec<u16>, PathError> {
    check(path)?;

    let prefix = if is_absolute_drive_path(path) {
        EXTENDED_LENGTH_PREFIX
    } else {
        ""
    };

    Ok(prefix
        .encode_utf16()
        .chain(path.encode_utf16())
        .chain(iter::once(0))
        .collect())
}

/// Builds the `path\*` pattern that starts a directory search.
pub fn to_wide_wildcard(path: &str) -> Result<Vec<u16>, PathError> {
    check(path)?;
    // A doubled separator isn't normalized away once the extended-length prefix is in place.
    let trimmed = path.trim_end_matches(['\\', '/']);
    to_wide(&format!("{trimmed}{WILDCARD_SUFFIX}"))
}

/// Decodes a (possibly nul-terminated) UTF-16 name. Unpaired surrogates, which NTFS allows, are
/// replaced with U+FFFD rather than failing the whole entry.
pub fn from_wide(wide: &[u16]) -> Result<CString, PathError> {
    let end = wide.iter().position(|&unit| unit == 0).unwrap_or(wide.len());
    let name = String::from_utf16_lossy(&wide[..end]);
    CString::new(name).map_err(|_| InteriorNulError.into())
}
