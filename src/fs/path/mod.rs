//! Translation of portable UTF-8 paths into what each platform's native calls expect.
//!
//! On unix this is the identity: the path bytes become a nul-terminated [`CString`]. On Windows
//! the path is re-encoded as UTF-16 and absolute drive paths gain the `\\?\` prefix, which lifts
//! the 260 character `MAX_PATH` limit. The UTF-16 helpers in this module are plain functions
//! compiled on every platform, so the Windows rules can be checked from any host.
//!
//! [`CString`]: std::ffi::CString

mod error;
mod path;
mod wide;

pub use error::*;
pub use path::*;
pub use wide::*;
