//! Types for enumerating the immediate children of a directory, primarily [`Directory`].
//!
//! A `Directory` is a cursor. Opening it reads the first entry straight away, every
//! [`next_entry`](Directory::next_entry) hands out one name, and once the entries run out it
//! keeps reporting the end until [`rewind`](Directory::rewind) starts it over. Names come in
//! whatever order the OS produces them and include `.` and `..`; nothing is filtered or sorted
//! here.

mod dir;
mod error;

pub use dir::*;
pub use error::*;
