//! A thin, handle-based file and directory layer with one contract across POSIX and Win32.
//!
//! # Purpose
//! This crate exists to be called from a managed host runtime through a foreign-function
//! interface. The host gets exactly one code path for opening, seeking, reading, writing,
//! truncating, memory mapping and enumerating, regardless of which operating system it runs on.
//! Every operation is a synchronous wrapper over (usually) a single native call. There is no
//! buffering, no async I/O and no virtual filesystem.
//!
//! # Layout
//! - [`fs`] holds the Rust API: [`File`](fs::file::File), [`Directory`](fs::dir::Directory), the
//!   stateless helpers in [`fs::ops`] and the path translation rules in [`fs::path`].
//! - `ffi` (behind the default `ffi` feature) exposes the same operations as `extern "C"`
//!   functions over opaque boxed handles, turning every error into a sentinel value.
//!
//! The native backend is picked at build time: `libc` on unix targets and the `windows` crate on
//! Windows. Both implement the same crate-internal traits, so the handle types above them don't
//! contain any platform conditionals.
//!
//! # Error Handling
//! Errors are strongly typed, following the same pattern throughout: zero-sized structs that
//! implement [`Error`](std::error::Error), collected into enums for static dispatch. Nothing in
//! the library panics on a runtime failure, because a panic can't cross the C boundary anyway.
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

#[cfg(feature = "ffi")]
pub mod ffi;
pub mod fs;
