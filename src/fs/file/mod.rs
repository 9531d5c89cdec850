//! The [`File`] handle and everything needed to open one.
//!
//! A `File` owns exactly one native descriptor (a POSIX file descriptor or a Win32 `HANDLE`) and
//! the reference-counted memory mapping attached to it. Opening is described with the portable
//! vocabulary in [`options`]: an [`OpenMode`], a [`CreationDisposition`] and [`OpenFlags`], each
//! with the stable integer codes the C boundary uses.
//!
//! # Cursor
//! Sequential [`read`](File::read) and [`write`](File::write) move the implicit cursor that
//! [`seek`](File::seek) and [`tell`](File::tell) observe. The positioned variants,
//! [`read_at`](File::read_at) and [`write_at`](File::write_at), never do, so both styles of access
//! can be interleaved on one handle.
//!
//! # Mapping
//! [`map`](File::map) and [`unmap`](File::unmap) nest: the first `map` establishes a shared view
//! of the whole file, later calls hand out the same address, and the view is released when the
//! last matching `unmap` arrives. Closing (or dropping) the file releases the view whatever the
//! count.

mod file;
mod mmap;
mod options;
mod union_errors;

pub use file::*;
pub use options::*;
pub use union_errors::*;

pub(crate) use mmap::MapState;
