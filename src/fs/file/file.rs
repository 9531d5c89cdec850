use std::ptr::NonNull;
use std::slice;

use super::{MapError, MapProtection, MapState, OpenError, OpenOptions, SeekMode};
use crate::fs::error::{OsError, OversizedFileError, ZeroLengthError};
use crate::fs::sys::{NativeFile, NativeView, RawFile};

#[derive(Debug)]
pub struct File {
    // Declared first so that dropping a File releases the view before the descriptor.
    pub(crate) map: MapState,
    pub(crate) raw: RawFile,
}

impl File {
    /// Opens an existing file for reading.
    pub fn open(file_path: &str) -> Result<File, OpenError> {
        File::options().open(file_path)
    }

    /// Opens a file for reading and writing, creating it or truncating it to zero length.
    pub fn create(file_path: &str) -> Result<File, OpenError> {
        File::options()
            .read_write()
            .create_always()
            .open(file_path)
    }

    pub fn options() -> OpenOptions {
        OpenOptions::new()
    }

    pub(crate) fn from_raw(raw: RawFile) -> File {
        File {
            map: MapState::default(),
            raw,
        }
    }

    /// Releases any mapping (whatever its count), then the descriptor. Both are attempted even if
    /// the first fails; the first error is returned.
    pub fn close(mut self) -> Result<(), OsError> {
        let unmapped = self.map.teardown();
        let closed = self.raw.close();
        unmapped.and(closed)
    }

    pub fn size(&self) -> Result<u64, OsError> {
        self.raw.size()
    }

    /// Moves the cursor, returning its new position.
    pub fn seek(&self, offset: i64, mode: SeekMode) -> Result<u64, OsError> {
        self.raw.seek(offset, mode)
    }

    pub fn tell(&self) -> Result<u64, OsError> {
        self.raw.seek(0, SeekMode::Current)
    }

    /// Sets the length of the file to exactly `size`, filling with zeros when growing. The
    /// cursor is left where it was.
    pub fn truncate(&self, size: u64) -> Result<(), OsError> {
        self.raw.truncate(size)
    }

    /// Reads from the cursor, advancing it. `Ok(0)` means end of file.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, OsError> {
        self.raw.read(buf)
    }

    pub fn write(&self, buf: &[u8]) -> Result<usize, OsError> {
        self.raw.write(buf)
    }

    /// Reads from `offset` without consulting or moving the cursor.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, OsError> {
        self.raw.read_at(buf, offset)
    }

    /// Writes at `offset` without consulting or moving the cursor.
    pub fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize, OsError> {
        self.raw.write_at(buf, offset)
    }

    /// Maps the whole file into memory, returning the base address.
    ///
    /// The first call captures the file's size and establishes a shared mapping; while that
    /// mapping is live, further calls only bump the reference count and return the same address.
    /// A read-only mapping can't serve a read-write request, which fails with
    /// [`MapError::ProtectionMismatch`] and leaves the count alone.
    ///
    /// Empty files can't be mapped.
    pub fn map(&mut self, protection: MapProtection) -> Result<NonNull<u8>, MapError> {
        let raw = &self.raw;
        self.map.acquire(protection, || {
            let len = match raw.size()? {
                0 => Err(ZeroLengthError)?,
                size => usize::try_from(size).map_err(|_| OversizedFileError)?,
            };
            Ok(raw.map(len, protection)?)
        })
    }

    /// Releases one reference to the mapping, unmapping when the count reaches zero. Does
    /// nothing if the file isn't mapped.
    pub fn unmap(&mut self) -> Result<(), OsError> {
        self.map.release()
    }

    pub const fn map_count(&self) -> usize {
        self.map.count()
    }

    pub fn is_mapped(&self) -> bool {
        self.map.view().is_some()
    }

    pub fn mapped_len(&self) -> Option<usize> {
        self.map.view().map(NativeView::len)
    }

    /// Views the live mapping as a byte slice.
    ///
    /// # Safety
    /// The mapping is shared with the file on disk: the caller must ensure nothing (this handle's
    /// `write`s, another handle or another process) modifies or truncates the file while the slice
    /// is alive.
    pub unsafe fn mapped_bytes(&self) -> Option<&[u8]> {
        self.map.view().map(|view| {
            // SAFETY: The view covers len readable bytes for as long as it is held by self.map,
            // which the borrow of self guarantees. Stability of the contents is on the caller.
            unsafe { slice::from_raw_parts(view.as_ptr().as_ptr(), view.len()) }
        })
    }
}
