use std::ffi::CString;
use std::fmt::{self, Debug, Formatter};
use std::mem::{self, ManuallyDrop};
use std::ptr::NonNull;

use windows::Win32::Foundation::{
    CloseHandle, ERROR_HANDLE_EOF, ERROR_INVALID_PARAMETER, ERROR_NO_MORE_FILES, GENERIC_READ,
    GENERIC_WRITE, HANDLE,
};
use windows::Win32::Storage::FileSystem::{
    CREATE_ALWAYS, CREATE_NEW, CreateDirectoryW, CreateFileW, DeleteFileW, FILE_ATTRIBUTE_NORMAL,
    FILE_BEGIN, FILE_CREATION_DISPOSITION, FILE_CURRENT, FILE_END, FILE_SHARE_DELETE,
    FILE_SHARE_READ, FILE_SHARE_WRITE, FindClose,
    FindFirstFileW, FindNextFileW, GetFileSizeEx, OPEN_ALWAYS, OPEN_EXISTING, ReadFile,
    RemoveDirectoryW, SetEndOfFile, SetFilePointerEx, TRUNCATE_EXISTING, WIN32_FIND_DATAW,
    WriteFile,
};
use windows::Win32::System::IO::{OVERLAPPED, OVERLAPPED_0, OVERLAPPED_0_0};
use windows::Win32::System::Memory::{
    CreateFileMappingW, FILE_MAP_READ, FILE_MAP_WRITE, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    PAGE_READONLY, PAGE_READWRITE, UnmapViewOfFile,
};
use windows::core::PCWSTR;

use super::{NativeDir, NativeFile, NativeFs, NativeView};
use crate::fs::dir::DirError;
use crate::fs::error::OsError;
use crate::fs::file::{CreationDisposition, MapProtection, OpenError, OpenMode, OpenOptions, SeekMode};
use crate::fs::ops::PathOpError;
use crate::fs::path;

pub(crate) type RawFile = Handle;
pub(crate) type RawDir = FindCursor;
pub(crate) type Platform = Win32;

/// The largest transfer a single `ReadFile` or `WriteFile` can carry. Bigger requests come back
/// short.
const MAX_IO: usize = u32::MAX as usize;

// The windows crate reports failures as HRESULTs. Win32 errors arrive wrapped as 0x8007xxxx, so
// unwrap those back to the plain code that GetLastError would have given.
impl From<windows::core::Error> for OsError {
    fn from(value: windows::core::Error) -> Self {
        let code = value.code().0 as u32;
        if code & 0xFFFF_0000 == 0x8007_0000 {
            OsError((code & 0xFFFF) as i32)
        } else {
            OsError(code as i32)
        }
    }
}

const fn desired_access(options: &OpenOptions) -> u32 {
    match options.access_mode() {
        OpenMode::ReadOnly => GENERIC_READ.0,
        OpenMode::WriteOnly => GENERIC_WRITE.0,
        OpenMode::ReadWrite => GENERIC_READ.0 | GENERIC_WRITE.0,
    }
}

const fn creation_disposition(options: &OpenOptions) -> FILE_CREATION_DISPOSITION {
    match options.creation_disposition() {
        CreationDisposition::CreateNew => CREATE_NEW,
        CreationDisposition::CreateAlways => CREATE_ALWAYS,
        CreationDisposition::OpenExisting => OPEN_EXISTING,
        CreationDisposition::OpenAlways => OPEN_ALWAYS,
        CreationDisposition::TruncateExisting => TRUNCATE_EXISTING,
    }
}

fn overlapped_at(offset: u64) -> OVERLAPPED {
    OVERLAPPED {
        Anonymous: OVERLAPPED_0 {
            Anonymous: OVERLAPPED_0_0 {
                Offset: offset as u32,
                OffsetHigh: (offset >> 32) as u32,
            },
        },
        ..Default::default()
    }
}

fn to_signed(value: u64) -> Result<i64, OsError> {
    i64::try_from(value).map_err(|_| OsError(ERROR_INVALID_PARAMETER.0 as i32))
}

pub(crate) struct Handle {
    raw: HANDLE,
    /// Win32 has no append-only open that still allows truncation, so sequential writes move to
    /// the end themselves.
    append: bool,
}

impl Handle {
    /// Runs a positioned transfer, putting the cursor back afterwards: on a synchronous handle an
    /// `OVERLAPPED` offset moves the file pointer too.
    fn preserving_cursor<T, F>(&self, transfer: F) -> Result<T, OsError>
    where
        F: FnOnce() -> Result<T, OsError>,
    {
        let cursor = self.seek(0, SeekMode::Current)?;
        let result = transfer();
        self.seek(to_signed(cursor)?, SeekMode::Set)?;
        result
    }
}

impl NativeFile for Handle {
    type View = MappedView;

    fn open(path: &str, options: &OpenOptions) -> Result<Handle, OpenError> {
        let wide = path::translate(path)?;

        // SAFETY: wide is nul-terminated and outlives the call.
        let handle = unsafe {
            CreateFileW(
                PCWSTR(wide.as_ptr()),
                desired_access(options),
                FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
                None,
                creation_disposition(options),
                FILE_ATTRIBUTE_NORMAL,
                HANDLE::default(),
            )
        }
        .map_err(OsError::from)?;

        Ok(Handle {
            raw: handle,
            append: options.flags().append(),
        })
    }

    fn close(self) -> Result<(), OsError> {
        let handle = ManuallyDrop::new(self);
        // SAFETY: CloseHandle invalidates the handle regardless of the outcome, and ManuallyDrop
        // stops Drop from closing it a second time.
        Ok(unsafe { CloseHandle(handle.raw) }?)
    }

    fn size(&self) -> Result<u64, OsError> {
        let mut size = 0_i64;
        // SAFETY: size is valid for writes.
        unsafe { GetFileSizeEx(self.raw, &mut size) }?;
        Ok(size as u64)
    }

    fn seek(&self, offset: i64, mode: SeekMode) -> Result<u64, OsError> {
        let method = match mode {
            SeekMode::Set => FILE_BEGIN,
            SeekMode::Current => FILE_CURRENT,
            SeekMode::End => FILE_END,
        };

        let mut position = 0_i64;
        // SAFETY: position is valid for writes.
        unsafe { SetFilePointerEx(self.raw, offset, Some(&raw mut position), method) }?;
        Ok(position as u64)
    }

    fn truncate(&self, size: u64) -> Result<(), OsError> {
        // SetEndOfFile cuts at the file pointer, so it has to be moved there and back.
        let target = to_signed(size)?;
        let original = self.seek(0, SeekMode::Current)?;
        self.seek(target, SeekMode::Set)?;

        // SAFETY: The handle is open for as long as self exists.
        let committed = unsafe { SetEndOfFile(self.raw) }.map_err(OsError::from);
        let restored = self.seek(to_signed(original)?, SeekMode::Set);

        committed.and(restored).map(drop)
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, OsError> {
        let len = buf.len().min(MAX_IO);
        let mut read = 0_u32;
        // SAFETY: The buffer and counter are valid for writes, no OVERLAPPED is involved.
        unsafe { ReadFile(self.raw, Some(&mut buf[..len]), Some(&raw mut read), None) }?;
        Ok(read as usize)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, OsError> {
        let len = buf.len().min(MAX_IO);
        if self.append {
            self.seek(0, SeekMode::End)?;
        }
        let mut written = 0_u32;
        // SAFETY: The buffer is valid for reads and the counter for writes.
        unsafe { WriteFile(self.raw, Some(&buf[..len]), Some(&raw mut written), None) }?;
        Ok(written as usize)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, OsError> {
        let len = buf.len().min(MAX_IO);
        self.preserving_cursor(|| {
            let mut overlapped = overlapped_at(offset);
            let mut read = 0_u32;
            // SAFETY: The handle is synchronous, so overlapped only needs to live for the call.
            let transferred = unsafe {
                ReadFile(self.raw, Some(&mut buf[..len]), Some(&raw mut read), Some(&raw mut overlapped))
            };
            match transferred {
                Ok(()) => Ok(read as usize),
                Err(error) if error.code() == ERROR_HANDLE_EOF.to_hresult() => Ok(0),
                Err(error) => Err(error.into()),
            }
        })
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize, OsError> {
        let len = buf.len().min(MAX_IO);
        self.preserving_cursor(|| {
            let mut overlapped = overlapped_at(offset);
            let mut written = 0_u32;
            // SAFETY: The handle is synchronous, so overlapped only needs to live for the call.
            unsafe {
                WriteFile(self.raw, Some(&buf[..len]), Some(&raw mut written), Some(&raw mut overlapped))
            }?;
            Ok(written as usize)
        })
    }

    fn map(&self, len: usize, protection: MapProtection) -> Result<MappedView, OsError> {
        let (page, access) = match protection {
            MapProtection::ReadOnly => (PAGE_READONLY, FILE_MAP_READ),
            MapProtection::ReadWrite => (PAGE_READWRITE, FILE_MAP_WRITE),
        };

        // A maximum size of zero means the file's current size, which can't grow the file.
        // SAFETY: The handle is open; the mapping object is unnamed and has default security.
        let mapping = unsafe { CreateFileMappingW(self.raw, None, page, 0, 0, PCWSTR::null()) }?;
        // SAFETY: mapping was just created and covers at least len bytes.
        let view = unsafe { MapViewOfFile(mapping, access, 0, 0, len) };

        match NonNull::new(view.Value.cast::<u8>()) {
            Some(ptr) => Ok(MappedView {
                mapping,
                ptr,
                len,
            }),
            None => {
                let error = OsError::last();
                // SAFETY: mapping is owned here and not used again.
                let _ = unsafe { CloseHandle(mapping) };
                Err(error)
            },
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        // SAFETY: After this, the handle is invalidated but we are dropping self so it doesn't
        // matter.
        if let Err(error) = unsafe { CloseHandle(self.raw) } {
            tracing::warn!(error = %OsError::from(error), "error while dropping file handle");
        }
    }
}

impl Debug for Handle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("raw", &self.raw.0)
            .field("append", &self.append)
            .finish()
    }
}

#[derive(Debug)]
pub(crate) struct MappedView {
    mapping: HANDLE,
    ptr: NonNull<u8>,
    len: usize,
}

impl MappedView {
    fn release(&self) -> Result<(), OsError> {
        let address = MEMORY_MAPPED_VIEW_ADDRESS {
            Value: self.ptr.as_ptr().cast(),
        };
        // SAFETY: The view and mapping were created together in map and haven't been released;
        // callers make sure this runs at most once.
        let unmapped = unsafe { UnmapViewOfFile(address) }.map_err(OsError::from);
        // SAFETY: As above.
        let closed = unsafe { CloseHandle(self.mapping) }.map_err(OsError::from);
        unmapped.and(closed)
    }
}

impl NativeView for MappedView {
    fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    fn len(&self) -> usize {
        self.len
    }

    fn unmap(self) -> Result<(), OsError> {
        ManuallyDrop::new(self).release()
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            tracing::warn!(%error, len = self.len, "error while dropping file mapping");
        }
    }
}

/// An open `FindFirstFileW` search. Closed with `FindClose`, not `CloseHandle`.
struct FindHandle(HANDLE);

impl FindHandle {
    fn first(pattern: &[u16], data: &mut WIN32_FIND_DATAW) -> Result<FindHandle, OsError> {
        // SAFETY: pattern is nul-terminated and data is valid for writes.
        let handle = unsafe { FindFirstFileW(PCWSTR(pattern.as_ptr()), data) }?;
        Ok(FindHandle(handle))
    }

    fn close(self) -> Result<(), OsError> {
        let handle = ManuallyDrop::new(self);
        // SAFETY: FindClose releases the search regardless of the outcome, and ManuallyDrop stops
        // Drop from closing it a second time.
        Ok(unsafe { FindClose(handle.0) }?)
    }
}

impl Drop for FindHandle {
    fn drop(&mut self) {
        // SAFETY: The search is open and is never used again after this.
        if let Err(error) = unsafe { FindClose(self.0) } {
            tracing::warn!(error = %OsError::from(error), "error while dropping directory search");
        }
    }
}

pub(crate) struct FindCursor {
    /// The `path\*` pattern, kept so the search can be restarted.
    pattern: Vec<u16>,
    find: FindHandle,
    data: WIN32_FIND_DATAW,
}

impl FindCursor {
    fn current_name(&self) -> Result<CString, DirError> {
        Ok(path::from_wide(&self.data.cFileName)?)
    }
}

impl NativeDir for FindCursor {
    fn start(path: &str) -> Result<(FindCursor, Option<CString>), DirError> {
        let pattern = path::to_wide_wildcard(path)?;
        let mut data = WIN32_FIND_DATAW::default();
        let find = FindHandle::first(&pattern, &mut data)?;

        let cursor = FindCursor {
            pattern,
            find,
            data,
        };
        let first = cursor.current_name()?;
        Ok((cursor, Some(first)))
    }

    fn advance(&mut self) -> Result<Option<CString>, DirError> {
        // SAFETY: The search is open and data is valid for writes.
        match unsafe { FindNextFileW(self.find.0, &mut self.data) } {
            Ok(()) => Ok(Some(self.current_name()?)),
            Err(error) if error.code() == ERROR_NO_MORE_FILES.to_hresult() => Ok(None),
            Err(error) => Err(OsError::from(error))?,
        }
    }

    fn restart(&mut self) -> Result<Option<CString>, DirError> {
        let mut data = WIN32_FIND_DATAW::default();
        let find = FindHandle::first(&self.pattern, &mut data)?;

        let stale = mem::replace(&mut self.find, find);
        self.data = data;
        drop(stale);

        Ok(Some(self.current_name()?))
    }

    fn close(self) -> Result<(), OsError> {
        self.find.close()
    }
}

impl Debug for FindCursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindCursor")
            .field("pattern", &String::from_utf16_lossy(&self.pattern))
            .field("find", &self.find.0.0)
            .finish()
    }
}

#[derive(Debug)]
pub(crate) enum Win32 {}

impl NativeFs for Win32 {
    fn delete_file(path: &str) -> Result<(), PathOpError> {
        let wide = path::translate(path)?;
        // SAFETY: wide is nul-terminated and outlives the call.
        unsafe { DeleteFileW(PCWSTR(wide.as_ptr())) }.map_err(OsError::from)?;
        Ok(())
    }

    fn truncate_path(path: &str, size: u64) -> Result<(), PathOpError> {
        let mut options = OpenOptions::new();
        options.write_only();

        let file = Handle::open(path, &options)?;
        file.truncate(size)?;
        Ok(file.close()?)
    }

    fn create_dir(path: &str) -> Result<(), PathOpError> {
        let wide = path::translate(path)?;
        // SAFETY: wide is nul-terminated and outlives the call.
        unsafe { CreateDirectoryW(PCWSTR(wide.as_ptr()), None) }.map_err(OsError::from)?;
        Ok(())
    }

    fn remove_empty_dir(path: &str) -> Result<(), PathOpError> {
        let wide = path::translate(path)?;
        // SAFETY: wide is nul-terminated and outlives the call.
        unsafe { RemoveDirectoryW(PCWSTR(wide.as_ptr())) }.map_err(OsError::from)?;
        Ok(())
    }
}
