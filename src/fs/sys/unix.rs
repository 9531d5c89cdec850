use std::ffi::{CStr, CString};
use std::fmt::{self, Debug, Formatter};
use std::mem::{ManuallyDrop, MaybeUninit};
use std::ptr::{self, NonNull};

use errno::Errno;
use libc::{
    O_APPEND, O_CLOEXEC, O_CREAT, O_EXCL, O_RDONLY, O_RDWR, O_TRUNC, O_WRONLY, c_int, c_uint, off_t,
    stat as Stat,
};

use super::{NativeDir, NativeFile, NativeFs, NativeView};
use crate::fs::dir::DirError;
use crate::fs::error::OsError;
use crate::fs::file::{CreationDisposition, MapProtection, OpenError, OpenMode, OpenOptions, SeekMode};
use crate::fs::ops::PathOpError;
use crate::fs::path;

pub(crate) type RawFile = Fd;
pub(crate) type RawDir = DirStream;
pub(crate) type Platform = Unix;

/// Permission bits for newly created files, before the umask.
const FILE_MODE: c_uint = 0o644;
/// Permission bits for newly created directories, before the umask.
const DIR_MODE: libc::mode_t = 0o777;

/// The largest transfer a single read or write is asked for. Bigger requests come back short.
const MAX_IO: usize = isize::MAX as usize;

const fn open_flags(options: &OpenOptions) -> c_int {
    let access = match options.access_mode() {
        OpenMode::ReadOnly => O_RDONLY,
        OpenMode::WriteOnly => O_WRONLY,
        OpenMode::ReadWrite => O_RDWR,
    };
    let creation = match options.creation_disposition() {
        CreationDisposition::CreateNew => O_CREAT | O_EXCL,
        CreationDisposition::CreateAlways => O_CREAT | O_TRUNC,
        CreationDisposition::OpenExisting => 0,
        CreationDisposition::OpenAlways => O_CREAT,
        CreationDisposition::TruncateExisting => O_TRUNC,
    };
    let append = if options.flags().append() { O_APPEND } else { 0 };

    access | creation | append | O_CLOEXEC
}

fn to_off(offset: u64) -> Result<off_t, OsError> {
    off_t::try_from(offset).map_err(|_| OsError(libc::EINVAL))
}

fn cvt(result: c_int) -> Result<(), OsError> {
    match result {
        -1 => Err(OsError::last()),
        _ => Ok(()),
    }
}

fn cvt_count(result: isize) -> Result<usize, OsError> {
    match result {
        -1 => Err(OsError::last()),
        count => Ok(count as usize),
    }
}

#[derive(Debug)]
pub(crate) struct Fd(c_int);

impl NativeFile for Fd {
    type View = MappedView;

    fn open(path: &str, options: &OpenOptions) -> Result<Fd, OpenError> {
        let pathname = path::translate(path)?;

        // SAFETY: pathname is nul-terminated and outlives the call.
        match unsafe { libc::open(pathname.as_ptr(), open_flags(options), FILE_MODE) } {
            -1 => Err(OsError::last())?,
            fd => Ok(Fd(fd)),
        }
    }

    fn close(self) -> Result<(), OsError> {
        let fd = ManuallyDrop::new(self);
        // SAFETY: close invalidates the descriptor regardless of the outcome, and wrapping self in
        // ManuallyDrop stops Drop from closing it a second time.
        cvt(unsafe { libc::close(fd.0) })
    }

    fn size(&self) -> Result<u64, OsError> {
        let mut raw_meta: MaybeUninit<Stat> = MaybeUninit::uninit();
        // SAFETY: raw_meta is valid for writes of a stat struct.
        cvt(unsafe { libc::fstat(self.0, raw_meta.as_mut_ptr()) })?;
        // SAFETY: fstat either initializes raw_meta or returns an error, handled above.
        let raw = unsafe { raw_meta.assume_init() };

        u64::try_from(raw.st_size).map_err(|_| OsError(libc::EOVERFLOW))
    }

    fn seek(&self, offset: i64, mode: SeekMode) -> Result<u64, OsError> {
        let whence = match mode {
            SeekMode::Set => libc::SEEK_SET,
            SeekMode::Current => libc::SEEK_CUR,
            SeekMode::End => libc::SEEK_END,
        };
        let offset = off_t::try_from(offset).map_err(|_| OsError(libc::EINVAL))?;

        // SAFETY: lseek only touches the descriptor's offset.
        match unsafe { libc::lseek(self.0, offset, whence) } {
            -1 => Err(OsError::last()),
            position => Ok(position as u64),
        }
    }

    fn truncate(&self, size: u64) -> Result<(), OsError> {
        let size = to_off(size)?;
        // SAFETY: ftruncate doesn't touch memory and leaves the offset alone.
        cvt(unsafe { libc::ftruncate(self.0, size) })
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, OsError> {
        let len = buf.len().min(MAX_IO);
        // SAFETY: buf is valid for writes of len bytes.
        cvt_count(unsafe { libc::read(self.0, buf.as_mut_ptr().cast(), len) })
    }

    fn write(&self, buf: &[u8]) -> Result<usize, OsError> {
        let len = buf.len().min(MAX_IO);
        // SAFETY: buf is valid for reads of len bytes.
        cvt_count(unsafe { libc::write(self.0, buf.as_ptr().cast(), len) })
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, OsError> {
        let len = buf.len().min(MAX_IO);
        let offset = to_off(offset)?;
        // SAFETY: buf is valid for writes of len bytes. pread never moves the offset.
        cvt_count(unsafe { libc::pread(self.0, buf.as_mut_ptr().cast(), len, offset) })
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize, OsError> {
        let len = buf.len().min(MAX_IO);
        let offset = to_off(offset)?;
        // SAFETY: buf is valid for reads of len bytes. pwrite never moves the offset.
        cvt_count(unsafe { libc::pwrite(self.0, buf.as_ptr().cast(), len, offset) })
    }

    fn map(&self, len: usize, protection: MapProtection) -> Result<MappedView, OsError> {
        let prot = match protection {
            MapProtection::ReadOnly => libc::PROT_READ,
            MapProtection::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        };

        // SAFETY: A fresh shared mapping is requested at an address of the kernel's choosing, so
        // no existing memory is affected.
        let addr = unsafe { libc::mmap(ptr::null_mut(), len, prot, libc::MAP_SHARED, self.0, 0) };
        if addr == libc::MAP_FAILED {
            Err(OsError::last())?
        }

        Ok(MappedView {
            ptr: NonNull::new(addr.cast()).ok_or(OsError(libc::EINVAL))?,
            len,
        })
    }
}

impl Drop for Fd {
    fn drop(&mut self) {
        // SAFETY: Only reached when close wasn't called, so the descriptor is still open here and
        // nothing can use it afterwards. A failure is logged since there's no caller to report it to.
        if unsafe { libc::close(self.0) } == -1 {
            tracing::warn!(fd = self.0, error = %OsError::last(), "error while dropping file descriptor");
        }
    }
}

#[derive(Debug)]
pub(crate) struct MappedView {
    ptr: NonNull<u8>,
    len: usize,
}

impl MappedView {
    fn release(&self) -> Result<(), OsError> {
        // SAFETY: ptr and len describe a mapping created by mmap that hasn't been unmapped yet;
        // callers make sure this runs at most once.
        cvt(unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.len) })
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

pub(crate) struct DirStream(NonNull<libc::DIR>);

impl DirStream {
    fn read_name(&mut self) -> Result<Option<CString>, OsError> {
        // readdir signals both the end of the stream and failure with null, only errno tells them
        // apart.
        errno::set_errno(Errno(0));
        // SAFETY: The stream is open for as long as self exists.
        let entry = unsafe { libc::readdir(self.0.as_ptr()) };
        if entry.is_null() {
            return match OsError::last() {
                OsError(0) => Ok(None),
                error => Err(error),
            };
        }

        // SAFETY: readdir returned a valid entry with a nul-terminated name, which stays valid
        // until the next call on this stream. It's copied out before then.
        let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) };
        Ok(Some(name.to_owned()))
    }
}

impl NativeDir for DirStream {
    fn start(path: &str) -> Result<(DirStream, Option<CString>), DirError> {
        let pathname = path::translate(path)?;

        // SAFETY: pathname is nul-terminated and outlives the call.
        let Some(dir) = NonNull::new(unsafe { libc::opendir(pathname.as_ptr()) }) else {
            return Err(OsError::last().into());
        };

        let mut stream = DirStream(dir);
        let first = stream.read_name()?;
        Ok((stream, first))
    }

    fn advance(&mut self) -> Result<Option<CString>, DirError> {
        Ok(self.read_name()?)
    }

    fn restart(&mut self) -> Result<Option<CString>, DirError> {
        // SAFETY: The stream is open for as long as self exists.
        unsafe { libc::rewinddir(self.0.as_ptr()) };
        Ok(self.read_name()?)
    }

    fn close(self) -> Result<(), OsError> {
        let stream = ManuallyDrop::new(self);
        // SAFETY: closedir releases the stream regardless of the outcome, and ManuallyDrop stops
        // Drop from closing it a second time.
        cvt(unsafe { libc::closedir(stream.0.as_ptr()) })
    }
}

impl Drop for DirStream {
    fn drop(&mut self) {
        // SAFETY: The stream is open and is never used again after this.
        if unsafe { libc::closedir(self.0.as_ptr()) } == -1 {
            tracing::warn!(error = %OsError::last(), "error while dropping directory stream");
        }
    }
}

impl Debug for DirStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DirStream({:p})", self.0)
    }
}

#[derive(Debug)]
pub(crate) enum Unix {}

impl NativeFs for Unix {
    fn delete_file(path: &str) -> Result<(), PathOpError> {
        let pathname = path::translate(path)?;
        // SAFETY: pathname is nul-terminated and outlives the call.
        Ok(cvt(unsafe { libc::unlink(pathname.as_ptr()) })?)
    }

    fn truncate_path(path: &str, size: u64) -> Result<(), PathOpError> {
        let pathname = path::translate(path)?;
        let size = to_off(size)?;
        // SAFETY: pathname is nul-terminated and outlives the call.
        Ok(cvt(unsafe { libc::truncate(pathname.as_ptr(), size) })?)
    }

    fn create_dir(path: &str) -> Result<(), PathOpError> {
        let pathname = path::translate(path)?;
        // SAFETY: pathname is nul-terminated and outlives the call.
        Ok(cvt(unsafe { libc::mkdir(pathname.as_ptr(), DIR_MODE) })?)
    }

    fn remove_empty_dir(path: &str) -> Result<(), PathOpError> {
        let pathname = path::translate(path)?;
        // SAFETY: pathname is nul-terminated and outlives the call.
        Ok(cvt(unsafe { libc::rmdir(pathname.as_ptr()) })?)
    }
}
