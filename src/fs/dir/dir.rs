use std::ffi::{CStr, CString};

use super::DirError;
use crate::fs::error::{InvalidUtf8Error, OsError};
use crate::fs::path::PathError;
use crate::fs::sys::{NativeDir, RawDir};

#[derive(Debug)]
pub struct Directory {
    raw: RawDir,
    /// The decoded name of the entry under the cursor.
    current: Option<CString>,
    /// Set while `current` holds the first entry and hasn't been handed out yet.
    is_first: bool,
    exhausted: bool,
}

impl Directory {
    pub fn open(dir_path: &str) -> Result<Directory, DirError> {
        let (raw, first) = RawDir::start(dir_path)?;
        Ok(Directory {
            raw,
            current: first,
            is_first: true,
            exhausted: false,
        })
    }

    /// Returns the next entry's name, or `None` once there are no more. The name borrows from
    /// the handle and is replaced by the next call.
    pub fn next_entry(&mut self) -> Result<Option<&CStr>, DirError> {
        if self.is_first {
            self.is_first = false;
            self.exhausted = self.current.is_none();
            return Ok(self.current.as_deref());
        }
        if self.exhausted {
            return Ok(None);
        }

        self.current = None;
        match self.raw.advance()? {
            Some(name) => self.current = Some(name),
            None => self.exhausted = true,
        }
        Ok(self.current.as_deref())
    }

    /// Like [`next_entry`](Directory::next_entry), but fails on names that aren't UTF-8 (which
    /// unix allows).
    pub fn next_name(&mut self) -> Result<Option<&str>, DirError> {
        match self.next_entry()? {
            Some(name) => Ok(Some(name.to_str().map_err(|_| PathError::from(InvalidUtf8Error))?)),
            None => Ok(None),
        }
    }

    /// Iterates over the remaining entries as owned strings, replacing invalid UTF-8.
    pub fn names(&mut self) -> Names<'_> {
        Names {
            dir: self,
        }
    }

    /// Starts the enumeration over from the first entry. Does nothing if the first entry hasn't
    /// been handed out yet. If the OS refuses, the cursor stays where it was.
    pub fn rewind(&mut self) -> Result<(), DirError> {
        if self.is_first {
            return Ok(());
        }

        self.current = self.raw.restart()?;
        self.is_first = true;
        self.exhausted = false;
        Ok(())
    }

    pub fn close(self) -> Result<(), OsError> {
        self.raw.close()
    }
}

pub struct Names<'a> {
    dir: &'a mut Directory,
}

impl Iterator for Names<'_> {
    type Item = Result<String, DirError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.dir.next_entry() {
            Ok(Some(name)) => Some(Ok(name.to_string_lossy().into_owned())),
            Ok(None) => None,
            Err(error) => Some(Err(error)),
        }
    }
}
