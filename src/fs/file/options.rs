use std::ops::BitOr;

use crate::fs::error::InvalidCodeError;

use super::{File, OpenError};
use crate::fs::sys::{NativeFile, RawFile};

/// Declares a field-less enum with stable integer codes, decodable from the raw `u32` that arrives
/// over the C boundary.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $kind:literal {
            $($(#[$variant_meta:meta])* $variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($(#[$variant_meta])* $variant = $code),+
        }

        impl TryFrom<u32> for $name {
            type Error = InvalidCodeError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $($code => Ok($name::$variant),)+
                    _ => Err(InvalidCodeError { kind: $kind, value }),
                }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> u32 {
                value as u32
            }
        }
    };
}

coded_enum! {
    /// The access rights a file is opened with.
    pub enum OpenMode as "open mode" {
        ReadOnly = 0,
        WriteOnly = 1,
        ReadWrite = 2,
    }
}

coded_enum! {
    /// Whether opening creates, replaces or requires the target path.
    pub enum CreationDisposition as "creation disposition" {
        /// Create the file, failing if it already exists.
        CreateNew = 1,
        /// Create the file, or truncate it if it exists.
        CreateAlways = 2,
        /// Open the file, failing if it doesn't exist.
        OpenExisting = 3,
        /// Open the file, creating it if it doesn't exist.
        OpenAlways = 4,
        /// Open and truncate the file, failing if it doesn't exist.
        TruncateExisting = 5,
    }
}

coded_enum! {
    pub enum SeekMode as "seek mode" {
        /// Relative to the start of the file.
        Set = 0,
        /// Relative to the current cursor.
        Current = 1,
        /// Relative to the end of the file.
        End = 2,
    }
}

coded_enum! {
    pub enum MapProtection as "mapping protection" {
        ReadOnly = 0,
        ReadWrite = 1,
    }
}

impl MapProtection {
    /// Whether a live mapping with this protection can serve a request for `requested`.
    pub const fn covers(self, requested: MapProtection) -> bool {
        matches!(
            (self, requested),
            (MapProtection::ReadWrite, _) | (MapProtection::ReadOnly, MapProtection::ReadOnly)
        )
    }
}

/// A bitmask of extra open behaviour. Only append mode exists so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpenFlags(u32);

impl OpenFlags {
    pub const NONE: OpenFlags = OpenFlags(0);
    /// Every write lands at the current end of the file.
    pub const APPEND: OpenFlags = OpenFlags(1 << 0);

    const KNOWN: u32 = OpenFlags::APPEND.0;

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn append(self) -> bool {
        self.contains(OpenFlags::APPEND)
    }
}

impl TryFrom<u32> for OpenFlags {
    type Error = InvalidCodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value & !OpenFlags::KNOWN != 0 {
            Err(InvalidCodeError { kind: "open flags", value })?
        }
        Ok(OpenFlags(value))
    }
}

impl BitOr for OpenFlags {
    type Output = OpenFlags;

    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

macro_rules! set_flag {
    ($self:ident, $value:expr, $flag:expr) => {
        if $value {
            $self.flags.0 |= $flag.0;
        } else {
            $self.flags.0 &= !$flag.0;
        }
    };
}

/// A builder for opening files. Available via [`File::options`] to avoid additional use
/// statements.
///
/// The defaults are read-only access on a file that must already exist, with no flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub(crate) mode: OpenMode,
    pub(crate) disposition: CreationDisposition,
    pub(crate) flags: OpenFlags,
}

impl OpenOptions {
    pub const fn new() -> OpenOptions {
        OpenOptions {
            mode: OpenMode::ReadOnly,
            disposition: CreationDisposition::OpenExisting,
            flags: OpenFlags::NONE,
        }
    }

    pub const fn from_parts(
        mode: OpenMode,
        disposition: CreationDisposition,
        flags: OpenFlags,
    ) -> OpenOptions {
        OpenOptions {
            mode,
            disposition,
            flags,
        }
    }

    pub fn open(&self, file_path: &str) -> Result<File, OpenError> {
        Ok(File::from_raw(RawFile::open(file_path, self)?))
    }

    pub const fn access_mode(&self) -> OpenMode {
        self.mode
    }

    pub const fn creation_disposition(&self) -> CreationDisposition {
        self.disposition
    }

    pub const fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub const fn mode(&mut self, value: OpenMode) -> &mut Self {
        self.mode = value;
        self
    }

    pub const fn read_only(&mut self) -> &mut Self {
        self.mode(OpenMode::ReadOnly)
    }

    pub const fn write_only(&mut self) -> &mut Self {
        self.mode(OpenMode::WriteOnly)
    }

    pub const fn read_write(&mut self) -> &mut Self {
        self.mode(OpenMode::ReadWrite)
    }

    pub const fn disposition(&mut self, value: CreationDisposition) -> &mut Self {
        self.disposition = value;
        self
    }

    pub const fn create_new(&mut self) -> &mut Self {
        self.disposition(CreationDisposition::CreateNew)
    }

    pub const fn create_always(&mut self) -> &mut Self {
        self.disposition(CreationDisposition::CreateAlways)
    }

    pub const fn open_existing(&mut self) -> &mut Self {
        self.disposition(CreationDisposition::OpenExisting)
    }

    pub const fn open_always(&mut self) -> &mut Self {
        self.disposition(CreationDisposition::OpenAlways)
    }

    pub const fn truncate_existing(&mut self) -> &mut Self {
        self.disposition(CreationDisposition::TruncateExisting)
    }

    pub const fn append(&mut self, value: bool) -> &mut Self {
        set_flag!(self, value, OpenFlags::APPEND);
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions::new()
    }
}
