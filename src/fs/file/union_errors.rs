use derive_more::{Display, Error, From, IsVariant};

use crate::fs::error::{OsError, OversizedFileError, ProtectionMismatchError, ZeroLengthError};
use crate::fs::path::PathError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum OpenError {
    Path(PathError),
    Os(OsError),
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum MapError {
    ZeroLength(ZeroLengthError),
    Oversized(OversizedFileError),
    ProtectionMismatch(ProtectionMismatchError),
    Os(OsError),
}
