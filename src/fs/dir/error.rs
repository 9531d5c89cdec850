use derive_more::{Display, Error, From, IsVariant};

use crate::fs::error::OsError;
use crate::fs::path::PathError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum DirError {
    Path(PathError),
    Os(OsError),
}
