use derive_more::{Display, Error, From, IsVariant};

use crate::fs::error::{EmptyPathError, InteriorNulError, InvalidUtf8Error};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum PathError {
    Empty(EmptyPathError),
    InvalidUtf8(InvalidUtf8Error),
    InteriorNul(InteriorNulError),
}
