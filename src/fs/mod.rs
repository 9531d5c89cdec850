pub mod dir;
pub mod file;
pub mod ops;
pub mod path;

mod error;
mod sys;

pub use error::*;
pub use dir::Directory;
pub use file::{File, OpenOptions};
