use thiserror::Error as ThisError;

use crate::BlockId;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record: {0}")]
    Record(#[from] binrw::Error),

    #[error("no space left on the filesystem")]
    NoSpace,

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("'{0}' is not a directory")]
    NotADirectory(String),

    #[error("'{0}' is not a file")]
    NotAFile(String),

    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("directory '{0}' is not empty")]
    NotEmpty(String),

    #[error("malformed path: {0}")]
    MalformedPath(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("block {0} is out of range")]
    OutOfRange(BlockId),

    #[error("corrupted filesystem: {0}")]
    Corrupted(String),

    #[error("file of {0} bytes is too large")]
    FileTooLarge(usize),

    #[error("file has no block #{0}")]
    NoSuchBlock(usize),
}

pub type Result<T> = core::result::Result<T, Error>;
