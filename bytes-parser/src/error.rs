use bytes::Bytes;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// the first field holds the bytes available before input ran out
    #[error("incomplete input: {1:?} more bytes needed after {0:?}")]
    InputIncomplete(Bytes, Needed),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("constraint error: {0}")]
    ConstraintError(String),
    #[error("utf8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// input ended exactly at the read boundary, nothing partial was read
    pub fn is_clean_eof(&self) -> bool {
        matches!(self, Error::InputIncomplete(partial, _) if partial.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Needed {
    /// number of bytes still missing
    Size(usize),
}
