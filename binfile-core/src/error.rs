use crate::binlog::LogEventType;
use bytes::Bytes;
use bytes_parser::error::Needed;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not a binlog file: invalid magic number {0:?}")]
    InvalidMagic(Bytes),
    #[error("invalid event length {event_len} with header length {header_len}")]
    InvalidEventLength { event_len: u32, header_len: u8 },
    #[error("invalid binlog format: {0}")]
    InvalidBinlogFormat(String),
    #[error("truncated input: {0:?} more bytes needed")]
    Truncated(Needed),
    #[error("unsupported event type: {0}")]
    UnsupportedEvent(LogEventType),
    #[error("binlog event error: {0}")]
    BinlogEventError(String),
    #[error("binlog checksum mismatch: expected={0}, actual={1}")]
    BinlogChecksumMismatch(u32, u32),
    #[error("utf8 string error: {0}")]
    Utf8StringError(#[from] std::string::FromUtf8Error),
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
}

impl From<bytes_parser::error::Error> for Error {
    fn from(err: bytes_parser::error::Error) -> Self {
        use bytes_parser::error::Error as PError;
        match err {
            PError::InputIncomplete(_, needed) => Error::Truncated(needed),
            PError::IO(e) => Error::IO(e),
            PError::ConstraintError(s) => Error::InvalidBinlogFormat(s),
            PError::Utf8Error(e) => Error::Utf8StringError(e),
        }
    }
}
