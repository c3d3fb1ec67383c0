use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("core error: {0}")]
    CoreError(#[from] binfile_core::error::Error),
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
    #[error("failed to open binlog file {0}: {1}")]
    OpenBinlog(String, #[source] std::io::Error),
}

impl From<bytes_parser::error::Error> for Error {
    fn from(err: bytes_parser::error::Error) -> Self {
        Error::CoreError(err.into())
    }
}

impl Error {
    /// whether input ended in the middle of an event
    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            Error::CoreError(binfile_core::error::Error::Truncated(_))
        )
    }
}
