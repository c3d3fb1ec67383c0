//! async reading of mysql binlog files
//!
//! [`BinlogReader`] pulls events one by one,
//! [`BinlogEvents`] decodes them in a background task
pub mod error;
pub mod opts;
pub mod reader;
pub mod source;
pub mod stream;

pub use crate::error::{Error, Result};
pub use crate::opts::ReaderOpts;
pub use crate::reader::BinlogReader;
pub use crate::source::{FsOpener, MemOpener, SourceOpener};
pub use crate::stream::{open_binlog, BinlogEvents};
