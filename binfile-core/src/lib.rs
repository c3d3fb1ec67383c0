//! decoding of mysql binlog files
//!
//! all parsing here works on in-memory bytes,
//! reading from files is done by binfile-async
pub mod binlog;
pub mod error;
mod util;

pub use crate::binlog::{Event, EventData, EventParser, LogEventType, ParserOpts};
pub use crate::error::{Error, Result};
