//! binlog events of binlog version 4 (MySQL 5.0.0+)
//!
//! reference: https://dev.mysql.com/doc/internals/en/binlog-event.html
mod builder;
mod fde;
mod header;
mod intvar;
mod parser;
mod query;
mod rand;
mod rotate;
mod unknown;
mod xid;

pub use builder::BinlogBuilder;
pub use fde::{FormatDescriptionData, CHECKSUM_ALG_CRC32};
pub use header::{EventHeader, EventHeaderFlags};
pub use intvar::{IntvarData, IntvarKind};
pub use parser::{EventParser, ParserOpts};
pub use query::QueryData;
pub use rand::RandData;
pub use rotate::RotateData;
pub use unknown::UnknownData;
pub use xid::XidData;

use crate::error::{Error, Result};
use bytes::Bytes;
use bytes_parser::ReadBytesExt;
use std::fmt;

/// magic number at the beginning of every binlog file
pub const BINLOG_MAGIC: [u8; 4] = [0xfe, 0x62, 0x69, 0x6e];

/// size of the fixed part of event header
pub const EVENT_HEADER_FIX_LEN: u8 = 19;

/// number of event types known by MySQL 5.5,
/// which is the size of post header length table in FDE.
/// MySQL 5.6 has 35
pub const DEFAULT_EVENT_TYPE_COUNT: u8 = 27;

/// length of crc32 checksum at end of each event
pub const CHECKSUM_LEN: u8 = 4;

/// consume 4 bytes and verify they are the binlog magic number
pub fn check_magic(input: &mut Bytes) -> Result<()> {
    let magic = input.read_len(BINLOG_MAGIC.len())?;
    if magic[..] != BINLOG_MAGIC[..] {
        return Err(Error::InvalidMagic(magic));
    }
    Ok(())
}

macro_rules! log_event_types {
    ($($code:literal => $variant:ident, $name:literal;)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum LogEventType {
            $($variant,)+
            // any code beyond the known range
            Invalid,
        }

        impl From<u8> for LogEventType {
            fn from(code: u8) -> LogEventType {
                match code {
                    $($code => LogEventType::$variant,)+
                    _ => LogEventType::Invalid,
                }
            }
        }

        impl LogEventType {
            pub fn code(self) -> Option<u8> {
                match self {
                    $(LogEventType::$variant => Some($code),)+
                    LogEventType::Invalid => None,
                }
            }

            /// canonical name as used by MySQL server
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $(LogEventType::$variant => Some($name),)+
                    LogEventType::Invalid => None,
                }
            }
        }
    };
}

log_event_types! {
    0 => Unknown, "UNKNOWN_EVENT";
    1 => StartEventV3, "START_EVENT_V3";
    2 => QueryEvent, "QUERY_EVENT";
    3 => StopEvent, "STOP_EVENT";
    4 => RotateEvent, "ROTATE_EVENT";
    5 => IntvarEvent, "INTVAR_EVENT";
    6 => LoadEvent, "LOAD_EVENT";
    7 => SlaveEvent, "SLAVE_EVENT";
    8 => CreateFileEvent, "CREATE_FILE_EVENT";
    9 => AppendBlockEvent, "APPEND_BLOCK_EVENT";
    10 => ExecLoadEvent, "EXEC_LOAD_EVENT";
    11 => DeleteFileEvent, "DELETE_FILE_EVENT";
    12 => NewLoadEvent, "NEW_LOAD_EVENT";
    13 => RandEvent, "RAND_EVENT";
    14 => UserVarEvent, "USER_VAR_EVENT";
    15 => FormatDescriptionEvent, "FORMAT_DESCRIPTION_EVENT";
    16 => XidEvent, "XID_EVENT";
    17 => BeginLoadQueryEvent, "BEGIN_LOAD_QUERY_EVENT";
    18 => ExecuteLoadQueryEvent, "EXECUTE_LOAD_QUERY_EVENT";
    19 => TableMapEvent, "TABLE_MAP_EVENT";
    // used in 5.1.0 ~ 5.1.15
    20 => PreGaWriteRowsEvent, "PRE_GA_WRITE_ROWS_EVENT";
    21 => PreGaUpdateRowsEvent, "PRE_GA_UPDATE_ROWS_EVENT";
    22 => PreGaDeleteRowsEvent, "PRE_GA_DELETE_ROWS_EVENT";
    // used from 5.1.16
    23 => WriteRowsEvent, "WRITE_ROWS_EVENT";
    24 => UpdateRowsEvent, "UPDATE_ROWS_EVENT";
    25 => DeleteRowsEvent, "DELETE_ROWS_EVENT";
    26 => IncidentEvent, "INCIDENT_EVENT";
    27 => HeartbeatLogEvent, "HEARTBEAT_LOG_EVENT";
}

impl fmt::Display for LogEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("INVALID_EVENT"))
    }
}

/// name of event type code, None if code is not in 0..=27
pub fn type_code_name(code: u8) -> Option<&'static str> {
    LogEventType::from(code).name()
}

/// raw type code stored in event header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogEventTypeCode(pub u8);

impl From<LogEventTypeCode> for LogEventType {
    fn from(type_code: LogEventTypeCode) -> LogEventType {
        LogEventType::from(type_code.0)
    }
}

/// lengths that body decoders compute their variable parts from
///
/// event_len always includes the full header (fixed + extra)
/// and the checksum if present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataContext {
    pub event_len: u32,
    pub header_len: u8,
    pub checksum_len: u8,
    pub event_type_count: u8,
}

impl DataContext {
    /// length of the event data, between header and checksum
    pub fn data_len(&self) -> bytes_parser::Result<usize> {
        (self.event_len as usize)
            .checked_sub(self.header_len as usize + self.checksum_len as usize)
            .ok_or_else(|| {
                bytes_parser::Error::ConstraintError(format!(
                    "event length {} shorter than header length {} plus checksum length {}",
                    self.event_len, self.header_len, self.checksum_len
                ))
            })
    }
}

/// decoded event data, one variant per supported event type
/// and a raw variant for all others
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    FormatDescription(FormatDescriptionData),
    Query(QueryData),
    Intvar(IntvarData),
    Xid(XidData),
    Rotate(RotateData),
    Rand(RandData),
    Unknown(UnknownData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub header: EventHeader,
    // opaque bytes between fixed header and data
    pub extra_header: Bytes,
    pub data: EventData,
    pub crc32: Option<u32>,
}

impl Event {
    pub fn event_type(&self) -> LogEventType {
        LogEventType::from(self.header.type_code)
    }

    pub fn is_type(&self, event_type: LogEventType) -> bool {
        self.event_type() == event_type
    }

    pub fn timestamp(&self) -> u32 {
        self.header.timestamp
    }

    /// start and end position of this event in binlog file
    pub fn position(&self) -> (u32, u32) {
        (self.header.start_pos(), self.header.next_pos)
    }

    /// sql statement of query event, trimmed of non-printable characters
    ///
    /// only for display, the result is lossy
    pub fn sql_statement(&self) -> Result<String> {
        match &self.data {
            EventData::Query(q) => Ok(q.sql_display()),
            _ => Err(Error::BinlogEventError(format!(
                "not a query event: {}",
                self.event_type()
            ))),
        }
    }

    /// next binlog filename if this is a rotate event
    pub fn next_binlog(&self) -> Option<Result<String>> {
        match &self.data {
            EventData::Rotate(r) => Some(r.next_binlog()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_magic() -> Result<()> {
        let mut input = Bytes::from_static(b"\xfebin\x00");
        check_magic(&mut input)?;
        assert_eq!(1, input.len());
        Ok(())
    }

    #[test]
    fn test_check_magic_mismatch() {
        for bad in [&b"\xfebio"[..], b"\xffbin", b"bin\xfe", b"\x00\x00\x00\x00"].iter() {
            let mut input = Bytes::copy_from_slice(bad);
            match check_magic(&mut input) {
                Err(Error::InvalidMagic(m)) => assert_eq!(bad, &&m[..]),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_check_magic_short() {
        for short in [&b""[..], b"\xfe", b"\xfebi"].iter() {
            let mut input = Bytes::copy_from_slice(short);
            assert!(matches!(check_magic(&mut input), Err(Error::Truncated(_))));
        }
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Some("UNKNOWN_EVENT"), type_code_name(0));
        assert_eq!(Some("QUERY_EVENT"), type_code_name(2));
        assert_eq!(Some("FORMAT_DESCRIPTION_EVENT"), type_code_name(15));
        assert_eq!(Some("DELETE_ROWS_EVENT"), type_code_name(25));
        assert_eq!(Some("HEARTBEAT_LOG_EVENT"), type_code_name(27));
        assert_eq!(None, type_code_name(28));
        assert_eq!(None, type_code_name(255));
        for code in 0u8..=27 {
            let et = LogEventType::from(code);
            assert_eq!(Some(code), et.code());
            assert!(type_code_name(code).is_some());
        }
        assert_eq!("INVALID_EVENT", LogEventType::from(35).to_string());
    }

    #[test]
    fn test_data_len() {
        let ctx = DataContext {
            event_len: 40,
            header_len: 19,
            checksum_len: 4,
            event_type_count: DEFAULT_EVENT_TYPE_COUNT,
        };
        assert_eq!(17, ctx.data_len().unwrap());
        let ctx = DataContext {
            event_len: 18,
            checksum_len: 0,
            ..ctx
        };
        assert!(ctx.data_len().is_err());
    }
}
