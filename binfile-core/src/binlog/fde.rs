//! format description event
use super::{DataContext, LogEventType, EVENT_HEADER_FIX_LEN};
use crate::util::trim_nul;
use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::error::{Error, Result};
use bytes_parser::{ReadBytesExt, ReadFromBytesWithContext, WriteToBytes};
use chrono::{DateTime, NaiveDateTime};

const SERVER_VERSION_LEN: usize = 50;

// binlog_version(2) + server_version(50) + create_timestamp(4) + header_length(1)
const FIXED_LEN: usize = 2 + SERVER_VERSION_LEN + 4 + 1;

/// checksum algorithm CRC32, 0 means off and 255 undefined
pub const CHECKSUM_ALG_CRC32: u8 = 1;

/// post header lengths of the 27 event types known by mysql 5.5
const POST_HEADER_LENGTHS_5_5: [u8; 27] = [
    56, 13, 0, 8, 0, 18, 0, 4, 4, 4, 4, 18, 0, 0, 84, 0, 4, 26, 8, 0, 0, 0, 8, 8, 8, 2, 0,
];

/// Data of FormatDescriptionEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/format-description-event.html
#[derive(Debug, Clone, PartialEq)]
pub struct FormatDescriptionData {
    pub binlog_version: u16,
    // NUL-padded to 50 bytes on wire
    pub server_version: String,
    pub create_timestamp: u32,
    // header length of all following events
    pub header_length: u8,
    // one entry per event type starting at code 1,
    // size is the configured event type count
    pub post_header_lengths: Bytes,
    // only present since mysql 5.6.1
    pub checksum_alg: Option<u8>,
}

impl FormatDescriptionData {
    /// FDE of binlog version 4 with post header lengths of mysql 5.5,
    /// padded or cut to event_type_count
    pub fn v4<S: Into<String>>(server_version: S, header_length: u8, event_type_count: u8) -> Self {
        let mut post_header_lengths = BytesMut::with_capacity(event_type_count as usize);
        for i in 0..event_type_count as usize {
            post_header_lengths.put_u8(POST_HEADER_LENGTHS_5_5.get(i).cloned().unwrap_or(0));
        }
        // FDE records its own post header length
        let fde_idx = LogEventType::FormatDescriptionEvent as usize - 1;
        if post_header_lengths.len() > fde_idx {
            post_header_lengths[fde_idx] = (FIXED_LEN + event_type_count as usize) as u8;
        }
        FormatDescriptionData {
            binlog_version: 4,
            server_version: server_version.into(),
            create_timestamp: 0,
            header_length,
            post_header_lengths: post_header_lengths.freeze(),
            checksum_alg: None,
        }
    }

    pub fn checksum_alg<A: Into<Option<u8>>>(mut self, checksum_alg: A) -> Self {
        self.checksum_alg = checksum_alg.into();
        self
    }

    pub fn checksum_enabled(&self) -> bool {
        self.checksum_alg == Some(CHECKSUM_ALG_CRC32)
    }

    /// post header length of given event type, if recorded
    pub fn post_header_length(&self, event_type: LogEventType) -> Option<u8> {
        match event_type.code() {
            Some(code) if code > 0 => self.post_header_lengths.get(code as usize - 1).cloned(),
            _ => None,
        }
    }

    pub fn create_datetime(&self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp(self.create_timestamp as i64, 0).map(|dt| dt.naive_utc())
    }
}

/// the data length from context covers the whole body,
/// including the trailing checksum if any, because whether
/// checksum exists is only known after this event is parsed
impl ReadFromBytesWithContext<'_> for FormatDescriptionData {
    type Context = DataContext;

    fn read_with_ctx(input: &mut Bytes, ctx: DataContext) -> Result<Self> {
        let data_len = ctx.data_len()?;
        let body = input.read_len(data_len)?;
        let mut data = body.clone();
        let binlog_version = data.read_le_u16()?;
        let server_version = data.read_len(SERVER_VERSION_LEN)?;
        let server_version = String::from_utf8(trim_nul(&server_version).to_vec())?;
        let create_timestamp = data.read_le_u32()?;
        let header_length = data.read_u8()?;
        if header_length < EVENT_HEADER_FIX_LEN {
            return Err(Error::ConstraintError(format!(
                "header length {} in format description event less than {}",
                header_length, EVENT_HEADER_FIX_LEN
            )));
        }
        let post_header_lengths = data.read_len(ctx.event_type_count as usize)?;
        // newer servers know more event types, their table entries
        // and the checksum part are located by FDE's own post header length
        let fde_idx = LogEventType::FormatDescriptionEvent as usize - 1;
        let checksum_alg = match post_header_lengths.get(fde_idx) {
            Some(&fde_post_header_len)
                if fde_post_header_len as usize >= FIXED_LEN + post_header_lengths.len()
                    && body.len() > fde_post_header_len as usize =>
            {
                Some(body[fde_post_header_len as usize])
            }
            _ => None,
        };
        Ok(FormatDescriptionData {
            binlog_version,
            server_version,
            create_timestamp,
            header_length,
            post_header_lengths,
            checksum_alg,
        })
    }
}

/// checksum value itself is not written here
impl WriteToBytes for FormatDescriptionData {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize> {
        if self.server_version.len() > SERVER_VERSION_LEN {
            return Err(Error::ConstraintError(format!(
                "server version longer than {} bytes: {}",
                SERVER_VERSION_LEN, self.server_version
            )));
        }
        let start = out.len();
        out.put_u16_le(self.binlog_version);
        out.put_slice(self.server_version.as_bytes());
        out.put_bytes(0, SERVER_VERSION_LEN - self.server_version.len());
        out.put_u32_le(self.create_timestamp);
        out.put_u8(self.header_length);
        out.put_slice(&self.post_header_lengths);
        if let Some(alg) = self.checksum_alg {
            out.put_u8(alg);
        }
        Ok(out.len() - start)
    }
}
