use super::{LogEventType, LogEventTypeCode, EVENT_HEADER_FIX_LEN};
use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::error::{Error, Needed, Result};
use bytes_parser::{ReadBytesExt, ReadFromBytes, WriteToBytes};
use chrono::{DateTime, NaiveDateTime};

bitflags! {
    pub struct EventHeaderFlags: u16 {
        const BINLOG_IN_USE         = 0x0001;
        const FORCED_ROTATE         = 0x0002;
        const THREAD_SPECIFIC       = 0x0004;
        const SUPPRESS_USE          = 0x0008;
        const UPDATE_TABLE_MAP_VERSION  = 0x0010;
        const ARTIFICIAL            = 0x0020;
        const RELAY_LOG             = 0x0040;
        const IGNORABLE             = 0x0080;
        const NO_FILTER             = 0x0100;
        const MTS_ISOLATE           = 0x0200;
    }
}

/// fixed 19-byte header in front of every event
///
/// timestamp 0:4, type_code 4:1, server_id 5:4,
/// event_length 9:4, next_position 13:4, flags 17:2
#[derive(Debug, Clone, PartialEq)]
pub struct EventHeader {
    pub timestamp: u32,
    pub type_code: LogEventTypeCode,
    pub server_id: u32,
    // total length including header
    pub event_len: u32,
    pub next_pos: u32,
    // kept raw, unknown bits must survive
    pub flags: u16,
}

impl EventHeader {
    pub fn event_type(&self) -> LogEventType {
        LogEventType::from(self.type_code)
    }

    pub fn flags(&self) -> EventHeaderFlags {
        EventHeaderFlags::from_bits_truncate(self.flags)
    }

    /// start position of this event, 0 if the header is inconsistent
    pub fn start_pos(&self) -> u32 {
        self.next_pos.saturating_sub(self.event_len)
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp(self.timestamp as i64, 0).map(|dt| dt.naive_utc())
    }

    /// number of extra header bytes following the fixed 19 bytes,
    /// given the header length negotiated by FDE
    pub fn extra_len(header_len: u8) -> usize {
        header_len.saturating_sub(EVENT_HEADER_FIX_LEN) as usize
    }
}

/// field values are not validated here
impl ReadFromBytes for EventHeader {
    fn read_from(input: &mut Bytes) -> Result<Self> {
        // check the whole header up front so a short read consumes nothing
        if input.len() < EVENT_HEADER_FIX_LEN as usize {
            return Err(Error::InputIncomplete(
                input.clone(),
                Needed::Size(EVENT_HEADER_FIX_LEN as usize - input.len()),
            ));
        }
        let timestamp = input.read_le_u32()?;
        let type_code = input.read_u8()?;
        let server_id = input.read_le_u32()?;
        let event_len = input.read_le_u32()?;
        let next_pos = input.read_le_u32()?;
        let flags = input.read_le_u16()?;
        Ok(EventHeader {
            timestamp,
            type_code: LogEventTypeCode(type_code),
            server_id,
            event_len,
            next_pos,
            flags,
        })
    }
}

impl WriteToBytes for EventHeader {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize> {
        out.reserve(EVENT_HEADER_FIX_LEN as usize);
        out.put_u32_le(self.timestamp);
        out.put_u8(self.type_code.0);
        out.put_u32_le(self.server_id);
        out.put_u32_le(self.event_len);
        out.put_u32_le(self.next_pos);
        out.put_u16_le(self.flags);
        Ok(EVENT_HEADER_FIX_LEN as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(header: &EventHeader) -> Result<EventHeader> {
        let mut out = BytesMut::new();
        assert_eq!(19, header.write_to(&mut out)?);
        let mut input = out.freeze();
        let decoded = EventHeader::read_from(&mut input)?;
        assert!(input.is_empty());
        Ok(decoded)
    }

    #[test]
    fn test_header_roundtrip() -> Result<()> {
        let samples = [
            EventHeader {
                timestamp: 0,
                type_code: LogEventTypeCode(0),
                server_id: 0,
                event_len: 0,
                next_pos: 0,
                flags: 0,
            },
            EventHeader {
                timestamp: 1593679068,
                type_code: LogEventTypeCode(15),
                server_id: 123,
                event_len: 119,
                next_pos: 123,
                flags: 0x0001,
            },
            EventHeader {
                timestamp: u32::MAX,
                type_code: LogEventTypeCode(u8::MAX),
                server_id: u32::MAX,
                event_len: u32::MAX,
                next_pos: u32::MAX,
                flags: u16::MAX,
            },
        ];
        for header in samples.iter() {
            assert_eq!(header, &roundtrip(header)?);
        }
        Ok(())
    }

    #[test]
    fn test_header_layout() -> Result<()> {
        // FDE header written by mysql 5.7.29
        let mut input = Bytes::from_static(&[
            220, 156, 253, 94, 15, 123, 0, 0, 0, 119, 0, 0, 0, 123, 0, 0, 0, 1, 0,
        ]);
        let header = EventHeader::read_from(&mut input)?;
        assert_eq!(1593679068, header.timestamp);
        assert_eq!(LogEventType::FormatDescriptionEvent, header.event_type());
        assert_eq!(123, header.server_id);
        assert_eq!(119, header.event_len);
        assert_eq!(123, header.next_pos);
        assert_eq!(4, header.start_pos());
        assert_eq!(EventHeaderFlags::BINLOG_IN_USE, header.flags());
        assert_eq!(
            "2020-07-02 08:37:48",
            header.datetime().unwrap().to_string()
        );
        Ok(())
    }

    #[test]
    fn test_header_short() {
        let mut input = Bytes::from_static(&[1u8; 18]);
        match EventHeader::read_from(&mut input) {
            Err(Error::InputIncomplete(_, _)) => (),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(18, input.len());
    }

    #[test]
    fn test_extra_len() {
        assert_eq!(0, EventHeader::extra_len(19));
        assert_eq!(0, EventHeader::extra_len(13));
        assert_eq!(4, EventHeader::extra_len(23));
    }
}
