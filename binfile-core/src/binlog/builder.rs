use super::{
    EventHeader, FormatDescriptionData, IntvarData, LogEventType, LogEventTypeCode, QueryData,
    RandData, RotateData, XidData, BINLOG_MAGIC, CHECKSUM_LEN, EVENT_HEADER_FIX_LEN,
};
use crate::error::{Error, Result};
use crate::util::checksum_crc32;
use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::WriteToBytes;

/// builds binlog file content event by event
///
/// positions, event lengths, extra header padding and checksums
/// follow the last format description event added
#[derive(Debug, Clone)]
pub struct BinlogBuilder {
    out: BytesMut,
    server_id: u32,
    timestamp: u32,
    header_len: u8,
    checksum: bool,
}

impl Default for BinlogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinlogBuilder {
    pub fn new() -> Self {
        let mut out = BytesMut::with_capacity(1024);
        out.put_slice(&BINLOG_MAGIC);
        BinlogBuilder {
            out,
            server_id: 1,
            timestamp: 0,
            header_len: EVENT_HEADER_FIX_LEN,
            checksum: false,
        }
    }

    pub fn server_id(&mut self, server_id: u32) -> &mut Self {
        self.server_id = server_id;
        self
    }

    pub fn timestamp(&mut self, timestamp: u32) -> &mut Self {
        self.timestamp = timestamp;
        self
    }

    /// current position, which is the start position of next event
    pub fn position(&self) -> usize {
        self.out.len()
    }

    pub fn format_description(&mut self, fde: FormatDescriptionData) -> Result<&mut Self> {
        let mut data = BytesMut::new();
        fde.write_to(&mut data)?;
        // FDE itself is written with header length in effect
        self.write_event(
            LogEventType::FormatDescriptionEvent as u8,
            &data,
            fde.checksum_enabled(),
        )?;
        self.header_len = fde.header_length;
        self.checksum = fde.checksum_enabled();
        Ok(self)
    }

    pub fn query(&mut self, query: QueryData) -> Result<&mut Self> {
        self.event(LogEventType::QueryEvent, &query)
    }

    pub fn intvar(&mut self, intvar: IntvarData) -> Result<&mut Self> {
        self.event(LogEventType::IntvarEvent, &intvar)
    }

    pub fn xid(&mut self, xid: XidData) -> Result<&mut Self> {
        self.event(LogEventType::XidEvent, &xid)
    }

    pub fn rand(&mut self, rand: RandData) -> Result<&mut Self> {
        self.event(LogEventType::RandEvent, &rand)
    }

    pub fn rotate(&mut self, rotate: RotateData) -> Result<&mut Self> {
        self.event(LogEventType::RotateEvent, &rotate)
    }

    /// event of any type code with opaque data
    pub fn raw(&mut self, type_code: u8, data: &[u8]) -> Result<&mut Self> {
        let checksum = self.checksum;
        self.write_event(type_code, data, checksum)?;
        Ok(self)
    }

    fn event<D: WriteToBytes>(&mut self, event_type: LogEventType, data: &D) -> Result<&mut Self> {
        let mut buf = BytesMut::new();
        data.write_to(&mut buf)?;
        let checksum = self.checksum;
        self.write_event(event_type as u8, &buf, checksum)?;
        Ok(self)
    }

    fn write_event(&mut self, type_code: u8, data: &[u8], checksum: bool) -> Result<()> {
        let checksum_len = if checksum { CHECKSUM_LEN as usize } else { 0 };
        let event_len = self.header_len as usize + data.len() + checksum_len;
        let next_pos = self.out.len() + event_len;
        if next_pos > u32::MAX as usize {
            return Err(Error::BinlogEventError(format!(
                "binlog position {} exceeds 4GB",
                next_pos
            )));
        }
        let header = EventHeader {
            timestamp: self.timestamp,
            type_code: LogEventTypeCode(type_code),
            server_id: self.server_id,
            event_len: event_len as u32,
            next_pos: next_pos as u32,
            flags: 0,
        };
        let start = self.out.len();
        header.write_to(&mut self.out)?;
        self.out.put_bytes(0, EventHeader::extra_len(self.header_len));
        self.out.put_slice(data);
        if checksum {
            let crc32 = checksum_crc32(&[&self.out[start..]]);
            self.out.put_u32_le(crc32);
        }
        Ok(())
    }

    pub fn build(&self) -> Bytes {
        Bytes::copy_from_slice(&self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binlog::DEFAULT_EVENT_TYPE_COUNT;

    #[test]
    fn test_builder_layout() -> Result<()> {
        let mut builder = BinlogBuilder::new();
        builder.server_id(123).timestamp(1593679068);
        assert_eq!(4, builder.position());
        builder.format_description(FormatDescriptionData::v4(
            "5.5.50-log",
            23,
            DEFAULT_EVENT_TYPE_COUNT,
        ))?;
        // 19 bytes header and 84 bytes data
        assert_eq!(4 + 19 + 84, builder.position());
        builder.xid(XidData { xid: 1 })?;
        // 23 bytes header and 8 bytes data
        assert_eq!(4 + 19 + 84 + 23 + 8, builder.position());
        let out = builder.build();
        assert_eq!(&BINLOG_MAGIC[..], &out[..4]);
        // type code of first event
        assert_eq!(15, out[8]);
        // extra header of second event is zero padded
        let xid_start = 4 + 19 + 84;
        assert_eq!(16, out[xid_start + 4]);
        assert_eq!(&[0u8; 4][..], &out[xid_start + 19..xid_start + 23]);
        Ok(())
    }

    #[test]
    fn test_builder_checksum() -> Result<()> {
        let mut builder = BinlogBuilder::new();
        builder.format_description(
            FormatDescriptionData::v4("5.6.40-log", 19, DEFAULT_EVENT_TYPE_COUNT).checksum_alg(1),
        )?;
        // 84 bytes data, 1 byte algorithm and 4 bytes checksum
        assert_eq!(4 + 19 + 84 + 1 + 4, builder.position());
        builder.rand(RandData { seed1: 1, seed2: 2 })?;
        let out = builder.build();
        let rand_start = 4 + 19 + 89;
        assert_eq!(out.len(), rand_start + 19 + 16 + 4);
        let crc32 = checksum_crc32(&[&out[rand_start..out.len() - 4]]);
        assert_eq!(&crc32.to_le_bytes()[..], &out[out.len() - 4..]);
        Ok(())
    }
}
