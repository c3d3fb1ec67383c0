use super::{
    DataContext, Event, EventData, EventHeader, FormatDescriptionData, IntvarData, LogEventType,
    QueryData, RandData, RotateData, UnknownData, XidData, CHECKSUM_LEN, DEFAULT_EVENT_TYPE_COUNT,
    EVENT_HEADER_FIX_LEN,
};
use crate::error::{Error, Result};
use crate::util::checksum_crc32;
use bytes::{Buf, Bytes, BytesMut};
use bytes_parser::{ReadBytesExt, ReadFromBytes, ReadFromBytesWithContext, WriteToBytes};

#[derive(Debug, Clone, PartialEq)]
pub struct ParserOpts {
    // size of post header length table in FDE
    pub event_type_count: u8,
    // fail on UNKNOWN_EVENT and START_EVENT_V3 instead of skipping them
    pub strict_event_types: bool,
    pub validate_checksum: bool,
}

impl Default for ParserOpts {
    fn default() -> Self {
        ParserOpts {
            event_type_count: DEFAULT_EVENT_TYPE_COUNT,
            strict_event_types: false,
            validate_checksum: false,
        }
    }
}

/// decodes events of one binlog session
///
/// header length and checksum state are negotiated by
/// FormatDescriptionEvent and kept across files
#[derive(Debug, Clone)]
pub struct EventParser {
    header_len: u8,
    checksum: bool,
    opts: ParserOpts,
}

impl Default for EventParser {
    fn default() -> Self {
        EventParser::new(ParserOpts::default())
    }
}

impl EventParser {
    pub fn new(opts: ParserOpts) -> Self {
        EventParser {
            header_len: EVENT_HEADER_FIX_LEN,
            checksum: false,
            opts,
        }
    }

    pub fn header_len(&self) -> u8 {
        self.header_len
    }

    pub fn checksum_enabled(&self) -> bool {
        self.checksum
    }

    pub fn extra_header_len(&self) -> usize {
        EventHeader::extra_len(self.header_len)
    }

    pub fn read_header(&self, input: &mut Bytes) -> Result<EventHeader> {
        let header = EventHeader::read_from(input)?;
        Ok(header)
    }

    /// length of bytes following the fixed header,
    /// including extra header, data and checksum
    pub fn body_len(&self, header: &EventHeader) -> Result<usize> {
        let checksum_len = if self.checksum && !is_fde(header) {
            CHECKSUM_LEN
        } else {
            0
        };
        if header.event_len < self.header_len as u32 + checksum_len as u32 {
            return Err(Error::InvalidEventLength {
                event_len: header.event_len,
                header_len: self.header_len,
            });
        }
        Ok(header.event_len as usize - EVENT_HEADER_FIX_LEN as usize)
    }

    /// take over header length and checksum state of given FDE,
    /// returns the new header length
    pub fn apply_fde(&mut self, fde: &FormatDescriptionData) -> u8 {
        if fde.header_length != self.header_len {
            log::debug!(
                "event header length changed from {} to {}",
                self.header_len,
                fde.header_length
            );
        }
        self.header_len = fde.header_length;
        self.checksum = fde.checksum_enabled();
        log::debug!(
            "binlog version {}, server version {}, checksum algorithm {:?}",
            fde.binlog_version,
            fde.server_version,
            fde.checksum_alg
        );
        self.header_len
    }

    /// decode event data with given header, dispatched on type code
    pub fn parse_data(
        &self,
        header: &EventHeader,
        input: &mut Bytes,
        ctx: DataContext,
    ) -> Result<EventData> {
        let data = match header.event_type() {
            LogEventType::FormatDescriptionEvent => {
                EventData::FormatDescription(FormatDescriptionData::read_with_ctx(input, ctx)?)
            }
            LogEventType::QueryEvent => EventData::Query(QueryData::read_with_ctx(input, ctx)?),
            LogEventType::IntvarEvent => EventData::Intvar(IntvarData::read_from(input)?),
            LogEventType::XidEvent => EventData::Xid(XidData::read_from(input)?),
            LogEventType::RotateEvent => EventData::Rotate(RotateData::read_with_ctx(input, ctx)?),
            LogEventType::RandEvent => EventData::Rand(RandData::read_from(input)?),
            et @ LogEventType::Unknown | et @ LogEventType::StartEventV3
                if self.opts.strict_event_types =>
            {
                return Err(Error::UnsupportedEvent(et));
            }
            et => {
                log::trace!(
                    "skip {} bytes of event type {} (code {})",
                    input.len(),
                    et,
                    header.type_code.0
                );
                EventData::Unknown(UnknownData::read_with_ctx(input, ctx)?)
            }
        };
        Ok(data)
    }

    /// decode one event from its header and the bytes following the header,
    /// body must have the length returned by `body_len`
    pub fn parse_event(&mut self, header: EventHeader, mut body: Bytes) -> Result<Event> {
        let checksum_len = if self.checksum && !is_fde(&header) {
            CHECKSUM_LEN
        } else {
            0
        };
        let ctx = DataContext {
            event_len: header.event_len,
            header_len: self.header_len,
            checksum_len,
            event_type_count: self.opts.event_type_count,
        };
        let extra_header = body.read_len(self.extra_header_len())?;
        let raw_data = body.read_len(ctx.data_len()?)?;
        let mut input = raw_data.clone();
        let data = self.parse_data(&header, &mut input, ctx)?;
        let crc32 = match &data {
            // checksum of FDE is announced by itself and included in its data
            EventData::FormatDescription(fde) => {
                self.apply_fde(fde);
                if fde.checksum_enabled() && raw_data.len() >= CHECKSUM_LEN as usize {
                    let split = raw_data.len() - CHECKSUM_LEN as usize;
                    let crc32 = (&raw_data[split..]).get_u32_le();
                    self.validate(&header, &extra_header, &raw_data[..split], crc32)?;
                    Some(crc32)
                } else {
                    None
                }
            }
            _ => {
                if !input.is_empty() {
                    log::warn!(
                        "{} bytes left after decoding event {} at position {}",
                        input.len(),
                        header.event_type(),
                        header.start_pos()
                    );
                }
                if ctx.checksum_len > 0 {
                    let crc32 = body.read_le_u32()?;
                    self.validate(&header, &extra_header, &raw_data, crc32)?;
                    Some(crc32)
                } else {
                    None
                }
            }
        };
        log::trace!(
            "decoded event {} at position {}, length {}",
            header.event_type(),
            header.start_pos(),
            header.event_len
        );
        Ok(Event {
            header,
            extra_header,
            data,
            crc32,
        })
    }

    /// decode one event from in-memory input,
    /// returns None if input is exhausted at event boundary
    pub fn read_event(&mut self, input: &mut Bytes) -> Result<Option<Event>> {
        if input.is_empty() {
            return Ok(None);
        }
        let header = self.read_header(input)?;
        let body = input.read_len(self.body_len(&header)?)?;
        let event = self.parse_event(header, body)?;
        Ok(Some(event))
    }

    fn validate(
        &self,
        header: &EventHeader,
        extra_header: &[u8],
        data: &[u8],
        expected: u32,
    ) -> Result<()> {
        if !self.opts.validate_checksum {
            return Ok(());
        }
        let mut header_bytes = BytesMut::with_capacity(EVENT_HEADER_FIX_LEN as usize);
        header.write_to(&mut header_bytes)?;
        let actual = checksum_crc32(&[&header_bytes, extra_header, data]);
        if expected != actual {
            return Err(Error::BinlogChecksumMismatch(expected, actual));
        }
        Ok(())
    }
}

fn is_fde(header: &EventHeader) -> bool {
    header.event_type() == LogEventType::FormatDescriptionEvent
}
