use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::error::Result;
use bytes_parser::{ReadBytesExt, ReadFromBytes, WriteToBytes};

/// Data of XidEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/xid-event.html
#[derive(Debug, Clone, PartialEq)]
pub struct XidData {
    pub xid: u64,
}

impl ReadFromBytes for XidData {
    fn read_from(input: &mut Bytes) -> Result<Self> {
        let xid = input.read_le_u64()?;
        Ok(XidData { xid })
    }
}

impl WriteToBytes for XidData {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize> {
        out.put_u64_le(self.xid);
        Ok(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xid() -> Result<()> {
        let mut input = Bytes::from_static(&[0x39, 0x30, 0, 0, 0, 0, 0, 0, 0xff]);
        let xid = XidData::read_from(&mut input)?;
        assert_eq!(12345, xid.xid);
        assert_eq!(1, input.len());
        let mut input = Bytes::from_static(&[1, 2, 3]);
        assert!(XidData::read_from(&mut input).is_err());
        Ok(())
    }
}
