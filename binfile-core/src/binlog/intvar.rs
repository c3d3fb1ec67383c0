use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::error::Result;
use bytes_parser::{ReadBytesExt, ReadFromBytes, WriteToBytes};

/// Data of IntvarEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/intvar-event.html
#[derive(Debug, Clone, PartialEq)]
pub struct IntvarData {
    // kept raw, see kind()
    pub key: u8,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntvarKind {
    LastInsertId,
    InsertId,
    Other(u8),
}

impl IntvarData {
    pub fn kind(&self) -> IntvarKind {
        match self.key {
            0x01 => IntvarKind::LastInsertId,
            0x02 => IntvarKind::InsertId,
            other => IntvarKind::Other(other),
        }
    }
}

impl ReadFromBytes for IntvarData {
    fn read_from(input: &mut Bytes) -> Result<Self> {
        let key = input.read_u8()?;
        let value = input.read_le_u64()?;
        Ok(IntvarData { key, value })
    }
}

impl WriteToBytes for IntvarData {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize> {
        out.put_u8(self.key);
        out.put_u64_le(self.value);
        Ok(9)
    }
}
