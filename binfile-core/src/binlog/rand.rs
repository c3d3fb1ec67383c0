use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::error::Result;
use bytes_parser::{ReadBytesExt, ReadFromBytes, WriteToBytes};

/// Data of RandEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/rand-event.html
#[derive(Debug, Clone, PartialEq)]
pub struct RandData {
    pub seed1: u64,
    pub seed2: u64,
}

impl ReadFromBytes for RandData {
    fn read_from(input: &mut Bytes) -> Result<Self> {
        let seed1 = input.read_le_u64()?;
        let seed2 = input.read_le_u64()?;
        Ok(RandData { seed1, seed2 })
    }
}

impl WriteToBytes for RandData {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize> {
        out.put_u64_le(self.seed1);
        out.put_u64_le(self.seed2);
        Ok(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rand() -> Result<()> {
        let mut out = BytesMut::new();
        out.put_u64_le(u64::MAX);
        out.put_u64_le(42);
        let mut input = out.freeze();
        let rd = RandData::read_from(&mut input)?;
        assert_eq!(u64::MAX, rd.seed1);
        assert_eq!(42, rd.seed2);
        let mut input = Bytes::from(vec![0u8; 15]);
        assert!(RandData::read_from(&mut input).is_err());
        Ok(())
    }
}
