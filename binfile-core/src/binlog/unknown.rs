use super::DataContext;
use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::error::Result;
use bytes_parser::{ReadBytesExt, ReadFromBytesWithContext, WriteToBytes};

/// raw data of any event type without a dedicated decoder
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownData {
    pub payload: Bytes,
}

impl ReadFromBytesWithContext<'_> for UnknownData {
    type Context = DataContext;

    fn read_with_ctx(input: &mut Bytes, ctx: DataContext) -> Result<Self> {
        let payload = input.read_len(ctx.data_len()?)?;
        Ok(UnknownData { payload })
    }
}

impl WriteToBytes for UnknownData {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize> {
        out.put_slice(&self.payload);
        Ok(self.payload.len())
    }
}
