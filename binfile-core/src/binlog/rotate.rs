use super::DataContext;
use crate::util::trim_nul;
use bytes::{BufMut, Bytes, BytesMut};
use bytes_parser::error::{Error, Result};
use bytes_parser::{ReadBytesExt, ReadFromBytesWithContext, WriteToBytes};

/// Data of RotateEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/rotate-event.html
#[derive(Debug, Clone, PartialEq)]
pub struct RotateData {
    pub position: u64,
    // below is variable part, raw and possibly NUL-padded
    pub next_binlog_filename: Bytes,
}

impl RotateData {
    pub fn new<S: AsRef<str>>(position: u64, next_binlog: S) -> Self {
        RotateData {
            position,
            next_binlog_filename: Bytes::copy_from_slice(next_binlog.as_ref().as_bytes()),
        }
    }

    /// name of next binlog file, cut at first NUL
    pub fn next_binlog(&self) -> crate::error::Result<String> {
        let name = String::from_utf8(trim_nul(&self.next_binlog_filename).to_vec())?;
        Ok(name)
    }
}

impl ReadFromBytesWithContext<'_> for RotateData {
    type Context = DataContext;

    fn read_with_ctx(input: &mut Bytes, ctx: DataContext) -> Result<Self> {
        let data_len = ctx.data_len()?;
        let name_len = data_len.checked_sub(8).ok_or_else(|| {
            Error::ConstraintError(format!("rotate data length {} less than 8", data_len))
        })?;
        let position = input.read_le_u64()?;
        let next_binlog_filename = input.read_len(name_len)?;
        Ok(RotateData {
            position,
            next_binlog_filename,
        })
    }
}

impl WriteToBytes for RotateData {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize> {
        out.put_u64_le(self.position);
        out.put_slice(&self.next_binlog_filename);
        Ok(8 + self.next_binlog_filename.len())
    }
}
