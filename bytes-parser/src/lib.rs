//! essential parsing of bytes
//!
//! sync reading is done on `bytes::Bytes` which works as a cursor:
//! every successful read advances it.
//! async reading is done on any `futures::AsyncRead`, see [`future`].
pub mod error;
pub mod future;

pub use error::*;

use bytes::{Buf, Bytes, BytesMut};

/// read numbers and byte slices from the front of the input
pub trait ReadBytesExt {
    fn read_u8(&mut self) -> Result<u8>;

    fn read_le_u16(&mut self) -> Result<u16>;

    fn read_le_u32(&mut self) -> Result<u32>;

    fn read_le_u64(&mut self) -> Result<u64>;

    /// split exactly `len` bytes off the input
    fn read_len(&mut self, len: usize) -> Result<Bytes>;
}

impl ReadBytesExt for Bytes {
    fn read_u8(&mut self) -> Result<u8> {
        ensure_remaining(self, 1)?;
        Ok(self.get_u8())
    }

    fn read_le_u16(&mut self) -> Result<u16> {
        ensure_remaining(self, 2)?;
        Ok(self.get_u16_le())
    }

    fn read_le_u32(&mut self) -> Result<u32> {
        ensure_remaining(self, 4)?;
        Ok(self.get_u32_le())
    }

    fn read_le_u64(&mut self) -> Result<u64> {
        ensure_remaining(self, 8)?;
        Ok(self.get_u64_le())
    }

    fn read_len(&mut self, len: usize) -> Result<Bytes> {
        ensure_remaining(self, len)?;
        Ok(self.split_to(len))
    }
}

#[inline]
fn ensure_remaining(input: &Bytes, len: usize) -> Result<()> {
    if input.remaining() < len {
        return Err(Error::InputIncomplete(
            input.clone(),
            Needed::Size(len - input.remaining()),
        ));
    }
    Ok(())
}

/// generic method to read object from input
pub trait ReadFromBytes: Sized {
    fn read_from(input: &mut Bytes) -> Result<Self>;
}

/// generic method to read object from input with given context
pub trait ReadFromBytesWithContext<'c>: Sized {
    type Context: 'c;

    fn read_with_ctx(input: &mut Bytes, ctx: Self::Context) -> Result<Self>;
}

/// write object to the tail of output, returns number of bytes written
pub trait WriteToBytes {
    fn write_to(&self, out: &mut BytesMut) -> Result<usize>;
}
