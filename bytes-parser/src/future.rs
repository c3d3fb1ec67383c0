//! async read
use crate::error::{Error, Needed, Result};
use bytes::{Buf, Bytes, BytesMut};
use futures::io::AsyncRead;
use futures::ready;
use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

/// upper bound of buffer growth per poll_read
const READ_CHUNK: usize = 8 * 1024;

pub trait AsyncReadBytesExt: AsyncRead {
    /// read exactly n bytes
    ///
    /// the buffer grows as data arrives, so a huge n on a short input
    /// only allocates what is actually read.
    /// on short read, fails with InputIncomplete carrying the bytes
    /// already read, so the caller can tell a clean EOF from truncation
    fn read_len(&mut self, n: usize) -> ReadLenFuture<Self>
    where
        Self: Unpin,
    {
        ReadLenFuture {
            reader: self,
            buf: BytesMut::with_capacity(n.min(READ_CHUNK)),
            required: n,
        }
    }

    fn read_le_u32(&mut self) -> ReadLeU32Future<Self>
    where
        Self: Unpin,
    {
        ReadLeU32Future(self.read_len(4))
    }
}

impl<R: AsyncRead + ?Sized> AsyncReadBytesExt for R {}

#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ReadLenFuture<'a, R: Unpin + ?Sized> {
    reader: &'a mut R,
    buf: BytesMut,
    required: usize,
}

// truncates the zero-filled tail that was not read into
struct Guard<'a> {
    out: &'a mut BytesMut,
    len: usize,
}

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        self.out.truncate(self.len);
    }
}

impl<R: AsyncRead + Unpin + ?Sized> Future for ReadLenFuture<'_, R> {
    type Output = Result<Bytes>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Self {
            reader,
            buf,
            required,
        } = &mut *self;
        let mut reader = Pin::new(&mut **reader);
        while buf.len() < *required {
            let filled = buf.len();
            let step = (*required - filled).min(READ_CHUNK);
            let rst = {
                let mut g = Guard {
                    out: &mut *buf,
                    len: filled,
                };
                g.out.resize(filled + step, 0);
                let rst = ready!(reader.as_mut().poll_read(cx, &mut g.out[filled..]));
                if let Ok(n) = rst {
                    g.len += n;
                }
                rst
            };
            match rst {
                Ok(0) => {
                    let needed = Needed::Size(*required - filled);
                    let partial = buf.split().freeze();
                    return Poll::Ready(Err(Error::InputIncomplete(partial, needed)));
                }
                Ok(_) => (),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) => return Poll::Ready(Err(Error::from(e))),
            }
        }
        Poll::Ready(Ok(buf.split().freeze()))
    }
}

#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ReadLeU32Future<'a, R: Unpin + ?Sized>(ReadLenFuture<'a, R>);

impl<R: AsyncRead + Unpin + ?Sized> Future for ReadLeU32Future<'_, R> {
    type Output = Result<u32>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut bs = ready!(Pin::new(&mut self.0).poll(cx))?;
        Poll::Ready(Ok(bs.get_u32_le()))
    }
}
