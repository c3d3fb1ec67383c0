//! sources of binlog bytes, looked up by file name
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::io::{AsyncRead, BufReader, Cursor};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// opens a binlog file by name, the source is closed when dropped
pub trait SourceOpener: Send + Sync {
    type Source: AsyncRead + Unpin + Send;

    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Self::Source>>;
}

/// opens files in one directory,
/// rotate events name files relative to the current one
#[derive(Debug, Clone)]
pub struct FsOpener {
    dir: PathBuf,
}

impl FsOpener {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        FsOpener { dir: dir.into() }
    }
}

impl SourceOpener for FsOpener {
    type Source = BufReader<smol::fs::File>;

    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Self::Source>> {
        let path = self.dir.join(name);
        Box::pin(async move {
            let file = smol::fs::File::open(&path).await?;
            log::debug!("opened binlog file {}", path.display());
            Ok(BufReader::new(file))
        })
    }
}

/// binlog files kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemOpener {
    files: HashMap<String, Bytes>,
}

impl MemOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file<S: Into<String>, B: Into<Bytes>>(mut self, name: S, content: B) -> Self {
        self.files.insert(name.into(), content.into());
        self
    }
}

impl SourceOpener for MemOpener {
    type Source = Cursor<Bytes>;

    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Self::Source>> {
        let rst = match self.files.get(name) {
            Some(content) => Ok(Cursor::new(content.clone())),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("binlog file {} not found", name),
            )),
        };
        Box::pin(futures::future::ready(rst))
    }
}
