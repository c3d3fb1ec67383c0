use crate::error::{Error, Result};
use crate::opts::ReaderOpts;
use crate::reader::BinlogReader;
use crate::source::{FsOpener, SourceOpener};
use binfile_core::binlog::Event;
use futures::Stream;
use pin_project_lite::pin_project;
use smol::channel::{self, Receiver, Sender};
use smol::Task;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// stream of binlog events decoded by a background task
    ///
    /// at most one event is decoded ahead of the consumer.
    /// dropping the stream cancels the task and closes the file
    pub struct BinlogEvents {
        #[pin]
        rx: Receiver<Result<Event>>,
        // cancelled on drop
        _task: Task<()>,
        stopped: bool,
    }
}

impl BinlogEvents {
    pub fn spawn<O>(reader: BinlogReader<O>) -> Self
    where
        O: SourceOpener + 'static,
        O::Source: 'static,
    {
        let (tx, rx) = channel::bounded(1);
        let task = smol::spawn(produce(reader, tx));
        BinlogEvents {
            rx,
            _task: task,
            stopped: false,
        }
    }

    /// stop decoding, the stream ends immediately
    /// and no more file is read
    pub fn stop(&mut self) {
        if !self.stopped {
            log::debug!("binlog events stopped by consumer");
            self.stopped = true;
            self.rx.close();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Stream for BinlogEvents {
    type Item = Result<Event>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.stopped {
            return Poll::Ready(None);
        }
        this.rx.poll_next(cx)
    }
}

async fn produce<O: SourceOpener>(mut reader: BinlogReader<O>, tx: Sender<Result<Event>>) {
    loop {
        if tx.is_closed() {
            log::debug!("channel closed, stop reading {}", reader.filename());
            return;
        }
        match reader.next_event().await {
            Ok(Some(event)) => {
                if tx.send(Ok(event)).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                log::debug!("binlog reader failed at file {}: {}", reader.filename(), e);
                let _ = tx.send(Err(e)).await;
                return;
            }
        }
    }
}

/// open binlog file at given path and decode its events in background,
/// next files named by rotate events are looked up in the same directory
pub async fn open_binlog<P: AsRef<Path>>(path: P, opts: ReaderOpts) -> Result<BinlogEvents> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            Error::OpenBinlog(
                path.display().to_string(),
                io::Error::new(io::ErrorKind::InvalidInput, "invalid binlog file name"),
            )
        })?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let reader = BinlogReader::open(FsOpener::new(dir), name, opts).await?;
    Ok(BinlogEvents::spawn(reader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemOpener;
    use binfile_core::binlog::{
        BinlogBuilder, FormatDescriptionData, LogEventType, QueryData, RotateData, XidData,
        DEFAULT_EVENT_TYPE_COUNT,
    };
    use bytes::Bytes;
    use futures::StreamExt;

    fn fde() -> FormatDescriptionData {
        FormatDescriptionData::v4("5.5.50-log", 19, DEFAULT_EVENT_TYPE_COUNT)
    }

    fn transactions(n: usize, rotate_to: Option<&str>) -> Bytes {
        let mut builder = BinlogBuilder::new();
        builder.format_description(fde()).unwrap();
        for i in 0..n {
            let sql = format!("INSERT INTO t VALUES ({})", i);
            builder
                .query(QueryData::new(1, "test", "BEGIN").unwrap())
                .unwrap()
                .query(QueryData::new(1, "test", &sql).unwrap())
                .unwrap()
                .xid(XidData { xid: i as u64 })
                .unwrap();
        }
        if let Some(next) = rotate_to {
            builder.rotate(RotateData::new(4, next)).unwrap();
        }
        builder.build()
    }

    async fn spawn_mem(opener: MemOpener, name: &str, opts: ReaderOpts) -> BinlogEvents {
        let reader = BinlogReader::open(opener, name, opts).await.unwrap();
        BinlogEvents::spawn(reader)
    }

    #[smol_potat::test]
    async fn test_stream_single_file() {
        let _ = env_logger::try_init();
        let opener = MemOpener::new().file("mysql-bin.000001", transactions(1, None));
        let events = spawn_mem(opener, "mysql-bin.000001", ReaderOpts::default()).await;
        let events: Vec<_> = events.collect().await;
        assert_eq!(4, events.len());
        let events: Vec<Event> = events.into_iter().map(|e| e.unwrap()).collect();
        assert!(events[0].is_type(LogEventType::FormatDescriptionEvent));
        assert_eq!("INSERT INTO t VALUES (0)", events[2].sql_statement().unwrap());
        assert!(events[3].is_type(LogEventType::XidEvent));
    }

    #[smol_potat::test]
    async fn test_stream_follow_rotation() {
        let opener = MemOpener::new()
            .file("mysql-bin.000001", transactions(2, Some("mysql-bin.000002")))
            .file("mysql-bin.000002", transactions(1, None));
        let opts = ReaderOpts::default().follow_rotation(true);
        let mut events = spawn_mem(opener, "mysql-bin.000001", opts).await;
        let mut types = Vec::new();
        while let Some(event) = events.next().await {
            types.push(event.unwrap().event_type());
        }
        assert_eq!(1 + 6 + 1 + 1 + 3, types.len());
        assert_eq!(LogEventType::RotateEvent, types[7]);
        assert_eq!(LogEventType::FormatDescriptionEvent, types[8]);
        // ended stream stays ended
        assert!(events.next().await.is_none());
    }

    #[smol_potat::test]
    async fn test_stream_stop() {
        let opener = MemOpener::new().file("mysql-bin.000001", transactions(100, None));
        let mut events = spawn_mem(opener, "mysql-bin.000001", ReaderOpts::default()).await;
        for _ in 0..5 {
            assert!(events.next().await.unwrap().is_ok());
        }
        events.stop();
        assert!(events.is_stopped());
        assert!(events.next().await.is_none());
        assert!(events.next().await.is_none());
    }

    #[smol_potat::test]
    async fn test_stream_error_ends() {
        let content = transactions(1, None);
        let opener = MemOpener::new().file("a", content.slice(..content.len() - 2));
        let events = spawn_mem(opener, "a", ReaderOpts::default()).await;
        let events: Vec<_> = events.collect().await;
        assert_eq!(4, events.len());
        assert!(events[..3].iter().all(|e| e.is_ok()));
        match &events[3] {
            Err(e) => assert!(e.is_truncated()),
            Ok(event) => panic!("unexpected event {:?}", event),
        }
    }

    #[smol_potat::test]
    async fn test_open_binlog_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("mysql-bin.000001"),
            transactions(3, Some("mysql-bin.000002")),
        )
        .unwrap();
        std::fs::write(dir.path().join("mysql-bin.000002"), transactions(2, None)).unwrap();

        let path = dir.path().join("mysql-bin.000001");
        let opts = ReaderOpts::default().follow_rotation(true);
        let events: Vec<_> = open_binlog(&path, opts).await.unwrap().collect().await;
        let sqls: Vec<String> = events
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.is_type(LogEventType::QueryEvent))
            .map(|e| e.sql_statement().unwrap())
            .filter(|sql| sql != "BEGIN")
            .collect();
        assert_eq!(
            vec![
                "INSERT INTO t VALUES (0)",
                "INSERT INTO t VALUES (1)",
                "INSERT INTO t VALUES (2)",
                "INSERT INTO t VALUES (0)",
                "INSERT INTO t VALUES (1)",
            ],
            sqls
        );

        let events: Vec<_> = open_binlog(&path, ReaderOpts::default())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(1 + 9 + 1, events.len());
    }

    #[smol_potat::test]
    async fn test_open_binlog_missing() {
        let dir = tempfile::tempdir().unwrap();
        match open_binlog(dir.path().join("mysql-bin.000001"), ReaderOpts::default()).await {
            Err(Error::OpenBinlog(name, e)) => {
                assert_eq!("mysql-bin.000001", name);
                assert_eq!(io::ErrorKind::NotFound, e.kind());
            }
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("missing file opened"),
        }
    }
}
