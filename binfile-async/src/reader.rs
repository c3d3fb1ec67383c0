use crate::error::{Error, Result};
use crate::opts::ReaderOpts;
use crate::source::SourceOpener;
use binfile_core::binlog::{
    check_magic, Event, EventData, EventParser, BINLOG_MAGIC, EVENT_HEADER_FIX_LEN,
};
use bytes_parser::future::AsyncReadBytesExt;

#[derive(Debug)]
enum ReaderState {
    ReadingHeader,
    // name of next file to open
    Rotating(String),
    // reported on next pull, after the event that caused it
    Failed(Error),
    Terminated,
}

/// reads events from binlog files one by one
///
/// header length and checksum negotiated by format description
/// event stay in effect when following rotation to next file
pub struct BinlogReader<O: SourceOpener> {
    opener: O,
    source: Option<O::Source>,
    filename: String,
    parser: EventParser,
    follow_rotation: bool,
    state: ReaderState,
}

impl<O: SourceOpener> BinlogReader<O> {
    /// open binlog file of given name and validate its magic number
    pub async fn open(opener: O, name: &str, opts: ReaderOpts) -> Result<Self> {
        let source = open_source(&opener, name).await?;
        Ok(BinlogReader {
            opener,
            source: Some(source),
            filename: name.to_owned(),
            parser: EventParser::new(opts.parser_opts()),
            follow_rotation: opts.follow_rotation,
            state: ReaderState::ReadingHeader,
        })
    }

    /// name of file currently read
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// negotiated header length
    pub fn header_len(&self) -> u8 {
        self.parser.header_len()
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, ReaderState::Terminated)
    }

    /// next event, or None at end of binlog
    ///
    /// an error terminates the reader, after that and after
    /// the end of binlog, None is always returned
    pub async fn next_event(&mut self) -> Result<Option<Event>> {
        let rst = self.advance().await;
        if self.is_terminated() && self.source.is_some() {
            log::debug!("binlog reader terminated at file {}", self.filename);
            self.source = None;
        }
        rst
    }

    async fn advance(&mut self) -> Result<Option<Event>> {
        loop {
            // terminated unless switched back explicitly
            match std::mem::replace(&mut self.state, ReaderState::Terminated) {
                ReaderState::Terminated => return Ok(None),
                ReaderState::Failed(e) => return Err(e),
                ReaderState::Rotating(name) => {
                    // close current file before opening next
                    self.source = None;
                    let source = open_source(&self.opener, &name).await?;
                    log::debug!("rotated from {} to {}", self.filename, name);
                    self.source = Some(source);
                    self.filename = name;
                    self.state = ReaderState::ReadingHeader;
                }
                ReaderState::ReadingHeader => {
                    let event = match self.read_event().await? {
                        Some(event) => event,
                        None => return Ok(None),
                    };
                    self.state = match event.next_binlog() {
                        None => ReaderState::ReadingHeader,
                        Some(Ok(name)) if self.follow_rotation => ReaderState::Rotating(name),
                        Some(Err(e)) if self.follow_rotation => {
                            if let EventData::Rotate(rotate) = &event.data {
                                log::debug!(
                                    "invalid next binlog name {:?} in rotate event of {}",
                                    rotate.next_binlog_filename,
                                    self.filename
                                );
                            }
                            ReaderState::Failed(e.into())
                        }
                        Some(name) => {
                            log::debug!(
                                "stop at rotate event of {}, next file {:?}",
                                self.filename,
                                name
                            );
                            ReaderState::Terminated
                        }
                    };
                    return Ok(Some(event));
                }
            }
        }
    }

    async fn read_event(&mut self) -> Result<Option<Event>> {
        let source = match self.source.as_mut() {
            Some(source) => source,
            None => return Ok(None),
        };
        let mut header_bytes = match source.read_len(EVENT_HEADER_FIX_LEN as usize).await {
            Ok(bs) => bs,
            Err(e) if e.is_clean_eof() => {
                log::debug!("end of binlog file {}", self.filename);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let header = self.parser.read_header(&mut header_bytes)?;
        let body_len = self.parser.body_len(&header)?;
        let body = source.read_len(body_len).await?;
        let event = self.parser.parse_event(header, body)?;
        Ok(Some(event))
    }
}

async fn open_source<O: SourceOpener>(opener: &O, name: &str) -> Result<O::Source> {
    let mut source = opener
        .open(name)
        .await
        .map_err(|e| Error::OpenBinlog(name.to_owned(), e))?;
    let mut magic = source.read_len(BINLOG_MAGIC.len()).await?;
    check_magic(&mut magic)?;
    log::debug!("validated magic number of binlog file {}", name);
    Ok(source)
}
