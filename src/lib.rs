//! read mysql binlog files
//!
//! ```no_run
//! use binfile::{open_binlog, ReaderOpts};
//! use futures::StreamExt;
//!
//! # smol::block_on(async {
//! let opts = ReaderOpts::default().follow_rotation(true);
//! let mut events = open_binlog("/var/lib/mysql/mysql-bin.000001", opts).await?;
//! while let Some(event) = events.next().await {
//!     let event = event?;
//!     println!("{} at {:?}", event.event_type(), event.position());
//! }
//! # Ok::<(), binfile::Error>(())
//! # }).unwrap();
//! ```
pub use binfile_async::*;
pub use binfile_core::binlog;
