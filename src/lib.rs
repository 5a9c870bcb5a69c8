//! packbuf
//!
//! Buffered byte I/O for binary serialization codecs.
//!
//! `packbuf` sits between an encoder/decoder and its transport. It offers two
//! symmetric primitives:
//!
//! - [`SinkBuffer`] - stages outgoing bytes and flushes them to a writer
//! - [`SourceBuffer`] - serves incoming bytes from a fixed block or a
//!   refillable stream
//!
//! The crate intentionally:
//! - does NOT validate the bytes it moves
//! - does NOT compress or encrypt
//! - does NOT synchronize (one producer per sink, one consumer per source)
//! - does NOT flush on drop
//!
//! It only does one thing: **move bytes in amortized batches**
//!
//! # Sink
//!
//! ```
//! use packbuf::{IoWriter, SinkBuffer};
//!
//! let mut sink = SinkBuffer::new(1024, IoWriter::new(Vec::new()));
//! sink.put(&[0x81, 0xa3])?;
//! sink.put(b"key")?;
//! let bytes = sink.finish()?.into_inner();
//! assert_eq!(bytes, b"\x81\xa3key");
//! # Ok::<(), packbuf::BufferError>(())
//! ```
//!
//! # Source
//!
//! ```
//! use std::io::Cursor;
//! use packbuf::{IoReader, SourceBuffer};
//!
//! let mut source = SourceBuffer::streaming(64, IoReader::new(Cursor::new(b"\xa3key".to_vec())));
//! source.ensure(1)?;
//! let len = (source.read_slice(1)?[0] & 0x1f) as usize;
//! assert_eq!(source.read_slice(len)?, b"key");
//! # Ok::<(), packbuf::BufferError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod callback;
mod config;
mod error;
mod sink;
mod source;

//
// Public surface
//

pub use callback::{IoReader, IoWriter, NoReader, SinkWriter, SourceReader};
pub use config::{
    DEFAULT_SINK_CAPACITY, DEFAULT_SOURCE_CAPACITY, MIN_SINK_CAPACITY, SinkConfig, SourceConfig,
};
pub use error::BufferError;
pub use sink::SinkBuffer;
pub use source::{SourceBuffer, SourceStatus, StaticSource};
