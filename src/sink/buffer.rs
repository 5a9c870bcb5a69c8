//! Sink buffer - staged output with a direct path for oversized payloads.
//!
//! Encoders emit many small writes (a tag byte, a length prefix, a short
//! string). [`SinkBuffer`] collects them in a fixed block and hands the block
//! to its writer only when it fills up or when asked to flush. Payloads at
//! least as large as the block bypass it entirely.
//!
//! # Example
//!
//! ```
//! use packbuf::SinkBuffer;
//!
//! let mut out = Vec::new();
//! let mut sink = SinkBuffer::new(32, |data: &[u8]| -> std::io::Result<()> {
//!     out.extend_from_slice(data);
//!     Ok(())
//! });
//!
//! sink.put(&[0x92])?;
//! sink.put(b"\xa5hello")?;
//! sink.flush()?;
//! drop(sink);
//!
//! assert_eq!(out, b"\x92\xa5hello");
//! # Ok::<(), packbuf::BufferError>(())
//! ```

use std::fmt;
use std::io;

use bytes::Buf;

use crate::callback::SinkWriter;
use crate::config::SinkConfig;
use crate::error::BufferError;

/// A fixed-capacity output buffer in front of a [`SinkWriter`].
///
/// # Invariants
///
/// - `len() <= capacity()` after every operation
/// - Staged bytes are flushed before any write that would overflow the block
/// - Bytes reach the writer in exactly the order they were put
///
/// # Dropping
///
/// Dropping a sink releases its storage **without** flushing. Call
/// [`flush`](SinkBuffer::flush) or [`finish`](SinkBuffer::finish) first if
/// staged bytes matter.
///
/// # Failure
///
/// When the writer fails inside [`put`](SinkBuffer::put), the error is
/// returned immediately and the staged contents are unspecified. Treat the
/// sink as unusable until a later `flush` succeeds.
pub struct SinkBuffer<W> {
    storage: Box<[u8]>,
    filled: usize,
    writer: W,
}

impl<W: SinkWriter> SinkBuffer<W> {
    /// Creates a sink with the given capacity hint.
    ///
    /// Hints below [`MIN_SINK_CAPACITY`](crate::MIN_SINK_CAPACITY) are raised
    /// to it.
    ///
    /// # Example
    ///
    /// ```
    /// use packbuf::{IoWriter, SinkBuffer};
    ///
    /// let sink = SinkBuffer::new(4, IoWriter::new(Vec::new()));
    /// assert_eq!(sink.capacity(), 32);
    /// ```
    pub fn new(capacity_hint: usize, writer: W) -> Self {
        Self::with_config(SinkConfig::new(capacity_hint), writer)
    }

    /// Creates a sink sized by `config`.
    pub fn with_config(config: SinkConfig, writer: W) -> Self {
        Self {
            storage: vec![0u8; config.capacity()].into_boxed_slice(),
            filled: 0,
            writer,
        }
    }

    /// Appends `data` to the sink.
    ///
    /// If `data` fits in the free space it is only copied. Otherwise the
    /// staged bytes are flushed first, every full `capacity()`-sized chunk of
    /// `data` is passed straight to the writer, and the remaining tail is
    /// staged.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Writer`] as soon as the writer fails, either
    /// while flushing staged bytes or while writing a direct chunk.
    pub fn put(&mut self, data: &[u8]) -> Result<(), BufferError> {
        let mut handed_off = 0;
        self.put_tracked(data, &mut handed_off)
    }

    /// Same as `put`, counting how many leading bytes of `data` reached the
    /// writer through the direct path, including when it fails partway.
    fn put_tracked(&mut self, data: &[u8], handed_off: &mut usize) -> Result<(), BufferError> {
        let capacity = self.capacity();

        if self.filled + data.len() <= capacity {
            self.storage[self.filled..self.filled + data.len()].copy_from_slice(data);
            self.filled += data.len();
            return Ok(());
        }

        self.flush()?;

        let mut rest = data;
        while rest.len() >= capacity {
            let (chunk, tail) = rest.split_at(capacity);
            tracing::trace!(len = chunk.len(), "sink direct write");
            self.writer.write_chunk(chunk).map_err(|e| {
                tracing::debug!(
                    error = %e,
                    handed_off = *handed_off,
                    "sink writer failed on direct write"
                );
                BufferError::Writer(e)
            })?;
            *handed_off += chunk.len();
            rest = tail;
        }

        self.storage[..rest.len()].copy_from_slice(rest);
        self.filled = rest.len();
        Ok(())
    }

    /// Appends every remaining chunk of `buf`, in order.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::Buf;
    /// use packbuf::{IoWriter, SinkBuffer};
    ///
    /// let mut sink = SinkBuffer::new(32, IoWriter::new(Vec::new()));
    /// sink.put_buf((&b"head"[..]).chain(&b"tail"[..]))?;
    /// assert_eq!(sink.buffered(), b"headtail");
    /// # Ok::<(), packbuf::BufferError>(())
    /// ```
    pub fn put_buf<B: Buf>(&mut self, mut buf: B) -> Result<(), BufferError> {
        while buf.has_remaining() {
            let chunk = buf.chunk();
            let len = chunk.len();
            self.put(chunk)?;
            buf.advance(len);
        }
        Ok(())
    }

    /// Hands all staged bytes to the writer.
    ///
    /// Does nothing when the sink is empty. On failure the staged bytes are
    /// kept, so the call may be retried.
    pub fn flush(&mut self) -> Result<(), BufferError> {
        if self.filled == 0 {
            return Ok(());
        }

        tracing::trace!(len = self.filled, "sink flush");
        if let Err(e) = self.writer.write_chunk(&self.storage[..self.filled]) {
            tracing::debug!(error = %e, pending = self.filled, "sink writer failed on flush");
            return Err(BufferError::Writer(e));
        }

        self.filled = 0;
        Ok(())
    }

    /// Flushes staged bytes and returns the writer.
    pub fn finish(mut self) -> Result<W, BufferError> {
        self.flush()?;
        Ok(self.writer)
    }
}

impl<W> SinkBuffer<W> {
    /// Returns the size of the internal block.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of staged bytes.
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Returns the staged bytes.
    pub fn buffered(&self) -> &[u8] {
        &self.storage[..self.filled]
    }

    /// Returns a reference to the writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns a mutable reference to the writer.
    ///
    /// Writing through it directly bypasses any staged bytes.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Returns the writer, discarding any staged bytes.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> fmt::Debug for SinkBuffer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkBuffer")
            .field("capacity", &self.capacity())
            .field("filled", &self.filled)
            .finish_non_exhaustive()
    }
}

/// `std::io` view of the sink.
///
/// When the writer fails after some direct chunks of `buf` were accepted,
/// `write` reports those bytes as written instead of failing, so callers
/// that retry never send them twice. The next call surfaces the error.
impl<W: SinkWriter> io::Write for SinkBuffer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut handed_off = 0;
        match self.put_tracked(buf, &mut handed_off) {
            Ok(()) => Ok(buf.len()),
            Err(_) if handed_off > 0 => Ok(handed_off),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.put(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        SinkBuffer::flush(self).map_err(io::Error::from)
    }
}
