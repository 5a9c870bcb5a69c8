//! Adapters from `std::io` traits to the buffer callbacks.

use std::io::{ErrorKind, Read, Write};

use super::{SinkWriter, SourceReader};

/// Flushes sink output into any [`std::io::Write`].
///
/// # Example
///
/// ```
/// use packbuf::{IoWriter, SinkBuffer};
///
/// let mut sink = SinkBuffer::new(64, IoWriter::new(Vec::new()));
/// sink.put(b"payload")?;
/// let out = sink.finish()?.into_inner();
/// assert_eq!(out, b"payload");
/// # Ok::<(), packbuf::BufferError>(())
/// ```
#[derive(Debug, Default)]
pub struct IoWriter<W> {
    inner: W,
}

impl<W: Write> IoWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns a reference to the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the wrapped writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> SinkWriter for IoWriter<W> {
    fn write_chunk(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.inner.write_all(data)
    }
}

/// Feeds a streaming source from any [`std::io::Read`].
///
/// Interrupted reads are retried; any other error is handed to the source.
#[derive(Debug, Default)]
pub struct IoReader<R> {
    inner: R,
}

impl<R: Read> IoReader<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> SourceReader for IoReader<R> {
    fn fill(&mut self, dst: &mut [u8]) -> std::io::Result<usize> {
        loop {
            match self.inner.read(dst) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}
