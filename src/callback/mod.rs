//! Transport capabilities plugged into the buffers.
//!
//! - [`SinkWriter`] - Receives bytes flushed out of a [`SinkBuffer`](crate::SinkBuffer)
//! - [`SourceReader`] - Supplies bytes to a streaming [`SourceBuffer`](crate::SourceBuffer)
//!
//! Both traits are implemented for plain closures, so any per-call context is
//! simply whatever the closure captures. [`IoWriter`] and [`IoReader`] adapt
//! `std::io` types.

mod io;

pub use io::{IoReader, IoWriter};

/// Destination for bytes leaving a sink.
///
/// An implementation must accept the entire slice or fail, and must not keep
/// a reference to it past the call.
pub trait SinkWriter {
    /// Writes all of `data` to the transport.
    fn write_chunk(&mut self, data: &[u8]) -> std::io::Result<()>;
}

impl<F> SinkWriter for F
where
    F: FnMut(&[u8]) -> std::io::Result<()>,
{
    fn write_chunk(&mut self, data: &[u8]) -> std::io::Result<()> {
        self(data)
    }
}

/// Origin of bytes entering a streaming source.
///
/// `fill` writes at most `dst.len()` bytes and returns how many it wrote.
/// `Ok(0)` means nothing is available right now, which is not necessarily the
/// end of the stream.
pub trait SourceReader {
    /// Fills a prefix of `dst` and returns its length.
    fn fill(&mut self, dst: &mut [u8]) -> std::io::Result<usize>;
}

impl<F> SourceReader for F
where
    F: FnMut(&mut [u8]) -> std::io::Result<usize>,
{
    fn fill(&mut self, dst: &mut [u8]) -> std::io::Result<usize> {
        self(dst)
    }
}

/// Reader type of a source that wraps a fixed block.
///
/// It has no values, so a [`StaticSource`](crate::StaticSource) can never
/// call it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoReader {}

impl SourceReader for NoReader {
    fn fill(&mut self, _dst: &mut [u8]) -> std::io::Result<usize> {
        match *self {}
    }
}
