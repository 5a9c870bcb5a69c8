//! Source buffer - a read window over a fixed block or a refillable stream.
//!
//! A [`SourceBuffer`] has two shapes behind one type:
//!
//! - **Static**: borrows a complete message that is already in memory. Nothing
//!   is allocated and the window can only shrink.
//! - **Streaming**: owns a fixed block and pulls more bytes from a
//!   [`SourceReader`] when asked to refill, first compacting the unread bytes
//!   to the front of the block.
//!
//! # Short reads
//!
//! [`read`](SourceBuffer::read) only refills when the window is completely
//! empty. If a few bytes are buffered but fewer than requested, it returns
//! just those bytes without touching the reader. Callers that need an exact
//! count must loop, or use [`read_exact`](SourceBuffer::read_exact),
//! [`ensure`](SourceBuffer::ensure) or [`read_slice`](SourceBuffer::read_slice).
//!
//! # Example
//!
//! ```
//! use packbuf::SourceBuffer;
//!
//! let mut sent = false;
//! let mut source = SourceBuffer::streaming(64, move |dst: &mut [u8]| -> std::io::Result<usize> {
//!     if sent {
//!         return Ok(0);
//!     }
//!     sent = true;
//!     dst[..11].copy_from_slice(b"HELLO WORLD");
//!     Ok(11)
//! });
//!
//! let mut dest = [0u8; 20];
//! assert_eq!(source.read(&mut dest)?, 11);
//! assert_eq!(&dest[..11], b"HELLO WORLD");
//! assert_eq!(source.read(&mut dest)?, 0);
//! # Ok::<(), packbuf::BufferError>(())
//! ```

use std::fmt;
use std::io;

use bytes::Buf;

use crate::callback::{NoReader, SourceReader};
use crate::config::SourceConfig;
use crate::error::BufferError;
use crate::source::SourceStatus;

/// Backing bytes of a source.
enum Block<'a, R> {
    Static(&'a [u8]),
    Streaming { storage: Box<[u8]>, reader: R },
}

/// A read window over buffered input.
///
/// `position` is the index of the next unread byte and `available` is one
/// past the last valid byte. `0 <= position <= available <= capacity` always
/// holds.
///
/// Dropping a streaming source frees its block; dropping a static source
/// frees nothing.
pub struct SourceBuffer<'a, R = NoReader> {
    block: Block<'a, R>,
    position: usize,
    available: usize,
    reader_error: Option<io::Error>,
}

/// A source over a fixed, caller-owned block.
///
/// ```
/// use packbuf::StaticSource;
///
/// let mut source = StaticSource::from_slice(b"\x93\x01\x02\x03");
/// assert_eq!(source.read_slice(2)?, b"\x93\x01");
/// assert_eq!(source.remaining(), 2);
/// assert!(source.refill(0).is_err());
/// # Ok::<(), packbuf::BufferError>(())
/// ```
pub type StaticSource<'a> = SourceBuffer<'a, NoReader>;

impl<'a, R> SourceBuffer<'a, R> {
    /// Wraps an existing block.
    ///
    /// The whole block is readable and the source can never be refilled.
    /// Use the [`StaticSource`] alias when no reader type is in scope.
    pub fn from_slice(block: &'a [u8]) -> Self {
        Self {
            available: block.len(),
            block: Block::Static(block),
            position: 0,
            reader_error: None,
        }
    }

    /// Returns `true` for a streaming source that owns at least one byte.
    pub fn is_refillable(&self) -> bool {
        matches!(&self.block, Block::Streaming { storage, .. } if !storage.is_empty())
    }

    /// Returns the size of the underlying block.
    pub fn capacity(&self) -> usize {
        self.bytes().len()
    }

    /// Returns the index of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the index one past the last valid byte.
    pub fn available(&self) -> usize {
        self.available
    }

    /// Returns the number of buffered, unread bytes.
    pub fn remaining(&self) -> usize {
        self.available - self.position
    }

    /// Returns the buffered, unread bytes without consuming them.
    pub fn unread(&self) -> &[u8] {
        &self.bytes()[self.position..self.available]
    }

    /// Returns a snapshot of the window for debugging.
    pub fn status(&self) -> SourceStatus<'_> {
        SourceStatus {
            capacity: self.capacity(),
            position: self.position,
            available: self.available,
            unread: self.unread(),
        }
    }

    /// Takes the error reported by the reader during the most recent refill.
    ///
    /// A failing reader counts as "no bytes added", so its error does not
    /// fail the refill by itself. It is kept here until taken or until the
    /// next refill.
    pub fn take_reader_error(&mut self) -> Option<io::Error> {
        self.reader_error.take()
    }

    /// Returns the reader of a streaming source, dropping buffered bytes.
    pub fn into_reader(self) -> Option<R> {
        match self.block {
            Block::Static(_) => None,
            Block::Streaming { reader, .. } => Some(reader),
        }
    }

    fn bytes(&self) -> &[u8] {
        match &self.block {
            Block::Static(block) => *block,
            Block::Streaming { storage, .. } => &storage[..],
        }
    }
}

impl<R: SourceReader> SourceBuffer<'static, R> {
    /// Creates an empty streaming source owning `capacity` bytes.
    ///
    /// A zero capacity yields a source that cannot be refilled, like a static
    /// source over an empty slice; [`with_config`](SourceBuffer::with_config)
    /// rejects it outright.
    pub fn streaming(capacity: usize, reader: R) -> Self {
        Self {
            block: Block::Streaming {
                storage: vec![0u8; capacity].into_boxed_slice(),
                reader,
            },
            position: 0,
            available: 0,
            reader_error: None,
        }
    }

    /// Creates an empty streaming source sized by `config`.
    pub fn with_config(config: SourceConfig, reader: R) -> Self {
        Self::streaming(config.capacity(), reader)
    }
}

impl<R: SourceReader> SourceBuffer<'_, R> {
    /// Compacts the window and pulls more bytes from the reader.
    ///
    /// Unread bytes move to the front of the block, then the reader is asked
    /// to fill the free tail once. Only a positive count grows the window; a
    /// zero count or a reader error adds nothing.
    ///
    /// # Errors
    ///
    /// - [`BufferError::RefillUnsupported`] on a static source or a
    ///   zero-capacity stream
    /// - [`BufferError::InsufficientData`] if fewer than `min_needed` bytes
    ///   are buffered afterwards
    pub fn refill(&mut self, min_needed: usize) -> Result<(), BufferError> {
        let (storage, reader) = match &mut self.block {
            Block::Streaming { storage, reader } if !storage.is_empty() => (storage, reader),
            _ => return Err(BufferError::RefillUnsupported),
        };

        if self.position > 0 {
            storage.copy_within(self.position..self.available, 0);
            self.available -= self.position;
            self.position = 0;
        }

        self.reader_error = None;
        let free = storage.len() - self.available;
        match reader.fill(&mut storage[self.available..]) {
            Ok(n) if n > 0 => {
                if n > free {
                    tracing::debug!(reported = n, free, "source reader overreported, clamping");
                }
                self.available += n.min(free);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "source reader failed");
                self.reader_error = Some(e);
            }
        }

        tracing::trace!(
            min_needed,
            available = self.available,
            capacity = storage.len(),
            "source refill"
        );

        if self.available >= min_needed {
            Ok(())
        } else {
            Err(BufferError::InsufficientData {
                needed: min_needed,
                available: self.available,
            })
        }
    }

    /// Copies up to `dst.len()` buffered bytes into `dst`.
    ///
    /// Refills once, with no minimum, only when the window is empty. Returns
    /// the number of bytes copied, which is smaller than `dst.len()` whenever
    /// fewer bytes are buffered. A streaming source whose reader has nothing
    /// to give returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::RefillUnsupported`] when a static source is
    /// exhausted.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, BufferError> {
        if self.position == self.available {
            self.refill(0)?;
        }

        let len = dst.len().min(self.available - self.position);
        dst[..len].copy_from_slice(&self.bytes()[self.position..self.position + len]);
        self.position += len;
        Ok(len)
    }

    /// Makes sure at least `n` unread bytes are buffered.
    ///
    /// Refills only when the window is short.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InsufficientData`] if the bytes cannot be made
    /// available, including on a static source that holds fewer than `n`.
    pub fn ensure(&mut self, n: usize) -> Result<(), BufferError> {
        if self.remaining() >= n {
            return Ok(());
        }

        match self.refill(n) {
            Err(BufferError::RefillUnsupported) => Err(BufferError::InsufficientData {
                needed: n,
                available: self.remaining(),
            }),
            result => result,
        }
    }

    /// Consumes exactly `n` bytes and borrows them from the block.
    ///
    /// ```
    /// use packbuf::StaticSource;
    ///
    /// let mut source = StaticSource::from_slice(b"\xa3abc");
    /// let tag = source.read_slice(1)?[0];
    /// let len = (tag & 0x1f) as usize;
    /// assert_eq!(source.read_slice(len)?, b"abc");
    /// assert!(source.read_slice(1).is_err());
    /// # Ok::<(), packbuf::BufferError>(())
    /// ```
    pub fn read_slice(&mut self, n: usize) -> Result<&[u8], BufferError> {
        self.ensure(n)?;

        let start = self.position;
        self.position += n;
        Ok(&self.bytes()[start..start + n])
    }

    /// Reads until `dst` is full.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InsufficientData`] once the source yields no
    /// more bytes. Bytes read before that point are consumed and left in the
    /// front of `dst`.
    pub fn read_exact(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        let mut filled = 0;
        while filled < dst.len() {
            let n = match self.read(&mut dst[filled..]) {
                Err(BufferError::RefillUnsupported) => 0,
                result => result?,
            };
            if n == 0 {
                return Err(BufferError::InsufficientData {
                    needed: dst.len() - filled,
                    available: 0,
                });
            }
            filled += n;
        }
        Ok(())
    }
}

impl<R> fmt::Debug for SourceBuffer<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("refillable", &self.is_refillable())
            .field("capacity", &self.capacity())
            .field("position", &self.position)
            .field("available", &self.available)
            .finish_non_exhaustive()
    }
}

/// `std::io` view of the source.
///
/// An exhausted static source reads as end of file. A reader error from the
/// last refill is returned when it left the window empty.
impl<R: SourceReader> io::Read for SourceBuffer<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        match SourceBuffer::read(self, buf) {
            Ok(0) => match self.reader_error.take() {
                Some(e) => Err(e),
                None => Ok(0),
            },
            Ok(n) => Ok(n),
            Err(BufferError::RefillUnsupported) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: SourceReader> io::BufRead for SourceBuffer<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.position == self.available && self.is_refillable() {
            self.refill(0)?;
            if self.position == self.available {
                if let Some(e) = self.reader_error.take() {
                    return Err(e);
                }
            }
        }
        Ok(self.unread())
    }

    fn consume(&mut self, amt: usize) {
        self.position = (self.position + amt).min(self.available);
    }
}

/// The buffered window as a [`bytes::Buf`]. It never refills.
impl<R> Buf for SourceBuffer<'_, R> {
    fn remaining(&self) -> usize {
        self.available - self.position
    }

    fn chunk(&self) -> &[u8] {
        self.unread()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.available - self.position,
            "cannot advance past the buffered window"
        );
        self.position += cnt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Reader that hands out scripted pieces, then zero forever.
    fn scripted(pieces: &[&'static str], calls: Rc<Cell<usize>>) -> impl SourceReader {
        let mut pieces = pieces.to_vec().into_iter().map(str::as_bytes);
        move |dst: &mut [u8]| -> io::Result<usize> {
            calls.set(calls.get() + 1);
            match pieces.next() {
                Some(piece) => {
                    let n = piece.len().min(dst.len());
                    dst[..n].copy_from_slice(&piece[..n]);
                    Ok(n)
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn test_static_bounds() {
        let data = b"abcdef";
        let source = StaticSource::from_slice(data);
        assert!(!source.is_refillable());
        assert_eq!(source.position(), 0);
        assert_eq!(source.available(), 6);
        assert_eq!(source.capacity(), 6);
    }

    #[test]
    fn test_static_refill_fails() {
        let mut source = StaticSource::from_slice(b"abc");
        assert!(matches!(
            source.refill(0),
            Err(BufferError::RefillUnsupported)
        ));
        assert_eq!(source.available(), 3);
    }

    #[test]
    fn test_static_read_then_exhausted() {
        let mut source = StaticSource::from_slice(b"abc");
        let mut dst = [0u8; 8];
        assert_eq!(source.read(&mut dst).unwrap(), 3);
        assert_eq!(&dst[..3], b"abc");
        assert!(matches!(
            source.read(&mut dst),
            Err(BufferError::RefillUnsupported)
        ));
    }

    #[test]
    fn test_refill_compacts_unread_bytes() {
        let calls = Rc::new(Cell::new(0));
        let mut source = SourceBuffer::streaming(8, scripted(&["abcdefgh", "ij"], calls));

        source.refill(0).unwrap();
        let mut dst = [0u8; 5];
        assert_eq!(source.read(&mut dst).unwrap(), 5);
        assert_eq!(source.unread(), b"fgh");

        source.refill(4).unwrap();
        assert_eq!(source.position(), 0);
        assert_eq!(source.available(), 5);
        assert_eq!(source.unread(), b"fghij");
    }

    #[test]
    fn test_refill_reports_insufficient_data() {
        let calls = Rc::new(Cell::new(0));
        let mut source = SourceBuffer::streaming(16, scripted(&["abc"], calls));

        let err = source.refill(4).unwrap_err();
        assert!(matches!(
            err,
            BufferError::InsufficientData {
                needed: 4,
                available: 3
            }
        ));
        // Bytes that did arrive stay buffered
        assert_eq!(source.unread(), b"abc");
    }

    #[test]
    fn test_short_read_does_not_refill() {
        let calls = Rc::new(Cell::new(0));
        let mut source =
            SourceBuffer::streaming(16, scripted(&["abcd", "efgh"], calls.clone()));

        let mut dst = [0u8; 2];
        source.read(&mut dst).unwrap();
        assert_eq!(calls.get(), 1);

        let mut big = [0u8; 10];
        assert_eq!(source.read(&mut big).unwrap(), 2);
        assert_eq!(&big[..2], b"cd");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_hello_world_stream() {
        let calls = Rc::new(Cell::new(0));
        let mut source = SourceBuffer::streaming(64, scripted(&["HELLO WORLD"], calls.clone()));

        let mut dest = [0u8; 20];
        assert_eq!(source.read(&mut dest).unwrap(), 11);
        assert_eq!(&dest[..11], b"HELLO WORLD");
        assert_eq!(calls.get(), 1);

        assert_eq!(source.read(&mut dest).unwrap(), 0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_reader_error_counts_as_no_bytes() {
        let mut source = SourceBuffer::streaming(16, |_: &mut [u8]| -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        });

        assert!(source.refill(0).is_ok());
        assert_eq!(source.available(), 0);
        let err = source.take_reader_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(source.take_reader_error().is_none());
    }

    #[test]
    fn test_reader_overreport_is_clamped() {
        let mut source =
            SourceBuffer::streaming(4, |_: &mut [u8]| -> io::Result<usize> { Ok(100) });
        source.refill(4).unwrap();
        assert_eq!(source.available(), 4);

        // No free space left: the count is clamped to zero
        source.refill(0).unwrap();
        assert_eq!(source.available(), source.capacity());
    }

    #[test]
    fn test_zero_capacity_stream_is_not_refillable() {
        let mut calls = 0;
        let mut source = SourceBuffer::streaming(0, |_: &mut [u8]| -> io::Result<usize> {
            calls += 1;
            Ok(0)
        });

        assert!(!source.is_refillable());
        assert!(matches!(
            source.refill(0),
            Err(BufferError::RefillUnsupported)
        ));
        let mut dst = [0u8; 4];
        assert!(matches!(
            source.read(&mut dst),
            Err(BufferError::RefillUnsupported)
        ));
        drop(source);
        assert_eq!(calls, 0, "the reader is never asked to fill an empty block");
    }

    #[test]
    fn test_reader_fills_whole_block() {
        let mut source =
            SourceBuffer::streaming(4, |_: &mut [u8]| -> io::Result<usize> { Ok(4) });
        source.refill(4).unwrap();
        assert_eq!(source.available(), source.capacity());
    }

    #[test]
    fn test_ensure_and_read_slice() {
        let calls = Rc::new(Cell::new(0));
        let mut source =
            SourceBuffer::streaming(8, scripted(&["\x01", "\x02\x03\x04"], calls.clone()));

        assert_eq!(source.read_slice(1).unwrap(), b"\x01");
        assert_eq!(source.read_slice(3).unwrap(), b"\x02\x03\x04");
        assert!(source.ensure(0).is_ok());
        assert!(source.read_slice(1).unwrap_err().is_insufficient_data());
    }

    #[test]
    fn test_ensure_static_short() {
        let mut source = StaticSource::from_slice(b"ab");
        assert!(source.ensure(2).is_ok());
        assert!(matches!(
            source.ensure(3),
            Err(BufferError::InsufficientData {
                needed: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn test_read_exact_spans_refills() {
        let calls = Rc::new(Cell::new(0));
        let mut source = SourceBuffer::streaming(4, scripted(&["ab", "cd", "ef"], calls));

        let mut dst = [0u8; 5];
        source.read_exact(&mut dst).unwrap();
        assert_eq!(&dst, b"abcde");

        let mut rest = [0u8; 3];
        assert!(source.read_exact(&mut rest).unwrap_err().is_insufficient_data());
        assert_eq!(rest[0], b'f');
    }

    #[test]
    fn test_read_exact_static_exhausted() {
        let mut source = StaticSource::from_slice(b"abc");
        let mut dst = [0u8; 4];
        assert!(matches!(
            source.read_exact(&mut dst),
            Err(BufferError::InsufficientData {
                needed: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn test_io_read_static_eof() {
        use std::io::Read;

        let mut source = StaticSource::from_slice(b"payload");
        let mut out = Vec::new();
        source.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"payload");
    }

    #[test]
    fn test_io_read_surfaces_reader_error() {
        use std::io::Read;

        let mut source = SourceBuffer::streaming(8, |_: &mut [u8]| -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::TimedOut, "slow"))
        });
        let mut dst = [0u8; 4];
        let err = Read::read(&mut source, &mut dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_buf_read_lines() {
        use std::io::BufRead;

        let calls = Rc::new(Cell::new(0));
        let source = SourceBuffer::streaming(8, scripted(&["one\ntw", "o\n"], calls));
        let lines: Vec<String> = source.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_buf_impl_never_refills() {
        let calls = Rc::new(Cell::new(0));
        let mut source = SourceBuffer::streaming(8, scripted(&["\x00\x2a"], calls.clone()));
        assert_eq!(Buf::remaining(&source), 0);

        source.refill(2).unwrap();
        assert_eq!(source.get_u16(), 42);
        assert!(!source.has_remaining());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_status_snapshot() {
        let mut source = StaticSource::from_slice(b"hello");
        let mut dst = [0u8; 2];
        source.read(&mut dst).unwrap();

        let status = source.status();
        assert_eq!(status.position, 2);
        assert_eq!(status.available, 5);
        assert_eq!(status.unread, b"llo");
        assert!(status.to_string().starts_with("5b buffered stream | 2/5"));
    }

    #[test]
    fn test_into_reader() {
        let source = StaticSource::from_slice(b"x");
        assert!(source.into_reader().is_none());

        let calls = Rc::new(Cell::new(0));
        let source = SourceBuffer::streaming(4, scripted(&[], calls));
        assert!(source.into_reader().is_some());
    }
}
