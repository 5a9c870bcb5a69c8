//! Diagnostic snapshot of a source buffer.

use std::fmt;

/// A read-only view of a [`SourceBuffer`](crate::SourceBuffer)'s window.
///
/// Rendering it with `{}` prints the capacity, the `position/available`
/// cursor pair and the unread bytes in hex:
///
/// ```text
/// 64b buffered stream | 2/5
/// DATA: 0x6C 0x6C 0x6F
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStatus<'a> {
    /// Size of the underlying block.
    pub capacity: usize,
    /// Index of the next unread byte.
    pub position: usize,
    /// Index one past the last valid byte.
    pub available: usize,
    /// The unread window, `[position, available)`.
    pub unread: &'a [u8],
}

impl SourceStatus<'_> {
    /// Returns the number of unread bytes.
    pub fn buffered(&self) -> usize {
        self.unread.len()
    }
}

impl fmt::Display for SourceStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}b buffered stream | {}/{}",
            self.capacity, self.position, self.available
        )?;
        write!(f, "DATA:")?;
        for byte in self.unread {
            write!(f, " 0x{:02X}", byte)?;
        }
        Ok(())
    }
}
