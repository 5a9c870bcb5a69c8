//! Error types for packbuf.

use std::fmt;
use std::io;

/// Errors reported by sink and source buffers.
///
/// Allocation failure is not represented here: running out of memory while
/// constructing a buffer aborts the process.
#[derive(Debug)]
pub enum BufferError {
    /// The sink's writer failed to accept a chunk of bytes.
    Writer(io::Error),

    /// `refill` was called on a source that wraps a fixed block.
    RefillUnsupported,

    /// After a refill attempt the source still holds fewer bytes than needed.
    InsufficientData {
        /// Number of buffered bytes that were required.
        needed: usize,
        /// Number of buffered bytes actually present.
        available: usize,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl BufferError {
    /// Returns `true` if this error signals an exhausted or short source.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, BufferError::InsufficientData { .. })
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::Writer(e) => write!(f, "writer failed: {}", e),
            BufferError::RefillUnsupported => {
                write!(f, "refill is not supported on a static source")
            }
            BufferError::InsufficientData { needed, available } => {
                write!(
                    f,
                    "insufficient data: {} bytes needed, {} available",
                    needed, available
                )
            }
            BufferError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufferError::Writer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BufferError {
    fn from(e: io::Error) -> Self {
        BufferError::Writer(e)
    }
}

impl From<BufferError> for io::Error {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::Writer(inner) => inner,
            BufferError::RefillUnsupported => io::Error::new(io::ErrorKind::Unsupported, e),
            BufferError::InsufficientData { .. } => {
                io::Error::new(io::ErrorKind::UnexpectedEof, e)
            }
            BufferError::InvalidConfig { .. } => io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    }
}
