//! Write-side buffering.
//!
//! - [`SinkBuffer`] - Stages encoder output and flushes it through a [`SinkWriter`](crate::SinkWriter)

mod buffer;

pub use buffer::SinkBuffer;
