//! Read-side buffering.
//!
//! - [`SourceBuffer`] - Serves bytes from a fixed block or a refillable stream
//! - [`SourceStatus`] - Read-only snapshot of a source, for debugging

mod buffer;
mod status;

pub use buffer::{SourceBuffer, StaticSource};
pub use status::SourceStatus;
