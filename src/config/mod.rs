//! Configuration for buffer sizing.
//!
//! This module provides types to configure how much memory each buffer owns:
//!
//! - [`SinkConfig`] - Capacity of a [`SinkBuffer`](crate::SinkBuffer), clamped to a floor
//! - [`SourceConfig`] - Capacity of a streaming [`SourceBuffer`](crate::SourceBuffer)
//!
//! # Example
//!
//! ```
//! use packbuf::{SinkConfig, SourceConfig};
//!
//! // Hints below the floor are raised to it
//! let sink = SinkConfig::new(8);
//! assert_eq!(sink.capacity(), packbuf::MIN_SINK_CAPACITY);
//!
//! // Streaming sources must own at least one byte
//! let source = SourceConfig::new(4096)?;
//! assert_eq!(source.capacity(), 4096);
//!
//! # Ok::<(), packbuf::BufferError>(())
//! ```

use crate::error::BufferError;

/// Smallest storage a sink will allocate (32 bytes).
pub const MIN_SINK_CAPACITY: usize = 32;

/// Default sink capacity (8 KiB).
pub const DEFAULT_SINK_CAPACITY: usize = 8 * 1024;

/// Default streaming source capacity (8 KiB).
pub const DEFAULT_SOURCE_CAPACITY: usize = 8 * 1024;

/// Sizing for a [`SinkBuffer`](crate::SinkBuffer).
///
/// The capacity is a hint: anything below [`MIN_SINK_CAPACITY`] is raised to
/// the floor, so a sink never thrashes its writer with tiny flushes.
///
/// # Example
///
/// ```
/// use packbuf::SinkConfig;
///
/// let config = SinkConfig::default().with_capacity(64 * 1024);
/// assert_eq!(config.capacity(), 64 * 1024);
///
/// let config = SinkConfig::new(0);
/// assert_eq!(config.capacity(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkConfig {
    capacity: usize,
}

impl SinkConfig {
    /// Creates a configuration from a capacity hint, clamped to the floor.
    pub fn new(capacity_hint: usize) -> Self {
        Self {
            capacity: capacity_hint.max(MIN_SINK_CAPACITY),
        }
    }

    /// Sets the capacity hint, clamped to the floor.
    pub fn with_capacity(mut self, capacity_hint: usize) -> Self {
        self.capacity = capacity_hint.max(MIN_SINK_CAPACITY);
        self
    }

    /// Returns the effective capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SINK_CAPACITY)
    }
}

/// Sizing for a streaming [`SourceBuffer`](crate::SourceBuffer).
///
/// Static sources take their bounds from the wrapped slice and need no
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceConfig {
    capacity: usize,
}

impl SourceConfig {
    /// Creates a configuration with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if `capacity` is zero, since a
    /// zero-sized stream can never hold a byte.
    ///
    /// # Example
    ///
    /// ```
    /// use packbuf::SourceConfig;
    ///
    /// assert!(SourceConfig::new(0).is_err());
    /// assert_eq!(SourceConfig::new(64)?.capacity(), 64);
    /// # Ok::<(), packbuf::BufferError>(())
    /// ```
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::InvalidConfig {
                message: "source capacity must be non-zero",
            });
        }

        Ok(Self { capacity })
    }

    /// Returns the capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SOURCE_CAPACITY,
        }
    }
}
