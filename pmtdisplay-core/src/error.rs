//! Error types for pmtdisplay-core.

use thiserror::Error;

/// Result type alias for pmtdisplay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for pmtdisplay operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An element index with no entry in the geometry or flat map.
    #[error("unknown element index: {0}")]
    UnknownElement(u32),

    /// A geometry element number that cannot be converted to a 0-based index.
    #[error("invalid element number {0}: geometry numbering starts at 1")]
    InvalidElementNumber(i64),

    /// Two geometry entries share the same element number.
    #[error("duplicate element number {0} in geometry")]
    DuplicateElement(u32),

    /// Parallel columns that must have equal lengths do not.
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An event source that holds no events.
    #[error("event source contains no events")]
    NoEvents,

    /// A direct request for an event beyond the source.
    #[error("event {index} out of range (source has {len} events)")]
    EventOutOfRange { index: usize, len: usize },

    /// Failure reported by an event source backend.
    #[error("event source error: {0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),
}
