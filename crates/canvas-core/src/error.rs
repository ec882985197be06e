//! Codec error types.

use thiserror::Error;

/// Coordinate codec error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// One of the axes exceeds the 48-bit domain.
    #[error("coordinate ({x}, {y}) is outside the canvas domain")]
    OutOfRange { x: u64, y: u64 },

    /// A raw key with bits set above the packed 96-bit domain.
    #[error("key {0:#x} is outside the packed domain")]
    MalformedKey(u128),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
