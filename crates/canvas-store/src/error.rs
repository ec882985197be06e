//! Store error types.

use canvas_core::{AccountId, Amount, CodecError, PixelKey, Timestamp};
use thiserror::Error;

use crate::TransferError;

/// Canvas store error type.
///
/// Every variant is reported synchronously; nothing is retried internally
/// and a failed call leaves the store exactly as it found it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    /// A coordinate or key lies outside the canvas domain.
    #[error(transparent)]
    OutOfRange(#[from] CodecError),

    /// The cell has already been minted.
    #[error("pixel {0} is already owned")]
    AlreadyOwned(PixelKey),

    /// The cell has never been minted.
    #[error("pixel {0} not found")]
    NotFound(PixelKey),

    /// The caller is not allowed to perform this operation.
    #[error("{0} is not authorized")]
    Unauthorized(AccountId),

    /// Owners cannot lease their own cells.
    #[error("owner cannot rent their own pixel {0}")]
    OwnerCannotRent(PixelKey),

    /// The owner has not set a rent price.
    #[error("pixel {0} is not for rent")]
    NotForRent(PixelKey),

    /// An existing lease has not ended yet.
    #[error("pixel {key} is rented until {until}")]
    CurrentlyRented { key: PixelKey, until: Timestamp },

    /// Lease duration is zero or would overflow the clock.
    #[error("invalid rent duration: {0}s")]
    InvalidDuration(u64),

    /// Mint payment differs from the fixed mint price.
    #[error("invalid payment: expected {expected}, got {paid}")]
    InvalidPayment { expected: Amount, paid: Amount },

    /// Payment does not cover the lease cost.
    #[error("insufficient payment: required {required}, got {paid}")]
    InsufficientPayment { required: Amount, paid: Amount },

    /// The value-transfer capability refused a transfer.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    /// There are no held funds to withdraw.
    #[error("no balance to withdraw")]
    NoBalance,

    /// A region read covers more cells than one call may resolve.
    #[error("region of {cells} cells exceeds the limit of {limit}")]
    RegionTooLarge { cells: u128, limit: u128 },
}

/// Result type for store operations.
pub type CanvasResult<T> = Result<T, CanvasError>;
