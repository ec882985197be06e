//! Notification payloads.

use canvas_core::{AccountId, Color, PixelKey, Timestamp};
use serde::{Deserialize, Serialize};

/// A notification emitted by a canvas store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasEvent {
    /// A cell's color was written.
    PixelChanged { key: PixelKey, color: Color },
    /// A cell was leased to `renter` until `rent_end_time`.
    PixelRented {
        key: PixelKey,
        renter: AccountId,
        rent_end_time: Timestamp,
    },
}

impl CanvasEvent {
    /// The cell this event is about.
    #[must_use]
    pub const fn key(&self) -> PixelKey {
        match self {
            Self::PixelChanged { key, .. } | Self::PixelRented { key, .. } => *key,
        }
    }

    /// Event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PixelChanged { .. } => "PixelChanged",
            Self::PixelRented { .. } => "PixelRented",
        }
    }
}
