//! Coordinate codec and shared primitives for the pixel canvas.
//!
//! Every cell on the canvas is addressed by an `(x, y)` pair where each axis
//! lives in `[0, 2^48 - 1]`. The codec packs a pair into a single ordered
//! [`PixelKey`], and unpacks it again without loss.
//!
//! # Key Format
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  PixelKey (u128, 96 significant bits)                      │
//! ├────────────────────────────────────────────────────────────┤
//! │  unused: 32 bits  (always zero)                            │
//! │  x:      48 bits  (high half, major order)                 │
//! │  y:      48 bits  (low half, minor order)                  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because X occupies the high bits, numeric key order is exactly the
//! X-major, Y-minor order that [`enumerate_range`] produces.
//!
//! # Usage
//!
//! ```
//! use canvas_core::{Coord, enumerate_range, pack};
//!
//! let key = pack(3, 7).unwrap();
//! assert_eq!(key.unpack(), Coord::new(3, 7).unwrap());
//!
//! let keys: Vec<_> = enumerate_range(0, 1, 0, 1).collect();
//! assert_eq!(keys.len(), 4);
//! ```

mod color;
mod error;
mod identity;
mod key;
mod range;

pub use color::Color;
pub use error::{CodecError, CodecResult};
pub use identity::AccountId;
pub use key::{AXIS_BITS, AXIS_MAX, Coord, PixelKey, pack, unpack};
pub use range::{KeyRange, enumerate_range};

/// An amount in the value-transfer capability's unit.
pub type Amount = u128;

/// Seconds on the monotonic clock capability.
pub type Timestamp = u64;
