//! Packing of 2-D coordinates into ordered keys.

use serde::{Deserialize, Serialize};

use crate::{CodecError, CodecResult};

/// Bits per axis.
pub const AXIS_BITS: u32 = 48;

/// Largest valid value on either axis (`2^48 - 1`).
pub const AXIS_MAX: u64 = (1 << AXIS_BITS) - 1;

/// One past the largest valid key (`2^96`).
const KEY_LIMIT: u128 = 1 << (2 * AXIS_BITS);

/// A validated canvas coordinate.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "RawCoord")]
pub struct Coord {
    x: u64,
    y: u64,
}

#[derive(Deserialize)]
struct RawCoord {
    x: u64,
    y: u64,
}

impl TryFrom<RawCoord> for Coord {
    type Error = CodecError;

    fn try_from(raw: RawCoord) -> CodecResult<Self> {
        Self::new(raw.x, raw.y)
    }
}

impl Coord {
    /// The origin cell.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a coordinate, rejecting axes outside `[0, AXIS_MAX]`.
    pub const fn new(x: u64, y: u64) -> CodecResult<Self> {
        if x > AXIS_MAX || y > AXIS_MAX {
            return Err(CodecError::OutOfRange { x, y });
        }
        Ok(Self { x, y })
    }

    /// Build a coordinate whose axes are already known to be in range.
    #[inline]
    pub(crate) const fn new_unchecked(x: u64, y: u64) -> Self {
        debug_assert!(x <= AXIS_MAX && y <= AXIS_MAX);
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub const fn x(self) -> u64 {
        self.x
    }

    #[inline]
    #[must_use]
    pub const fn y(self) -> u64 {
        self.y
    }

    /// Pack this coordinate into its key.
    #[inline]
    #[must_use]
    pub const fn key(self) -> PixelKey {
        PixelKey(((self.x as u128) << AXIS_BITS) | self.y as u128)
    }
}

impl core::fmt::Display for Coord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single ordered key identifying one cell.
///
/// Numeric order is X-major, Y-minor order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u128", try_from = "u128")]
pub struct PixelKey(u128);

impl PixelKey {
    /// Wrap a raw key, returning `None` if it lies outside the packed domain.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u128) -> Option<Self> {
        if raw >= KEY_LIMIT {
            return None;
        }
        Some(Self(raw))
    }

    /// The raw integer value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Recover the coordinate this key was packed from.
    #[inline]
    #[must_use]
    pub const fn unpack(self) -> Coord {
        Coord {
            x: (self.0 >> AXIS_BITS) as u64,
            y: (self.0 as u64) & AXIS_MAX,
        }
    }
}

impl From<PixelKey> for u128 {
    fn from(key: PixelKey) -> Self {
        key.0
    }
}

impl TryFrom<u128> for PixelKey {
    type Error = CodecError;

    fn try_from(raw: u128) -> CodecResult<Self> {
        Self::from_raw(raw).ok_or(CodecError::MalformedKey(raw))
    }
}

impl From<Coord> for PixelKey {
    fn from(coord: Coord) -> Self {
        coord.key()
    }
}

impl From<PixelKey> for Coord {
    fn from(key: PixelKey) -> Self {
        key.unpack()
    }
}

impl core::fmt::Display for PixelKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#026x}", self.0)
    }
}

/// Pack `(x, y)` into a key.
pub const fn pack(x: u64, y: u64) -> CodecResult<PixelKey> {
    match Coord::new(x, y) {
        Ok(coord) => Ok(coord.key()),
        Err(e) => Err(e),
    }
}

/// Unpack a key into `(x, y)`.
#[must_use]
pub const fn unpack(key: PixelKey) -> (u64, u64) {
    let coord = key.unpack();
    (coord.x, coord.y)
}
