//! Rectangular region enumeration.

use crate::{CodecResult, Coord, PixelKey};

/// Lazy iterator over the keys of a rectangular region.
///
/// Keys come out X-major, Y-minor: every Y for the first X, then every Y
/// for the next X, and so on. Batch callers correlate results by position,
/// so this order is part of the contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRange {
    y_start: u64,
    x_end: u64,
    y_end: u64,
    /// Next coordinate to yield, `None` once exhausted.
    next: Option<(u64, u64)>,
}

impl KeyRange {
    /// Create a range over `[x_start, x_end] × [y_start, y_end]` (inclusive).
    ///
    /// An inverted axis (`end < start`) yields an empty range. Bounds outside
    /// the canvas domain are rejected.
    pub fn new(x_start: u64, x_end: u64, y_start: u64, y_end: u64) -> CodecResult<Self> {
        Coord::new(x_start, y_start)?;
        Coord::new(x_end, y_end)?;

        let next = (x_start <= x_end && y_start <= y_end).then_some((x_start, y_start));
        Ok(Self {
            y_start,
            x_end,
            y_end,
            next,
        })
    }

    /// An exhausted range.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            y_start: 0,
            x_end: 0,
            y_end: 0,
            next: None,
        }
    }

    /// Number of keys still to be yielded.
    #[must_use]
    pub fn key_count(&self) -> u128 {
        let Some((x, y)) = self.next else {
            return 0;
        };
        let column = u128::from(self.y_end - self.y_start) + 1;
        let full_columns = u128::from(self.x_end - x);
        full_columns * column + u128::from(self.y_end - y) + 1
    }
}

impl Iterator for KeyRange {
    type Item = PixelKey;

    fn next(&mut self) -> Option<PixelKey> {
        let (x, y) = self.next?;

        self.next = if y < self.y_end {
            Some((x, y + 1))
        } else if x < self.x_end {
            Some((x + 1, self.y_start))
        } else {
            None
        };

        Some(Coord::new_unchecked(x, y).key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.key_count();
        match usize::try_from(count) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl core::iter::FusedIterator for KeyRange {}

/// Enumerate the keys of `[x_start, x_end] × [y_start, y_end]`.
///
/// Never fails: inverted or out-of-domain bounds produce an empty sequence.
#[must_use]
pub fn enumerate_range(x_start: u64, x_end: u64, y_start: u64, y_end: u64) -> KeyRange {
    KeyRange::new(x_start, x_end, y_start, y_end).unwrap_or_else(|_| KeyRange::empty())
}
