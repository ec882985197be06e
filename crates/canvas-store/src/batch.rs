//! Batch color queries.
//!
//! Both stores answer batch reads the same way: take one read guard, then
//! resolve every requested key against it. Absent and malformed keys resolve
//! to [`Color::DEFAULT`], so a batch never fails part-way.

use canvas_core::{Color, PixelKey, enumerate_range};
use rayon::prelude::*;

use crate::{CanvasError, CanvasResult};

/// Batches at least this long are resolved on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 4096;

/// Largest region [`ColorLookup::region_colors`] will resolve in one call.
pub const MAX_REGION_KEYS: u128 = 1 << 24;

/// Point lookup against a consistent view of a store.
pub(crate) trait ColorView: Sync {
    fn color_at(&self, key: PixelKey) -> Option<Color>;
}

/// Resolve raw keys against `view`, preserving order and length.
pub(crate) fn resolve<V: ColorView + ?Sized>(view: &V, keys: &[u128]) -> Vec<Color> {
    let lookup = |raw: &u128| {
        PixelKey::from_raw(*raw)
            .and_then(|key| view.color_at(key))
            .unwrap_or(Color::DEFAULT)
    };

    if keys.len() >= PARALLEL_THRESHOLD {
        keys.par_iter().map(lookup).collect()
    } else {
        keys.iter().map(lookup).collect()
    }
}

/// Read-only color access shared by every store.
pub trait ColorLookup {
    /// Color of one cell, `None` if it was never written.
    fn color_of(&self, key: PixelKey) -> Option<Color>;

    /// Colors for `keys`, one per input in input order.
    ///
    /// Takes raw keys so callers can forward untrusted input: keys outside
    /// the packed domain resolve to the default color like absent ones.
    fn batch_get_colors(&self, keys: &[u128]) -> Vec<Color>;

    /// Colors of `[x_start, x_end] × [y_start, y_end]` in X-major, Y-minor
    /// order.
    ///
    /// Regions of more than [`MAX_REGION_KEYS`] cells are rejected with
    /// [`CanvasError::RegionTooLarge`] before anything is allocated.
    fn region_colors(
        &self,
        x_start: u64,
        x_end: u64,
        y_start: u64,
        y_end: u64,
    ) -> CanvasResult<Vec<Color>> {
        let range = enumerate_range(x_start, x_end, y_start, y_end);
        let cells = range.key_count();
        if cells > MAX_REGION_KEYS {
            return Err(CanvasError::RegionTooLarge {
                cells,
                limit: MAX_REGION_KEYS,
            });
        }

        let keys: Vec<u128> = range.map(PixelKey::raw).collect();
        Ok(self.batch_get_colors(&keys))
    }
}
