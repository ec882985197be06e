//! Append-only pixel log with a coordinate index.
//!
//! The log keeps every written coordinate exactly once, in first-write
//! order. A secondary index maps each coordinate to its 1-based position in
//! the log, so repeated writes update the existing entry in place.
//!
//! ```text
//!   index: Coord ──▶ NonZeroUsize (1-based)
//!                         │
//!                         ▼
//!   entries: [ e1 | e2 | e3 | ... ]   (insertion order, never reordered)
//! ```
//!
//! Writes that would not change an entry are skipped entirely, including
//! their notification.

use std::num::NonZeroUsize;
use std::sync::Arc;

use canvas_core::{AccountId, Color, Coord, PixelKey};
use canvas_event::{CanvasEvent, EventSink};
use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    CanvasResult,
    batch::{self, ColorLookup, ColorView},
};

/// One logged cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub coord: Coord,
    pub color: Color,
    pub owner: AccountId,
}

/// A requested write, addressed by raw axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelWrite {
    pub x: u64,
    pub y: u64,
    pub color: Color,
}

impl PixelWrite {
    #[must_use]
    pub const fn new(x: u64, y: u64, color: Color) -> Self {
        Self { x, y, color }
    }
}

impl From<(Coord, Color)> for PixelWrite {
    fn from((coord, color): (Coord, Color)) -> Self {
        Self::new(coord.x(), coord.y(), color)
    }
}

#[derive(Default)]
struct LogState {
    entries: Vec<LogEntry>,
    index: HashMap<Coord, NonZeroUsize>,
}

impl LogState {
    fn slot(&self, coord: &Coord) -> Option<&LogEntry> {
        let position = self.index.get(coord)?;
        self.entries.get(position.get() - 1)
    }
}

impl ColorView for LogState {
    fn color_at(&self, key: PixelKey) -> Option<Color> {
        self.slot(&key.unpack()).map(|entry| entry.color)
    }
}

/// Deduplicating pixel log.
pub struct PixelLog {
    state: RwLock<LogState>,
    events: Arc<dyn EventSink>,
}

impl PixelLog {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            state: RwLock::new(LogState::default()),
            events,
        }
    }

    /// Apply `writes` in order on behalf of `actor`.
    ///
    /// The whole batch is validated first; an out-of-range coordinate fails
    /// the call before anything is written. The batch is applied under one
    /// write guard, so readers see it either not at all or completely.
    pub fn upsert_batch(&self, writes: &[PixelWrite], actor: AccountId) -> CanvasResult<()> {
        let validated = writes
            .iter()
            .map(|w| Coord::new(w.x, w.y).map(|coord| (coord, w.color)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = self.state.write();
        let LogState { entries, index } = &mut *state;
        let mut changed = Vec::new();

        for (coord, color) in validated {
            match index.get(&coord).copied() {
                None => {
                    entries.push(LogEntry {
                        coord,
                        color,
                        owner: actor,
                    });
                    // 1-based: the entry's position is the new log length
                    if let Some(position) = NonZeroUsize::new(entries.len()) {
                        index.insert(coord, position);
                    }
                    changed.push(CanvasEvent::PixelChanged {
                        key: coord.key(),
                        color,
                    });
                }
                Some(position) => {
                    let entry = &mut entries[position.get() - 1];
                    if entry.color != color || entry.owner != actor {
                        entry.color = color;
                        entry.owner = actor;
                        changed.push(CanvasEvent::PixelChanged {
                            key: coord.key(),
                            color,
                        });
                    }
                }
            }
        }

        debug!(
            "{actor} upserted {} pixel(s), {} changed, log length {}",
            writes.len(),
            changed.len(),
            entries.len()
        );
        for event in changed {
            self.events.emit(event);
        }
        Ok(())
    }

    /// Every entry in insertion order.
    #[must_use]
    pub fn list_all(&self) -> Vec<LogEntry> {
        self.state.read().entries.clone()
    }

    #[must_use]
    pub fn entry(&self, coord: Coord) -> Option<LogEntry> {
        self.state.read().slot(&coord).copied()
    }

    /// 1-based log position of `coord`, `None` if never written.
    #[must_use]
    pub fn position_of(&self, coord: Coord) -> Option<NonZeroUsize> {
        self.state.read().index.get(&coord).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }
}

impl ColorLookup for PixelLog {
    fn color_of(&self, key: PixelKey) -> Option<Color> {
        self.state.read().color_at(key)
    }

    fn batch_get_colors(&self, keys: &[u128]) -> Vec<Color> {
        batch::resolve(&*self.state.read(), keys)
    }
}

impl core::fmt::Debug for PixelLog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelLog")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
