//! Pixel change notifications.
//!
//! The canvas stores emit two notifications:
//!
//! - [`CanvasEvent::PixelChanged`] whenever a cell's color is written
//! - [`CanvasEvent::PixelRented`] whenever a lease is granted
//!
//! Stores hand events to an [`EventSink`] synchronously, after the causing
//! operation has committed and before the next mutating operation can start.
//! Sink order is therefore commit order.
//!
//! # Example
//!
//! ```
//! use canvas_core::{Color, pack};
//! use canvas_event::{CanvasEvent, EventQueue, EventSink};
//!
//! let queue = EventQueue::new();
//! let key = pack(1, 2).unwrap();
//! queue.emit(CanvasEvent::PixelChanged { key, color: Color::from_rgb(255, 0, 0) });
//!
//! let drained = queue.drain();
//! assert_eq!(drained.len(), 1);
//! assert_eq!(drained[0].key(), key);
//! ```

mod event;
mod sink;

pub use event::CanvasEvent;
pub use sink::{ChannelSink, EventQueue, EventSink, NullSink};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{CanvasEvent, ChannelSink, EventQueue, EventSink, NullSink};
}
