//! Coordinate-indexed pixel state store.
//!
//! Two storage strategies share one codec, one event model and one batch
//! read path:
//!
//! - [`Canvas`]: a key → record map with ownership, paid minting, rent
//!   prices and time-bounded leases. Random-access mutation.
//! - [`PixelLog`]: an append-only log with a coordinate index. Ordered
//!   full enumeration and write deduplication.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Canvas / PixelLog                                                  │
//! │    - RwLock around all state (one writer, many readers)             │
//! │    - validate → settle payments → commit → emit, under one guard    │
//! └─────────────────────────────────────────────────────────────────────┘
//!          │                    │                       │
//!          ▼                    ▼                       ▼
//!   ValueTransfer           Clock                  EventSink
//!   (move funds)            (current time)         (PixelChanged,
//!                                                   PixelRented)
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use canvas_core::{AccountId, Color, pack};
//! use canvas_event::EventQueue;
//! use canvas_store::{Bank, Canvas, CanvasConfig, ColorLookup, ManualClock};
//!
//! let bank = Arc::new(Bank::new());
//! let events = Arc::new(EventQueue::new());
//! let config = CanvasConfig::default().with_mint_price(10);
//! let canvas = Canvas::new(config, bank.clone(), Arc::new(ManualClock::new(0)), events.clone());
//!
//! let alice = AccountId::from_u128(1);
//! bank.deposit(alice, 10);
//!
//! let key = pack(3, 4).unwrap();
//! canvas.mint(key, Color::from_rgb(255, 0, 0), 0, 10, alice).unwrap();
//!
//! assert_eq!(canvas.batch_get_colors(&[key.raw()]), vec![Color::from_rgb(255, 0, 0)]);
//! assert_eq!(events.len(), 1);
//! ```

mod batch;
mod canvas;
mod capability;
mod config;
mod error;
mod log;
mod payout;
mod record;

pub use batch::{ColorLookup, MAX_REGION_KEYS, PARALLEL_THRESHOLD};
pub use canvas::Canvas;
pub use capability::{Bank, Clock, ManualClock, SystemClock, TransferError, ValueTransfer};
pub use config::{CanvasConfig, DEFAULT_MINT_PRICE, DEFAULT_TREASURY};
pub use error::{CanvasError, CanvasResult};
pub use log::{LogEntry, PixelLog, PixelWrite};
pub use record::PixelRecord;

/// Prelude for convenient imports
pub mod prelude {
    pub use canvas_core::{AccountId, Amount, Color, Coord, PixelKey, Timestamp};
    pub use canvas_event::{CanvasEvent, EventQueue, EventSink};

    pub use crate::{
        Bank, Canvas, CanvasConfig, CanvasError, CanvasResult, Clock, ColorLookup, ManualClock,
        PixelLog, PixelRecord, PixelWrite, ValueTransfer,
    };
}
