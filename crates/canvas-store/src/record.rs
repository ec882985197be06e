//! Per-cell state for the mapped store.

use canvas_core::{AccountId, Amount, Color, Timestamp};
use serde::{Deserialize, Serialize};

/// State of a minted cell.
///
/// Records are created by `mint` and never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRecord {
    pub color: Color,
    pub owner: AccountId,
    /// Lease price; zero means the cell is not for rent.
    pub rent_price_per_second: Amount,
    pub renter: Option<AccountId>,
    pub rent_end_time: Option<Timestamp>,
}

impl PixelRecord {
    /// A freshly minted, unleased record.
    #[must_use]
    pub const fn minted(color: Color, owner: AccountId, rent_price_per_second: Amount) -> Self {
        Self {
            color,
            owner,
            rent_price_per_second,
            renter: None,
            rent_end_time: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_owner(&self, actor: AccountId) -> bool {
        self.owner == actor
    }

    /// `actor` holds a lease that has not yet ended (`now < rent_end_time`).
    #[must_use]
    pub fn is_active_renter(&self, actor: AccountId, now: Timestamp) -> bool {
        self.renter == Some(actor) && self.rent_end_time.is_some_and(|end| now < end)
    }

    /// Owner, or renter with a live lease.
    #[must_use]
    pub fn can_paint(&self, actor: AccountId, now: Timestamp) -> bool {
        self.is_owner(actor) || self.is_active_renter(actor, now)
    }

    /// A lease blocks new leases up to and including its end second
    /// (`now <= rent_end_time`).
    #[must_use]
    pub fn is_leased(&self, now: Timestamp) -> bool {
        self.rent_end_time.is_some_and(|end| now <= end)
    }

    #[must_use]
    pub const fn is_for_rent(&self) -> bool {
        self.rent_price_per_second > 0
    }
}
