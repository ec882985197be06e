//! Mapped store: one record per minted cell with ownership and leasing.
//!
//! # Lifecycle
//!
//! ```text
//!   Absent ──mint──▶ Owned ──rent──▶ Owned+Leased ──(lease ends)──▶ Owned ...
//! ```
//!
//! A cell never returns to `Absent`. All mutating operations serialize on a
//! single write guard, validate every precondition before touching state,
//! settle payments, then commit and emit events before releasing the guard.

use std::sync::Arc;

use canvas_core::{AccountId, Amount, Color, Coord, PixelKey};
use canvas_event::{CanvasEvent, EventSink};
use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::smallvec;
use tracing::{debug, info};

use crate::{
    CanvasConfig, CanvasError, CanvasResult, Clock, PixelRecord, ValueTransfer,
    batch::{self, ColorLookup, ColorView},
    payout::{self, Leg, Legs},
};

#[derive(Default)]
struct Ledger {
    pixels: HashMap<PixelKey, PixelRecord>,
    /// Mint proceeds held in the treasury and not yet withdrawn.
    balance: Amount,
}

impl ColorView for Ledger {
    fn color_at(&self, key: PixelKey) -> Option<Color> {
        self.pixels.get(&key).map(|record| record.color)
    }
}

/// Coordinate-indexed pixel store with ownership and leases.
pub struct Canvas {
    config: CanvasConfig,
    state: RwLock<Ledger>,
    bank: Arc<dyn ValueTransfer>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl Canvas {
    /// Create an empty canvas.
    pub fn new(
        config: CanvasConfig,
        bank: Arc<dyn ValueTransfer>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        info!(
            "Canvas created (mint price {}, admin {})",
            config.mint_price, config.admin
        );
        Self {
            config,
            state: RwLock::new(Ledger::default()),
            bank,
            clock,
            events,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CanvasConfig {
        &self.config
    }

    // ==================== Mutations ====================

    /// Claim an unowned cell.
    ///
    /// `payment` must equal the configured mint price and is collected from
    /// `actor` into the treasury.
    pub fn mint(
        &self,
        key: PixelKey,
        color: Color,
        rent_price_per_second: Amount,
        payment: Amount,
        actor: AccountId,
    ) -> CanvasResult<()> {
        if payment != self.config.mint_price {
            return Err(CanvasError::InvalidPayment {
                expected: self.config.mint_price,
                paid: payment,
            });
        }

        let mut state = self.state.write();
        if state.pixels.contains_key(&key) {
            return Err(CanvasError::AlreadyOwned(key));
        }

        payout::settle(
            &*self.bank,
            &[Leg::new(actor, self.config.treasury, payment)],
        )?;

        state.pixels.insert(
            key,
            PixelRecord::minted(color, actor, rent_price_per_second),
        );
        state.balance = state.balance.saturating_add(payment);
        debug!("Minted {} to {actor}", key.unpack());

        self.events.emit(CanvasEvent::PixelChanged { key, color });
        Ok(())
    }

    /// [`mint`](Self::mint) addressed by raw axes.
    pub fn mint_at(
        &self,
        x: u64,
        y: u64,
        color: Color,
        rent_price_per_second: Amount,
        payment: Amount,
        actor: AccountId,
    ) -> CanvasResult<PixelKey> {
        let key = Coord::new(x, y)?.key();
        self.mint(key, color, rent_price_per_second, payment, actor)?;
        Ok(key)
    }

    /// Repaint a cell as its owner or active renter.
    ///
    /// Always writes and emits, even if `color` equals the current color.
    pub fn set_color(&self, key: PixelKey, color: Color, actor: AccountId) -> CanvasResult<()> {
        let mut state = self.state.write();
        let now = self.clock.now();

        let record = state
            .pixels
            .get_mut(&key)
            .ok_or(CanvasError::NotFound(key))?;
        if !record.can_paint(actor, now) {
            return Err(CanvasError::Unauthorized(actor));
        }

        record.color = color;
        debug!("{actor} painted {} {color}", key.unpack());

        self.events.emit(CanvasEvent::PixelChanged { key, color });
        Ok(())
    }

    /// Change the lease price. Owner only; zero takes the cell off the market.
    pub fn set_rent_price(
        &self,
        key: PixelKey,
        price: Amount,
        actor: AccountId,
    ) -> CanvasResult<()> {
        let mut state = self.state.write();

        let record = state
            .pixels
            .get_mut(&key)
            .ok_or(CanvasError::NotFound(key))?;
        if !record.is_owner(actor) {
            return Err(CanvasError::Unauthorized(actor));
        }

        record.rent_price_per_second = price;
        debug!("Rent price of {} set to {price}/s", key.unpack());
        Ok(())
    }

    /// Lease a cell for `duration` seconds.
    ///
    /// `payment` is collected from `actor`; the cost goes to the owner and
    /// any excess is refunded. If any transfer fails, all earlier transfers
    /// are reversed and the lease is not recorded.
    pub fn rent(
        &self,
        key: PixelKey,
        duration: u64,
        actor: AccountId,
        payment: Amount,
    ) -> CanvasResult<()> {
        let mut state = self.state.write();
        let now = self.clock.now();

        let record = state.pixels.get(&key).ok_or(CanvasError::NotFound(key))?;
        if record.is_owner(actor) {
            return Err(CanvasError::OwnerCannotRent(key));
        }
        if !record.is_for_rent() {
            return Err(CanvasError::NotForRent(key));
        }
        if record.is_leased(now) {
            return Err(CanvasError::CurrentlyRented {
                key,
                until: record.rent_end_time.unwrap_or(now),
            });
        }
        if duration == 0 {
            return Err(CanvasError::InvalidDuration(duration));
        }

        // An overflowing cost is more than any payment can cover
        let cost = Amount::from(duration)
            .checked_mul(record.rent_price_per_second)
            .unwrap_or(Amount::MAX);
        if payment < cost {
            return Err(CanvasError::InsufficientPayment {
                required: cost,
                paid: payment,
            });
        }
        let rent_end_time = now
            .checked_add(duration)
            .ok_or(CanvasError::InvalidDuration(duration))?;

        let treasury = self.config.treasury;
        let legs: Legs = smallvec![
            Leg::new(actor, treasury, payment),
            Leg::new(treasury, record.owner, cost),
            Leg::new(treasury, actor, payment - cost),
        ];
        payout::settle(&*self.bank, &legs)?;

        if let Some(record) = state.pixels.get_mut(&key) {
            record.renter = Some(actor);
            record.rent_end_time = Some(rent_end_time);
        }
        debug!(
            "{actor} rented {} until {rent_end_time} for {cost}",
            key.unpack()
        );

        self.events.emit(CanvasEvent::PixelRented {
            key,
            renter: actor,
            rent_end_time,
        });
        Ok(())
    }

    /// Pay out every held mint proceed to the admin. Returns the amount.
    pub fn withdraw(&self, actor: AccountId) -> CanvasResult<Amount> {
        if actor != self.config.admin {
            return Err(CanvasError::Unauthorized(actor));
        }

        let mut state = self.state.write();
        let amount = state.balance;
        if amount == 0 {
            return Err(CanvasError::NoBalance);
        }

        payout::settle(
            &*self.bank,
            &[Leg::new(self.config.treasury, actor, amount)],
        )?;
        state.balance = 0;

        info!("Withdrew {amount} to {actor}");
        Ok(amount)
    }

    // ==================== Reads ====================

    /// Current record of a cell.
    #[must_use]
    pub fn pixel(&self, key: PixelKey) -> Option<PixelRecord> {
        self.state.read().pixels.get(&key).copied()
    }

    #[must_use]
    pub fn owner_of(&self, key: PixelKey) -> Option<AccountId> {
        self.state.read().pixels.get(&key).map(|record| record.owner)
    }

    /// Number of minted cells.
    #[must_use]
    pub fn minted_count(&self) -> usize {
        self.state.read().pixels.len()
    }

    /// Mint proceeds not yet withdrawn.
    #[must_use]
    pub fn balance(&self) -> Amount {
        self.state.read().balance
    }

    /// Every minted cell, in key order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(PixelKey, PixelRecord)> {
        let mut pixels: Vec<_> = self
            .state
            .read()
            .pixels
            .iter()
            .map(|(key, record)| (*key, *record))
            .collect();
        pixels.sort_unstable_by_key(|(key, _)| *key);
        pixels
    }
}

impl ColorLookup for Canvas {
    fn color_of(&self, key: PixelKey) -> Option<Color> {
        self.state.read().color_at(key)
    }

    fn batch_get_colors(&self, keys: &[u128]) -> Vec<Color> {
        batch::resolve(&*self.state.read(), keys)
    }
}

impl core::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Canvas")
            .field("config", &self.config)
            .field("pixels", &state.pixels.len())
            .field("balance", &state.balance)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use canvas_core::{Timestamp, pack};
    use canvas_event::EventQueue;

    use super::*;
    use crate::{Bank, ManualClock, TransferError};

    const PRICE: Amount = 100;
    const RED: Color = Color::from_rgb(255, 0, 0);
    const GREEN: Color = Color::from_rgb(0, 255, 0);

    struct Harness {
        canvas: Canvas,
        bank: Arc<Bank>,
        clock: Arc<ManualClock>,
        events: Arc<EventQueue>,
    }

    fn admin() -> AccountId {
        AccountId::from_u128(0xad)
    }

    fn alice() -> AccountId {
        AccountId::from_u128(1)
    }

    fn bob() -> AccountId {
        AccountId::from_u128(2)
    }

    fn setup() -> Harness {
        let bank = Arc::new(Bank::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let events = Arc::new(EventQueue::new());
        let config = CanvasConfig::default()
            .with_mint_price(PRICE)
            .with_admin(admin());
        let canvas = Canvas::new(config, bank.clone(), clock.clone(), events.clone());

        bank.deposit(alice(), 10_000);
        bank.deposit(bob(), 10_000);

        Harness {
            canvas,
            bank,
            clock,
            events,
        }
    }

    /// Alice owns (5, 5) at 2 per second.
    fn minted() -> (Harness, PixelKey) {
        let h = setup();
        let key = pack(5, 5).unwrap();
        h.canvas.mint(key, RED, 2, PRICE, alice()).unwrap();
        h.events.clear();
        (h, key)
    }

    fn lease_end(h: &Harness, key: PixelKey) -> Option<Timestamp> {
        h.canvas.pixel(key).unwrap().rent_end_time
    }

    #[test]
    fn test_mint_creates_owned_record() {
        let h = setup();
        let key = pack(1, 2).unwrap();
        h.canvas.mint(key, RED, 7, PRICE, alice()).unwrap();

        let record = h.canvas.pixel(key).unwrap();
        assert_eq!(record, PixelRecord::minted(RED, alice(), 7));
        assert_eq!(h.canvas.owner_of(key), Some(alice()));
        assert_eq!(h.canvas.balance(), PRICE);
        assert_eq!(h.bank.balance_of(alice()), 10_000 - PRICE);
        assert_eq!(
            h.events.drain(),
            vec![CanvasEvent::PixelChanged { key, color: RED }]
        );
    }

    #[test]
    fn test_mint_requires_exact_payment() {
        let h = setup();
        let key = pack(1, 2).unwrap();

        for paid in [0, PRICE - 1, PRICE + 1] {
            let err = h.canvas.mint(key, RED, 0, paid, alice()).unwrap_err();
            assert_eq!(
                err,
                CanvasError::InvalidPayment {
                    expected: PRICE,
                    paid
                }
            );
        }
        assert_eq!(h.canvas.minted_count(), 0);
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_second_mint_fails_and_keeps_first() {
        let (h, key) = minted();
        let before = h.canvas.pixel(key);

        let err = h.canvas.mint(key, GREEN, 0, PRICE, bob()).unwrap_err();
        assert_eq!(err, CanvasError::AlreadyOwned(key));
        assert_eq!(h.canvas.pixel(key), before);
        assert_eq!(h.bank.balance_of(bob()), 10_000);
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_mint_without_funds_fails() {
        let h = setup();
        let broke = AccountId::from_u128(99);
        let key = pack(0, 0).unwrap();

        let err = h.canvas.mint(key, RED, 0, PRICE, broke).unwrap_err();
        assert!(matches!(err, CanvasError::TransferFailed(_)));
        assert_eq!(h.canvas.pixel(key), None);
        assert_eq!(h.canvas.balance(), 0);
    }

    #[test]
    fn test_mint_at_out_of_range() {
        let h = setup();
        let err = h
            .canvas
            .mint_at(u64::MAX, 0, RED, 0, PRICE, alice())
            .unwrap_err();
        assert!(matches!(err, CanvasError::OutOfRange(_)));

        let key = h.canvas.mint_at(3, 4, RED, 0, PRICE, alice()).unwrap();
        assert_eq!(key, pack(3, 4).unwrap());
    }

    #[test]
    fn test_set_color_by_owner_always_emits() {
        let (h, key) = minted();

        h.canvas.set_color(key, RED, alice()).unwrap();
        h.canvas.set_color(key, RED, alice()).unwrap();

        // Same color twice still produces two events
        assert_eq!(h.events.len(), 2);
        assert_eq!(h.canvas.color_of(key), Some(RED));
    }

    #[test]
    fn test_set_color_errors() {
        let (h, key) = minted();

        assert_eq!(
            h.canvas.set_color(key, GREEN, bob()),
            Err(CanvasError::Unauthorized(bob()))
        );
        let absent = pack(9, 9).unwrap();
        assert_eq!(
            h.canvas.set_color(absent, GREEN, alice()),
            Err(CanvasError::NotFound(absent))
        );
        assert_eq!(h.canvas.color_of(key), Some(RED));
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_renter_paints_until_lease_end() {
        let (h, key) = minted();
        h.canvas.rent(key, 10, bob(), 20).unwrap();
        let end = lease_end(&h, key).unwrap();
        assert_eq!(end, 1_010);

        h.clock.set(end - 1);
        h.canvas.set_color(key, GREEN, bob()).unwrap();
        assert_eq!(h.canvas.color_of(key), Some(GREEN));

        h.clock.set(end);
        assert_eq!(
            h.canvas.set_color(key, RED, bob()),
            Err(CanvasError::Unauthorized(bob()))
        );
        // The owner keeps painting rights throughout
        h.canvas.set_color(key, RED, alice()).unwrap();
    }

    #[test]
    fn test_set_rent_price_owner_only() {
        let (h, key) = minted();

        assert_eq!(
            h.canvas.set_rent_price(key, 5, bob()),
            Err(CanvasError::Unauthorized(bob()))
        );
        h.canvas.set_rent_price(key, 5, alice()).unwrap();
        assert_eq!(h.canvas.pixel(key).unwrap().rent_price_per_second, 5);

        let absent = pack(0, 9).unwrap();
        assert_eq!(
            h.canvas.set_rent_price(absent, 5, alice()),
            Err(CanvasError::NotFound(absent))
        );
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_rent_pays_owner_and_refunds() {
        let (h, key) = minted();
        let treasury = h.canvas.config().treasury;
        let treasury_before = h.bank.balance_of(treasury);

        h.canvas.rent(key, 10, bob(), 50).unwrap();

        let record = h.canvas.pixel(key).unwrap();
        assert_eq!(record.renter, Some(bob()));
        assert_eq!(record.rent_end_time, Some(1_010));
        assert_eq!(h.bank.balance_of(bob()), 10_000 - 20);
        assert_eq!(h.bank.balance_of(alice()), 10_000 - PRICE + 20);
        assert_eq!(h.bank.balance_of(treasury), treasury_before);
        assert_eq!(
            h.events.drain(),
            vec![CanvasEvent::PixelRented {
                key,
                renter: bob(),
                rent_end_time: 1_010
            }]
        );
    }

    #[test]
    fn test_owner_cannot_rent() {
        let (h, key) = minted();
        let before = h.canvas.pixel(key);

        assert_eq!(
            h.canvas.rent(key, 10, alice(), 1_000),
            Err(CanvasError::OwnerCannotRent(key))
        );
        assert_eq!(h.canvas.pixel(key), before);
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_rent_preconditions() {
        let (h, key) = minted();

        let absent = pack(7, 7).unwrap();
        assert_eq!(
            h.canvas.rent(absent, 10, bob(), 100),
            Err(CanvasError::NotFound(absent))
        );
        assert_eq!(
            h.canvas.rent(key, 0, bob(), 100),
            Err(CanvasError::InvalidDuration(0))
        );
        assert_eq!(
            h.canvas.rent(key, 10, bob(), 19),
            Err(CanvasError::InsufficientPayment {
                required: 20,
                paid: 19
            })
        );

        h.canvas.set_rent_price(key, 0, alice()).unwrap();
        assert_eq!(
            h.canvas.rent(key, 10, bob(), 100),
            Err(CanvasError::NotForRent(key))
        );
        assert_eq!(lease_end(&h, key), None);
    }

    #[test]
    fn test_rent_blocked_through_end_second() {
        let (h, key) = minted();
        let carol = AccountId::from_u128(3);
        h.bank.deposit(carol, 1_000);

        h.canvas.rent(key, 10, bob(), 20).unwrap();

        h.clock.set(1_010);
        assert_eq!(
            h.canvas.rent(key, 10, carol, 20),
            Err(CanvasError::CurrentlyRented {
                key,
                until: 1_010
            })
        );

        h.clock.set(1_011);
        h.canvas.rent(key, 10, carol, 20).unwrap();
        assert_eq!(h.canvas.pixel(key).unwrap().renter, Some(carol));
    }

    #[test]
    fn test_rent_cost_overflow_is_insufficient() {
        let (h, key) = minted();
        h.canvas.set_rent_price(key, Amount::MAX, alice()).unwrap();

        assert_eq!(
            h.canvas.rent(key, 2, bob(), 10),
            Err(CanvasError::InsufficientPayment {
                required: Amount::MAX,
                paid: 10
            })
        );
    }

    #[test]
    fn test_rent_end_overflow_is_invalid_duration() {
        let (h, key) = minted();
        h.canvas.set_rent_price(key, 1, alice()).unwrap();
        h.clock.set(u64::MAX - 1);
        h.bank.deposit(bob(), u128::from(u64::MAX));

        assert_eq!(
            h.canvas.rent(key, 5, bob(), 5),
            Err(CanvasError::InvalidDuration(5))
        );
    }

    #[test]
    fn test_failed_owner_payment_rolls_back() {
        let (h, key) = minted();
        h.bank.freeze(alice());

        let err = h.canvas.rent(key, 10, bob(), 50).unwrap_err();
        assert_eq!(
            err,
            CanvasError::TransferFailed(TransferError::Frozen(alice()))
        );

        let record = h.canvas.pixel(key).unwrap();
        assert_eq!(record.renter, None);
        assert_eq!(record.rent_end_time, None);
        assert_eq!(h.bank.balance_of(bob()), 10_000);
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_failed_refund_rolls_back() {
        let (h, key) = minted();
        let treasury = h.canvas.config().treasury;
        let treasury_before = h.bank.balance_of(treasury);

        // Bob can pay in, but the refund leg back to him fails after
        // the owner was already paid
        struct RefundBlocker {
            inner: Arc<Bank>,
            renter: AccountId,
            treasury: AccountId,
            refund: Amount,
        }
        impl ValueTransfer for RefundBlocker {
            fn transfer(
                &self,
                from: AccountId,
                to: AccountId,
                amount: Amount,
            ) -> Result<(), TransferError> {
                if from == self.treasury && to == self.renter && amount == self.refund {
                    return Err(TransferError::Frozen(to));
                }
                self.inner.transfer(from, to, amount)
            }
        }

        let canvas = Canvas::new(
            *h.canvas.config(),
            Arc::new(RefundBlocker {
                inner: h.bank.clone(),
                renter: bob(),
                treasury,
                refund: 30,
            }),
            h.clock.clone(),
            h.events.clone(),
        );
        h.bank.deposit(alice(), PRICE);
        canvas.mint(key, RED, 2, PRICE, alice()).unwrap();
        h.events.clear();
        let alice_before = h.bank.balance_of(alice());

        let err = canvas.rent(key, 10, bob(), 50).unwrap_err();
        assert!(matches!(err, CanvasError::TransferFailed(_)));
        assert_eq!(canvas.pixel(key).unwrap().renter, None);
        assert_eq!(h.bank.balance_of(alice()), alice_before);
        assert_eq!(h.bank.balance_of(bob()), 10_000);
        assert_eq!(h.bank.balance_of(treasury), treasury_before + PRICE);
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_withdraw() {
        let (h, _) = minted();
        h.canvas.mint(pack(0, 0).unwrap(), RED, 0, PRICE, bob()).unwrap();

        assert_eq!(
            h.canvas.withdraw(alice()),
            Err(CanvasError::Unauthorized(alice()))
        );
        assert_eq!(h.canvas.withdraw(admin()), Ok(2 * PRICE));
        assert_eq!(h.bank.balance_of(admin()), 2 * PRICE);
        assert_eq!(h.canvas.balance(), 0);
        assert_eq!(h.canvas.withdraw(admin()), Err(CanvasError::NoBalance));
    }

    #[test]
    fn test_failed_withdraw_keeps_balance() {
        let (h, _) = minted();
        h.bank.freeze(admin());

        assert!(matches!(
            h.canvas.withdraw(admin()),
            Err(CanvasError::TransferFailed(_))
        ));
        assert_eq!(h.canvas.balance(), PRICE);
    }

    #[test]
    fn test_default_read_on_empty_store() {
        let h = setup();
        let key = pack(999, 999).unwrap();
        assert_eq!(h.canvas.batch_get_colors(&[key.raw()]), vec![Color::DEFAULT]);
        assert_eq!(h.canvas.color_of(key), None);
    }

    #[test]
    fn test_region_colors() {
        let h = setup();
        h.canvas.mint(pack(0, 1).unwrap(), RED, 0, PRICE, alice()).unwrap();
        h.canvas.mint(pack(1, 0).unwrap(), GREEN, 0, PRICE, alice()).unwrap();

        assert_eq!(
            h.canvas.region_colors(0, 1, 0, 1),
            Ok(vec![Color::DEFAULT, RED, GREEN, Color::DEFAULT])
        );
        assert_eq!(h.canvas.region_colors(1, 0, 0, 1), Ok(Vec::new()));
        assert!(matches!(
            h.canvas.region_colors(0, canvas_core::AXIS_MAX, 0, canvas_core::AXIS_MAX),
            Err(CanvasError::RegionTooLarge { .. })
        ));
    }

    #[test]
    fn test_snapshot_is_key_ordered() {
        let h = setup();
        for (x, y) in [(2, 0), (0, 5), (1, 1)] {
            h.canvas.mint_at(x, y, RED, 0, PRICE, alice()).unwrap();
        }
        let keys: Vec<_> = h.canvas.snapshot().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                pack(0, 5).unwrap(),
                pack(1, 1).unwrap(),
                pack(2, 0).unwrap()
            ]
        );
    }
}
