//! External capabilities consumed by the stores: value transfer and time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use canvas_core::{AccountId, Amount, Timestamp};
use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use thiserror::Error;

/// Why a transfer was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The source account cannot cover the amount.
    #[error("{account} holds {available}, needs {amount}")]
    InsufficientFunds {
        account: AccountId,
        available: Amount,
        amount: Amount,
    },

    /// The account refuses all movement of funds.
    #[error("account {0} is frozen")]
    Frozen(AccountId),

    /// Destination balance would overflow.
    #[error("balance of {0} would overflow")]
    Overflow(AccountId),
}

/// Moves funds between two identities. A transfer either fully succeeds or
/// has no effect.
pub trait ValueTransfer: Send + Sync + 'static {
    fn transfer(&self, from: AccountId, to: AccountId, amount: Amount)
    -> Result<(), TransferError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Timestamp;
}

/// Wall clock in UNIX seconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub const fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `secs` and return the new time.
    ///
    /// Saturates at `Timestamp::MAX`; the clock never moves backwards.
    pub fn advance(&self, secs: u64) -> Timestamp {
        let previous = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(secs))
            })
            .unwrap_or_else(|now| now);
        previous.saturating_add(secs)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct BankState {
    balances: HashMap<AccountId, Amount>,
    frozen: HashSet<AccountId>,
}

/// In-memory account book implementing [`ValueTransfer`].
///
/// Accounts can be frozen to make every transfer touching them fail.
#[derive(Default)]
pub struct Bank {
    state: Mutex<BankState>,
}

impl Bank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit funds from outside the system.
    pub fn deposit(&self, account: AccountId, amount: Amount) {
        let mut state = self.state.lock();
        let balance = state.balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    #[must_use]
    pub fn balance_of(&self, account: AccountId) -> Amount {
        self.state
            .lock()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub fn freeze(&self, account: AccountId) {
        self.state.lock().frozen.insert(account);
    }

    pub fn unfreeze(&self, account: AccountId) {
        self.state.lock().frozen.remove(&account);
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.state
            .lock()
            .balances
            .values()
            .fold(0, |acc, b| acc.saturating_add(*b))
    }
}

impl ValueTransfer for Bank {
    fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut state = self.state.lock();

        for account in [from, to] {
            if state.frozen.contains(&account) {
                return Err(TransferError::Frozen(account));
            }
        }

        let available = state.balances.get(&from).copied().unwrap_or_default();
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                account: from,
                available,
                amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = state.balances.get(&to).copied().unwrap_or_default();
        let credited = credited
            .checked_add(amount)
            .ok_or(TransferError::Overflow(to))?;

        state.balances.insert(from, available - amount);
        state.balances.insert(to, credited);
        Ok(())
    }
}

impl core::fmt::Debug for Bank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Bank")
            .field("accounts", &state.balances.len())
            .field("frozen", &state.frozen.len())
            .finish()
    }
}
