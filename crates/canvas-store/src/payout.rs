//! All-or-nothing settlement of multi-leg payments.

use canvas_core::{AccountId, Amount};
use smallvec::SmallVec;
use tracing::{error, warn};

use crate::{TransferError, ValueTransfer};

/// One movement of funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Leg {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
}

impl Leg {
    pub const fn new(from: AccountId, to: AccountId, amount: Amount) -> Self {
        Self { from, to, amount }
    }
}

/// Ordered legs settled as one unit. At most three legs are ever needed
/// (collect, pay owner, refund).
pub(crate) type Legs = SmallVec<[Leg; 3]>;

/// Execute `legs` in order.
///
/// If a leg fails, every leg that already went through is reversed, newest
/// first, and the original failure is returned. Zero-amount legs are skipped.
pub(crate) fn settle(bank: &dyn ValueTransfer, legs: &[Leg]) -> Result<(), TransferError> {
    for (i, leg) in legs.iter().enumerate() {
        if leg.amount == 0 {
            continue;
        }
        if let Err(e) = bank.transfer(leg.from, leg.to, leg.amount) {
            warn!(
                "Transfer of {} from {} to {} failed: {e}",
                leg.amount, leg.from, leg.to
            );
            unwind(bank, &legs[..i]);
            return Err(e);
        }
    }
    Ok(())
}

fn unwind(bank: &dyn ValueTransfer, done: &[Leg]) {
    for leg in done.iter().rev().filter(|leg| leg.amount > 0) {
        if let Err(e) = bank.transfer(leg.to, leg.from, leg.amount) {
            error!(
                "Failed to reverse transfer of {} from {} to {}: {e}",
                leg.amount, leg.from, leg.to
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bank;

    fn id(n: u128) -> AccountId {
        AccountId::from_u128(n)
    }

    #[test]
    fn test_all_legs_applied() {
        let bank = Bank::new();
        bank.deposit(id(1), 10);

        let legs = [Leg::new(id(1), id(2), 10), Leg::new(id(2), id(3), 4)];
        settle(&bank, &legs).unwrap();

        assert_eq!(bank.balance_of(id(1)), 0);
        assert_eq!(bank.balance_of(id(2)), 6);
        assert_eq!(bank.balance_of(id(3)), 4);
    }

    #[test]
    fn test_failed_leg_reverses_earlier_legs() {
        let bank = Bank::new();
        bank.deposit(id(1), 10);
        bank.freeze(id(3));

        let legs = [Leg::new(id(1), id(2), 10), Leg::new(id(2), id(3), 4)];
        let err = settle(&bank, &legs).unwrap_err();

        assert_eq!(err, TransferError::Frozen(id(3)));
        assert_eq!(bank.balance_of(id(1)), 10);
        assert_eq!(bank.balance_of(id(2)), 0);
    }

    #[test]
    fn test_zero_legs_skipped() {
        let bank = Bank::new();
        bank.freeze(id(9));

        // A frozen account is never touched by an empty leg
        settle(&bank, &[Leg::new(id(1), id(9), 0)]).unwrap();
    }
}
