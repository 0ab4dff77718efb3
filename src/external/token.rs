//! Stake Token Interface
//!
//! The engine never holds balances itself. Stakes are pulled from players
//! into the engine's custody address and payouts are pushed back out through
//! a [`StakeToken`]. Implementations must apply each transfer atomically:
//! either the full amount moves or nothing does.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::core::amount::Amount;
use crate::core::ids::Address;

/// Transfer failures reported by a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Sender does not hold enough.
    #[error("insufficient balance: {owner} holds {available}, needs {needed}")]
    InsufficientBalance {
        /// Account being debited.
        owner: Address,
        /// Amount requested.
        needed: Amount,
        /// Amount held.
        available: Amount,
    },

    /// Spender has not been approved for enough.
    #[error("insufficient allowance: {owner} has not approved {spender}")]
    InsufficientAllowance {
        /// Account being debited.
        owner: Address,
        /// Account pulling the funds.
        spender: Address,
    },

    /// Account is not allowed to send or receive.
    #[error("account {0} is blocked")]
    Blocked(Address),

    /// Recipient balance would overflow.
    #[error("balance overflow")]
    Overflow,
}

/// Transferable-balance token used for stake custody and payout.
pub trait StakeToken {
    /// Balance held by `owner`.
    fn balance_of(&self, owner: &Address) -> Amount;

    /// Amount `spender` may still pull from `owner`.
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Move `amount` from `from` to `to`, authorized by `from` itself.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to`, authorized by a prior approval of
    /// `spender`. Consumes allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;
}

// =============================================================================
// IN-MEMORY LEDGER
// =============================================================================

/// `BTreeMap`-backed token ledger for embedding the engine without an
/// external token.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToken {
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<(Address, Address), Amount>,
    blocked: BTreeSet<Address>,
}

impl InMemoryToken {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `to` out of thin air.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balances.entry(*to).or_default();
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    /// Set the allowance of `spender` over `owner`'s funds.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.insert((*owner, *spender), amount);
    }

    /// Refuse every transfer touching `account`.
    pub fn block(&mut self, account: &Address) {
        self.blocked.insert(*account);
    }

    /// Lift a block placed with [`InMemoryToken::block`].
    pub fn unblock(&mut self, account: &Address) {
        self.blocked.remove(account);
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Amount {
        self.balances.values().fold(Amount::ZERO, |acc, b| acc + *b)
    }

    fn move_funds(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        for account in [from, to] {
            if self.blocked.contains(account) {
                return Err(TokenError::Blocked(*account));
            }
        }

        let available = self.balance_of(from);
        let remaining = available.checked_sub(amount).ok_or(TokenError::InsufficientBalance {
            owner: *from,
            needed: amount,
            available,
        })?;

        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.balances.insert(*from, remaining);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl StakeToken for InMemoryToken {
    fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or_default()
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        self.move_funds(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(from, spender);
        let left = allowed.checked_sub(amount).ok_or(TokenError::InsufficientAllowance {
            owner: *from,
            spender: *spender,
        })?;

        self.move_funds(from, to, amount)?;
        self.allowances.insert((*from, *spender), left);
        Ok(())
    }
}
