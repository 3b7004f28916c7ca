use std::collections::HashMap;

use thiserror::Error;

use rentledger_core::AccountId;

/// Failure reported by the external payout collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct TransferError {
    pub reason: String,
}

impl TransferError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Boundary to whatever actually moves money (bank rails, chain, ...).
///
/// The escrow engine calls this exactly once per successful withdrawal,
/// after the source bookings have been marked settled.
pub trait FundsTransfer {
    fn transfer(&mut self, to: AccountId, amount: u64) -> Result<(), TransferError>;
}

/// In-memory payout book for tests/dev: credits amounts to per-account
/// balances and never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryPayouts {
    balances: HashMap<AccountId, u128>,
}

impl InMemoryPayouts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total ever transferred to `account`.
    pub fn balance_of(&self, account: AccountId) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }
}

impl FundsTransfer for InMemoryPayouts {
    fn transfer(&mut self, to: AccountId, amount: u64) -> Result<(), TransferError> {
        *self.balances.entry(to).or_insert(0) += u128::from(amount);
        Ok(())
    }
}
