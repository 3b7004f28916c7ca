//! Escrow module (withdrawable-amount computation and payout).
//!
//! The external fund-transfer step is behind the [`FundsTransfer`] trait;
//! everything else is deterministic ledger accounting.

pub mod engine;
pub mod transfer;

pub use engine::{EscrowEngine, Withdrawal};
pub use transfer::{FundsTransfer, InMemoryPayouts, TransferError};
