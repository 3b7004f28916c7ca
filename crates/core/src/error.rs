//! Domain error model.

use thiserror::Error;

use crate::id::{AccountId, BookingId, PropertyId};

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every variant is terminal for the triggering call and carries the
/// offending identifiers; a failed operation leaves ledger state unchanged
/// (the one documented exception is `TransferFailed`, see the escrow
/// engine).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No property is registered under this id.
    #[error("property {property_id} not found")]
    PropertyNotFound { property_id: PropertyId },

    /// No booking is recorded under this id.
    #[error("booking {booking_id} not found")]
    BookingNotFound { booking_id: BookingId },

    /// The caller is not the owner of the property it tried to mutate.
    #[error("caller {caller} is not the owner of property {property_id}")]
    NotOwner {
        property_id: PropertyId,
        caller: AccountId,
    },

    /// The property has been deactivated and accepts no new bookings.
    #[error("property {property_id} is not active")]
    PropertyNotActive { property_id: PropertyId },

    /// Checkout must be strictly after checkin.
    #[error("invalid date range: checkout {checkout} is not after checkin {checkin}")]
    InvalidDateRange { checkin: u32, checkout: u32 },

    /// The payment sent does not cover the booking price.
    #[error("insufficient payment: required {required}, sent {sent}")]
    InsufficientPayment { required: u64, sent: u64 },

    /// The payment sent exceeds the booking price; overpayment is rejected
    /// rather than tracked as credit.
    #[error("excess payment rejected: required {required}, sent {sent}")]
    ExcessPayment { required: u64, sent: u64 },

    /// The requested dates overlap an existing booking on the property.
    #[error("dates conflict with booking {conflicting_booking} on property {property_id}")]
    DateRangeConflict {
        property_id: PropertyId,
        conflicting_booking: BookingId,
    },

    /// The property has no unsettled funds.
    #[error("nothing to withdraw for property {property_id}")]
    NothingToWithdraw { property_id: PropertyId },

    /// A monetary computation exceeded the representable range.
    #[error("amount arithmetic overflowed")]
    AmountOverflow,

    /// The external payout failed after the bookings were settled. The
    /// bookings are NOT re-marked unsettled; callers needing exactly-once
    /// payout must reconcile on top.
    #[error("transfer of {amount} for property {property_id} failed: {reason}")]
    TransferFailed {
        property_id: PropertyId,
        amount: u64,
        reason: String,
    },
}
