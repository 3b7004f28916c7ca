use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rentledger_core::{AccountId, BookingId, PropertyId};

/// Event: a property was listed for rent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyListed {
    pub property_id: PropertyId,
    pub owner: AccountId,
    pub price_per_night: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a property stopped accepting new bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDeactivated {
    pub property_id: PropertyId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a date range was booked and paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBooked {
    pub booking_id: BookingId,
    pub property_id: PropertyId,
    pub renter: AccountId,
    pub checkin: u32,
    pub checkout: u32,
    pub amount_paid: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: escrowed funds were paid out to a property owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsWithdrawn {
    pub property_id: PropertyId,
    pub owner: AccountId,
    pub amount: u64,
    pub bookings_settled: Vec<BookingId>,
    pub occurred_at: DateTime<Utc>,
}

/// A fact recorded after a successful ledger mutation.
///
/// Events are immutable, versioned by their type string, and delivered
/// best-effort: consumers observe the ledger, they do not participate in
/// its transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    PropertyListed(PropertyListed),
    PropertyDeactivated(PropertyDeactivated),
    PropertyBooked(PropertyBooked),
    FundsWithdrawn(FundsWithdrawn),
}

impl LedgerEvent {
    /// Stable event name/type identifier.
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::PropertyListed(_) => "property.listed",
            LedgerEvent::PropertyDeactivated(_) => "property.deactivated",
            LedgerEvent::PropertyBooked(_) => "property.booked",
            LedgerEvent::FundsWithdrawn(_) => "escrow.funds_withdrawn",
        }
    }

    /// When the event occurred (business time).
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::PropertyListed(e) => e.occurred_at,
            LedgerEvent::PropertyDeactivated(e) => e.occurred_at,
            LedgerEvent::PropertyBooked(e) => e.occurred_at,
            LedgerEvent::FundsWithdrawn(e) => e.occurred_at,
        }
    }
}
