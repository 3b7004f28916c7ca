use serde::{Deserialize, Serialize};

use rentledger_core::{LedgerError, LedgerResult, ValueObject};

/// Half-open range of day offsets: checkin inclusive, checkout exclusive.
///
/// A guest checking out on day 10 frees the property for a checkin on
/// day 10; the two bookings do not overlap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    checkin: u32,
    checkout: u32,
}

impl DateRange {
    /// Build a range, enforcing `checkout > checkin`.
    pub fn new(checkin: u32, checkout: u32) -> LedgerResult<Self> {
        if checkout <= checkin {
            return Err(LedgerError::InvalidDateRange { checkin, checkout });
        }
        Ok(Self { checkin, checkout })
    }

    pub fn checkin(&self) -> u32 {
        self.checkin
    }

    pub fn checkout(&self) -> u32 {
        self.checkout
    }

    /// Number of nights covered. Always at least 1.
    pub fn nights(&self) -> u32 {
        self.checkout - self.checkin
    }

    /// `[a, b)` overlaps `[c, d)` iff `a < d && c < b`.
    pub fn overlaps(&self, other: DateRange) -> bool {
        self.checkin < other.checkout && other.checkin < self.checkout
    }
}

impl ValueObject for DateRange {}
