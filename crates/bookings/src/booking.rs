use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use rentledger_core::{AccountId, BookingId, Entity, LedgerError, LedgerResult, PropertyId};
use rentledger_properties::Property;

use crate::date_range::DateRange;

/// A paid reservation of a date range on one property.
///
/// Bookings are never destroyed. The only transition is the one-way
/// `settled` flip performed by the withdrawal path once the owner has been
/// paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    id: BookingId,
    property_id: PropertyId,
    renter: AccountId,
    range: DateRange,
    /// Exactly `price_per_night * nights` at booking time.
    amount_paid: u64,
    settled: bool,
}

impl Booking {
    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    pub fn renter(&self) -> AccountId {
        self.renter
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn checkin(&self) -> u32 {
        self.range.checkin()
    }

    pub fn checkout(&self) -> u32 {
        self.range.checkout()
    }

    pub fn amount_paid(&self) -> u64 {
        self.amount_paid
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }
}

impl Entity for Booking {
    type Id = BookingId;

    fn id(&self) -> &BookingId {
        &self.id
    }
}

/// Ledger of bookings across all properties.
///
/// Owns the booking id counter (ledger-wide, dense, starting at 1) and the
/// per-property index used for the overlap scan. Escrow balances are
/// derived from unsettled bookings rather than stored, so conservation
/// cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLedger {
    bookings: BTreeMap<BookingId, Booking>,
    /// Secondary index: property id -> booking ids ascending.
    by_property: HashMap<PropertyId, Vec<BookingId>>,
    next_id: u64,
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self {
            bookings: BTreeMap::new(),
            by_property: HashMap::new(),
            next_id: 1,
        }
    }
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a booking of `property` over `range`, paid with `amount_sent`.
    ///
    /// The caller (the façade) resolves the property and enforces the
    /// active flag first; this method owns the payment check and the
    /// no-overlap invariant. Nothing is written until every check passes.
    ///
    /// Overpayment is rejected outright rather than kept as credit: the
    /// renter keeps custody of the excess instead of the ledger.
    pub fn book(
        &mut self,
        renter: AccountId,
        property: &Property,
        range: DateRange,
        amount_sent: u64,
    ) -> LedgerResult<BookingId> {
        let property_id = *property.id();

        let required = property
            .price_per_night()
            .checked_mul(u64::from(range.nights()))
            .ok_or(LedgerError::AmountOverflow)?;

        if amount_sent < required {
            return Err(LedgerError::InsufficientPayment {
                required,
                sent: amount_sent,
            });
        }
        if amount_sent > required {
            return Err(LedgerError::ExcessPayment {
                required,
                sent: amount_sent,
            });
        }

        if let Some(conflicting) = self.conflicting_booking(property_id, range) {
            return Err(LedgerError::DateRangeConflict {
                property_id,
                conflicting_booking: conflicting,
            });
        }

        let id = BookingId::new(self.next_id);
        self.next_id += 1;

        self.bookings.insert(
            id,
            Booking {
                id,
                property_id,
                renter,
                range,
                amount_paid: required,
                settled: false,
            },
        );
        self.by_property.entry(property_id).or_default().push(id);

        Ok(id)
    }

    /// First existing booking of the property whose range overlaps `range`.
    ///
    /// Linear in the bookings of that one property; the per-property index
    /// keeps unrelated properties out of the scan.
    fn conflicting_booking(&self, property_id: PropertyId, range: DateRange) -> Option<BookingId> {
        let ids = self.by_property.get(&property_id)?;
        ids.iter()
            .copied()
            .find(|id| {
                self.bookings
                    .get(id)
                    .is_some_and(|booking| booking.range.overlaps(range))
            })
    }

    pub fn get(&self, booking_id: BookingId) -> LedgerResult<&Booking> {
        self.bookings
            .get(&booking_id)
            .ok_or(LedgerError::BookingNotFound { booking_id })
    }

    /// Number of bookings ever recorded.
    pub fn count(&self) -> u64 {
        self.bookings.len() as u64
    }

    /// Unsettled bookings of a property, ascending booking id.
    ///
    /// The index vector is appended to in allocation order, so it is already
    /// ascending.
    pub fn unsettled(&self, property_id: PropertyId) -> impl Iterator<Item = &Booking> + '_ {
        self.by_property
            .get(&property_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.bookings.get(id))
            .filter(|booking| !booking.settled)
    }

    /// Amount currently withdrawable by the property's owner: the sum of
    /// `amount_paid` over its unsettled bookings.
    pub fn escrow_balance(&self, property_id: PropertyId) -> u128 {
        self.unsettled(property_id)
            .map(|booking| u128::from(booking.amount_paid))
            .sum()
    }

    /// Flip a booking to settled. One-way; flipping an already settled
    /// booking is a no-op. Reserved for the withdrawal path.
    pub fn settle(&mut self, booking_id: BookingId) -> LedgerResult<()> {
        let booking = self
            .bookings
            .get_mut(&booking_id)
            .ok_or(LedgerError::BookingNotFound { booking_id })?;
        booking.settled = true;
        Ok(())
    }
}
