use chrono::Utc;
use parking_lot::RwLock;
use tracing::info;

use rentledger_bookings::{Booking, BookingLedger, DateRange};
use rentledger_core::{AccountId, BookingId, LedgerResult, PropertyId};
use rentledger_escrow::{EscrowEngine, FundsTransfer, InMemoryPayouts};
use rentledger_events::{
    EventBus, FundsWithdrawn, LedgerEvent, PropertyBooked, PropertyDeactivated, PropertyListed,
    Subscription,
};
use rentledger_properties::{Property, PropertyRegistry};

#[derive(Debug)]
struct Inner<T> {
    properties: PropertyRegistry,
    bookings: BookingLedger,
    escrow: EscrowEngine<T>,
}

/// The rental ledger behind one mutual-exclusion boundary.
///
/// Mutations (`list_property`, `deactivate_property`, `book_property`,
/// `withdraw`) take the write lock for their whole read-then-write
/// sequence, so id allocation, the conflict check, and the record insert
/// are atomic as a unit. Accessors take the read lock and clone records
/// out, giving callers a consistent snapshot.
///
/// Events are published after the lock is released; consumers observe the
/// ledger, they never participate in its transactions.
pub struct RentalService<T> {
    inner: RwLock<Inner<T>>,
    bus: EventBus,
}

impl RentalService<InMemoryPayouts> {
    /// Service with the in-memory payout book, for tests/dev.
    pub fn in_memory() -> Self {
        Self::new(InMemoryPayouts::new())
    }
}

impl Default for RentalService<InMemoryPayouts> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<T: FundsTransfer> RentalService<T> {
    pub fn new(payouts: T) -> Self {
        Self {
            inner: RwLock::new(Inner {
                properties: PropertyRegistry::new(),
                bookings: BookingLedger::new(),
                escrow: EscrowEngine::new(payouts),
            }),
            bus: EventBus::new(),
        }
    }

    /// List a property for rent. Returns the freshly assigned id.
    pub fn list_property(
        &self,
        owner: AccountId,
        name: impl Into<String>,
        description: impl Into<String>,
        price_per_night: u64,
    ) -> PropertyId {
        let property_id =
            self.inner
                .write()
                .properties
                .list(owner, name, description, price_per_night);

        info!(%property_id, %owner, price_per_night, "property listed");
        self.bus.publish(LedgerEvent::PropertyListed(PropertyListed {
            property_id,
            owner,
            price_per_night,
            occurred_at: Utc::now(),
        }));

        property_id
    }

    /// Stop accepting new bookings for a property. Owner-only, idempotent.
    pub fn deactivate_property(
        &self,
        caller: AccountId,
        property_id: PropertyId,
    ) -> LedgerResult<()> {
        self.inner.write().properties.deactivate(caller, property_id)?;

        info!(%property_id, "property deactivated");
        self.bus
            .publish(LedgerEvent::PropertyDeactivated(PropertyDeactivated {
                property_id,
                occurred_at: Utc::now(),
            }));

        Ok(())
    }

    /// Book `property_id` for `[checkin, checkout)`, paying `amount_sent`.
    ///
    /// The payment must equal `price_per_night * nights` exactly;
    /// overpayment is rejected, not banked.
    pub fn book_property(
        &self,
        caller: AccountId,
        property_id: PropertyId,
        checkin: u32,
        checkout: u32,
        amount_sent: u64,
    ) -> LedgerResult<BookingId> {
        let booking_id = {
            let mut guard = self.inner.write();
            let inner = &mut *guard;

            let property = inner.properties.get(property_id)?;
            property.ensure_active()?;
            let range = DateRange::new(checkin, checkout)?;

            inner.bookings.book(caller, property, range, amount_sent)?
        };

        info!(%booking_id, %property_id, checkin, checkout, amount_paid = amount_sent, "property booked");
        self.bus.publish(LedgerEvent::PropertyBooked(PropertyBooked {
            booking_id,
            property_id,
            renter: caller,
            checkin,
            checkout,
            // Exact payment is enforced above, so sent == paid.
            amount_paid: amount_sent,
            occurred_at: Utc::now(),
        }));

        Ok(booking_id)
    }

    /// Pay out the funds of up to `count` unsettled bookings of
    /// `property_id` to its owner. Returns the amount transferred.
    pub fn withdraw(
        &self,
        caller: AccountId,
        property_id: PropertyId,
        count: usize,
    ) -> LedgerResult<u64> {
        let withdrawal = {
            let mut guard = self.inner.write();
            let inner = &mut *guard;
            inner
                .escrow
                .withdraw(&inner.properties, &mut inner.bookings, caller, property_id, count)?
        };

        info!(
            %property_id,
            amount = withdrawal.amount,
            settled = withdrawal.settled.len(),
            "funds withdrawn"
        );
        self.bus.publish(LedgerEvent::FundsWithdrawn(FundsWithdrawn {
            property_id,
            // Withdrawal succeeded, so the caller is the owner.
            owner: caller,
            amount: withdrawal.amount,
            bookings_settled: withdrawal.settled,
            occurred_at: Utc::now(),
        }));

        Ok(withdrawal.amount)
    }

    /// Snapshot of a property record.
    pub fn property(&self, property_id: PropertyId) -> LedgerResult<Property> {
        self.inner.read().properties.get(property_id).cloned()
    }

    /// Snapshot of a booking record.
    pub fn booking(&self, booking_id: BookingId) -> LedgerResult<Booking> {
        self.inner.read().bookings.get(booking_id).cloned()
    }

    pub fn property_count(&self) -> u64 {
        self.inner.read().properties.count()
    }

    pub fn booking_count(&self) -> u64 {
        self.inner.read().bookings.count()
    }

    /// Amount currently withdrawable by the owner of `property_id`.
    pub fn escrow_balance(&self, property_id: PropertyId) -> LedgerResult<u128> {
        let guard = self.inner.read();
        guard.properties.get(property_id)?;
        Ok(guard.bookings.escrow_balance(property_id))
    }

    /// Inspect the payout collaborator under the read lock.
    pub fn with_payouts<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(self.inner.read().escrow.payouts())
    }

    /// Subscribe to the ledger's event stream.
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }
}
