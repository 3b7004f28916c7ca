use rentledger_bookings::BookingLedger;
use rentledger_core::{AccountId, BookingId, Entity, LedgerError, LedgerResult, PropertyId};
use rentledger_properties::PropertyRegistry;

use crate::transfer::FundsTransfer;

/// Outcome of a successful withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Amount moved to the property owner.
    pub amount: u64,
    /// Bookings settled by this withdrawal, ascending id.
    pub settled: Vec<BookingId>,
}

/// Moves escrowed funds to property owners.
///
/// Owns the payout collaborator; all ledger reads and writes go through the
/// registry/ledger passed in by the façade, under the façade's lock.
#[derive(Debug)]
pub struct EscrowEngine<T> {
    payouts: T,
}

impl<T: FundsTransfer> EscrowEngine<T> {
    pub fn new(payouts: T) -> Self {
        Self { payouts }
    }

    pub fn payouts(&self) -> &T {
        &self.payouts
    }

    /// Withdraw the funds of up to `count` unsettled bookings (ascending
    /// id) of `property_id` to its owner.
    ///
    /// Fewer than `count` unsettled bookings is not an error: the batch
    /// size caps per-call work, it is not an exact demand. A zero total
    /// fails with `NothingToWithdraw`.
    ///
    /// The selected bookings are marked settled BEFORE the transfer is
    /// attempted, so a failed or retried transfer can never pay twice. The
    /// price of that ordering: on `TransferFailed` the bookings stay
    /// settled and the owed amount must be reconciled outside the ledger.
    pub fn withdraw(
        &mut self,
        properties: &PropertyRegistry,
        bookings: &mut BookingLedger,
        caller: AccountId,
        property_id: PropertyId,
        count: usize,
    ) -> LedgerResult<Withdrawal> {
        let property = properties.get(property_id)?;
        property.ensure_owner(caller)?;

        let selected: Vec<(BookingId, u64)> = bookings
            .unsettled(property_id)
            .take(count)
            .map(|booking| (*booking.id(), booking.amount_paid()))
            .collect();

        let total: u128 = selected.iter().map(|(_, amount)| u128::from(*amount)).sum();
        if total == 0 {
            return Err(LedgerError::NothingToWithdraw { property_id });
        }
        let amount = u64::try_from(total).map_err(|_| LedgerError::AmountOverflow)?;

        let settled: Vec<BookingId> = selected.iter().map(|(id, _)| *id).collect();
        for id in &settled {
            bookings.settle(*id)?;
        }

        self.payouts
            .transfer(property.owner(), amount)
            .map_err(|err| LedgerError::TransferFailed {
                property_id,
                amount,
                reason: err.reason,
            })?;

        Ok(Withdrawal { amount, settled })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rentledger_bookings::DateRange;
    use rentledger_core::AccountId;

    use crate::transfer::{InMemoryPayouts, TransferError};

    /// Payout sink that refuses everything, for the failure path.
    #[derive(Debug, Default)]
    struct RejectingPayouts;

    impl FundsTransfer for RejectingPayouts {
        fn transfer(&mut self, _to: AccountId, _amount: u64) -> Result<(), TransferError> {
            Err(TransferError::new("recipient cannot accept funds"))
        }
    }

    fn range(checkin: u32, checkout: u32) -> DateRange {
        DateRange::new(checkin, checkout).unwrap()
    }

    struct Fixture {
        properties: PropertyRegistry,
        bookings: BookingLedger,
        owner: AccountId,
        property_id: PropertyId,
    }

    /// One property at 100/night with three back-to-back two-night
    /// bookings: 200 in escrow per booking.
    fn fixture() -> Fixture {
        let owner = AccountId::new();
        let mut properties = PropertyRegistry::new();
        let property_id = properties.list(owner, "Shalimar", "XYZ", 100);

        let mut bookings = BookingLedger::new();
        let renter = AccountId::new();
        for i in 0..3u32 {
            bookings
                .book(
                    renter,
                    properties.get(property_id).unwrap(),
                    range(i * 2, i * 2 + 2),
                    200,
                )
                .unwrap();
        }

        Fixture {
            properties,
            bookings,
            owner,
            property_id,
        }
    }

    #[test]
    fn withdraw_settles_the_oldest_bookings_first() {
        let mut fx = fixture();
        let mut engine = EscrowEngine::new(InMemoryPayouts::new());

        let withdrawal = engine
            .withdraw(&fx.properties, &mut fx.bookings, fx.owner, fx.property_id, 2)
            .unwrap();

        assert_eq!(withdrawal.amount, 400);
        assert_eq!(
            withdrawal.settled,
            vec![BookingId::new(1), BookingId::new(2)]
        );
        assert!(fx.bookings.get(BookingId::new(1)).unwrap().is_settled());
        assert!(fx.bookings.get(BookingId::new(2)).unwrap().is_settled());
        assert!(!fx.bookings.get(BookingId::new(3)).unwrap().is_settled());
        assert_eq!(fx.bookings.escrow_balance(fx.property_id), 200);
        assert_eq!(engine.payouts().balance_of(fx.owner), 400);
    }

    #[test]
    fn count_larger_than_available_withdraws_everything() {
        let mut fx = fixture();
        let mut engine = EscrowEngine::new(InMemoryPayouts::new());

        let withdrawal = engine
            .withdraw(&fx.properties, &mut fx.bookings, fx.owner, fx.property_id, 10)
            .unwrap();

        assert_eq!(withdrawal.amount, 600);
        assert_eq!(withdrawal.settled.len(), 3);
        assert_eq!(fx.bookings.escrow_balance(fx.property_id), 0);
    }

    #[test]
    fn only_the_owner_may_withdraw() {
        let mut fx = fixture();
        let mut engine = EscrowEngine::new(InMemoryPayouts::new());
        let stranger = AccountId::new();

        let err = engine
            .withdraw(&fx.properties, &mut fx.bookings, stranger, fx.property_id, 1)
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::NotOwner {
                property_id: fx.property_id,
                caller: stranger,
            }
        );
        assert_eq!(fx.bookings.escrow_balance(fx.property_id), 600);
    }

    #[test]
    fn unknown_property_fails() {
        let mut fx = fixture();
        let mut engine = EscrowEngine::new(InMemoryPayouts::new());
        let missing = PropertyId::new(99);

        let err = engine
            .withdraw(&fx.properties, &mut fx.bookings, fx.owner, missing, 1)
            .unwrap_err();
        assert_eq!(err, LedgerError::PropertyNotFound { property_id: missing });
    }

    #[test]
    fn drained_property_has_nothing_to_withdraw() {
        let mut fx = fixture();
        let mut engine = EscrowEngine::new(InMemoryPayouts::new());

        engine
            .withdraw(&fx.properties, &mut fx.bookings, fx.owner, fx.property_id, 10)
            .unwrap();
        let err = engine
            .withdraw(&fx.properties, &mut fx.bookings, fx.owner, fx.property_id, 1)
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::NothingToWithdraw {
                property_id: fx.property_id,
            }
        );
    }

    #[test]
    fn failed_transfer_leaves_bookings_settled_and_cannot_double_pay() {
        let mut fx = fixture();
        let mut engine = EscrowEngine::new(RejectingPayouts);

        let err = engine
            .withdraw(&fx.properties, &mut fx.bookings, fx.owner, fx.property_id, 10)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::TransferFailed {
                property_id: fx.property_id,
                amount: 600,
                reason: "recipient cannot accept funds".to_string(),
            }
        );

        // Settle-before-transfer: the bookings moved to settled even though
        // the payout failed, so a retry finds nothing left to pay out.
        assert!(fx.bookings.get(BookingId::new(1)).unwrap().is_settled());
        assert_eq!(fx.bookings.escrow_balance(fx.property_id), 0);

        let retry = engine
            .withdraw(&fx.properties, &mut fx.bookings, fx.owner, fx.property_id, 10)
            .unwrap_err();
        assert_eq!(
            retry,
            LedgerError::NothingToWithdraw {
                property_id: fx.property_id,
            }
        );
    }

    proptest! {
        /// Property: each withdrawal decreases the escrow balance by
        /// exactly the amount returned, and the owner's payout book grows
        /// by the same amount.
        #[test]
        fn escrow_is_conserved_across_batched_withdrawals(
            spans in prop::collection::vec(1u32..5, 1..20),
            batch in 1usize..6,
        ) {
            let owner = AccountId::new();
            let mut properties = PropertyRegistry::new();
            let property_id = properties.list(owner, "P", "", 10);
            let mut bookings = BookingLedger::new();

            let mut checkin = 0u32;
            for span in spans {
                let range = DateRange::new(checkin, checkin + span).unwrap();
                bookings
                    .book(
                        AccountId::new(),
                        properties.get(property_id).unwrap(),
                        range,
                        10 * u64::from(span),
                    )
                    .unwrap();
                checkin += span;
            }

            let mut engine = EscrowEngine::new(InMemoryPayouts::new());
            let mut withdrawn: u128 = 0;

            loop {
                let before = bookings.escrow_balance(property_id);
                match engine.withdraw(&properties, &mut bookings, owner, property_id, batch) {
                    Ok(withdrawal) => {
                        let after = bookings.escrow_balance(property_id);
                        prop_assert_eq!(before - after, u128::from(withdrawal.amount));
                        withdrawn += u128::from(withdrawal.amount);
                    }
                    Err(LedgerError::NothingToWithdraw { .. }) => break,
                    Err(other) => prop_assert!(false, "unexpected error: {other}"),
                }
            }

            prop_assert_eq!(bookings.escrow_balance(property_id), 0);
            prop_assert_eq!(engine.payouts().balance_of(owner), withdrawn);
        }
    }
}
