use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::calc::{CalcError, ResourceKind};
use crate::db::DaoError;
use crate::models::envelope::Envelope;
use crate::models::transaction::Transaction;
use crate::money::Money;
use crate::month::Month;
use crate::request_io::EnvelopeMonth;
use crate::store::{BudgetPath, Ledger};

/// Account id to its `external` flag, for every account in a budget.
pub(super) type ExternalFlags = HashMap<Uuid, bool>;

pub(super) fn external_flags<L: Ledger + ?Sized>(
    ledger: &L,
    path: &BudgetPath,
) -> Result<ExternalFlags, DaoError> {
    Ok(ledger
        .accounts_in_budget(path)?
        .into_iter()
        .map(|a| (a.id, a.external))
        .collect())
}

/// What a transaction does to an envelope. Money coming in from outside the budget is
/// positive, money leaving it is negative. Transfers that stay on one side move nothing.
fn envelope_flow(transaction: &Transaction, externals: &ExternalFlags) -> Money {
    let is_external = |id: &Uuid| externals.get(id).copied().unwrap_or(false);

    match (
        is_external(&transaction.source_account_id),
        is_external(&transaction.destination_account_id),
    ) {
        (true, false) => transaction.amount,
        (false, true) => -transaction.amount,
        _ => Money::ZERO,
    }
}

/// Folds the envelope's history forward from its first active month to `target`.
///
/// Each month's balance is its allocation plus what was spent in it. A positive balance does
/// not roll over, but an overspent (negative) balance is taken out of the following month.
///
/// This carry rule was picked to reproduce the reference January to March figures for the
/// groceries envelope. Carrying the full balance forward does not match them. Dropping the
/// carry entirely would match them too, since none of those months is overspent, so
/// `test_overspending_is_taken_from_next_month` pins the deficit carry down.
pub(super) fn fold_envelope<L: Ledger + ?Sized>(
    ledger: &L,
    envelope: &Envelope,
    externals: &ExternalFlags,
    target: Month,
) -> Result<EnvelopeMonth, DaoError> {
    let mut allocation = Money::ZERO;
    let mut spent = Money::ZERO;
    let mut balance = Money::ZERO;

    if let Some(first) = ledger.first_activity_month(envelope.id)? {
        for month in first.through(target) {
            let carried = balance.deficit();

            allocation = ledger
                .allocation_for(envelope.id, month)?
                .unwrap_or(Money::ZERO);
            spent = ledger
                .transactions_affecting(envelope.id, month)?
                .iter()
                .map(|t| envelope_flow(t, externals))
                .sum();

            balance = allocation + spent + carried;
        }
    }

    Ok(EnvelopeMonth {
        id: envelope.id,
        name: envelope.name.clone(),
        month: target.start(),
        spent,
        balance,
        allocation,
    })
}

/// The allocation, spending and balance of one envelope in the month containing `month`.
///
/// The month is checked before anything is looked up, so the zero timestamp is an invalid
/// month even when the envelope doesn't exist.
pub fn envelope_month<L: Ledger + ?Sized>(
    ledger: &L,
    budget_id: Uuid,
    category_id: Uuid,
    envelope_id: Uuid,
    month: DateTime<Utc>,
) -> Result<EnvelopeMonth, CalcError> {
    let target = Month::from_timestamp(month)?;
    let not_found = CalcError::from_store(ResourceKind::Envelope);

    let path = ledger
        .resolve_envelope(budget_id, category_id, envelope_id)
        .map_err(&not_found)?;
    let envelope = ledger.envelope(&path).map_err(&not_found)?;
    let externals = external_flags(ledger, &path.budget()).map_err(CalcError::Store)?;

    fold_envelope(ledger, &envelope, &externals, target).map_err(CalcError::Store)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    use crate::calc::fixture::{self, Fixture};
    use crate::month::zero_timestamp;
    use crate::store::memory::MemoryStore;

    fn money(amount: &str) -> Money {
        Money::from_str(amount).unwrap()
    }

    fn month_of(fixture: &Fixture, store: &MemoryStore, year: i32, month: u32) -> EnvelopeMonth {
        envelope_month(
            store,
            fixture.envelope.budget_id(),
            fixture.envelope.category_id(),
            fixture.envelope.envelope_id(),
            Month::new(year, month).unwrap().start(),
        )
        .unwrap()
    }

    #[test]
    fn test_fixture_months() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        let jan = month_of(&fixture, &store, 2022, 1);
        assert_eq!(
            (jan.spent, jan.balance, jan.allocation),
            (money("-10"), money("10.99"), money("20.99"))
        );

        let feb = month_of(&fixture, &store, 2022, 2);
        assert_eq!(
            (feb.spent, feb.balance, feb.allocation),
            (money("-5"), money("42.12"), money("47.12"))
        );

        let mar = month_of(&fixture, &store, 2022, 3);
        assert_eq!(
            (mar.spent, mar.balance, mar.allocation),
            (money("-15"), money("16.17"), money("31.17"))
        );

        assert_eq!(mar.month, Month::new(2022, 3).unwrap().start());
        assert_eq!(mar.name, "Groceries");
    }

    #[test]
    fn test_same_result_when_repeated() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        assert_eq!(
            month_of(&fixture, &store, 2022, 2),
            month_of(&fixture, &store, 2022, 2)
        );
    }

    #[test]
    fn test_mid_month_timestamp_is_normalized() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        let result = envelope_month(
            &store,
            fixture.envelope.budget_id(),
            fixture.envelope.category_id(),
            fixture.envelope.envelope_id(),
            fixture::at(2022, 2, 19),
        )
        .unwrap();

        assert_eq!(result, month_of(&fixture, &store, 2022, 2));
    }

    #[test]
    fn test_months_without_activity() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        let before = month_of(&fixture, &store, 2021, 12);
        assert_eq!(before.balance, Money::ZERO);
        assert_eq!(before.spent, Money::ZERO);
        assert_eq!(before.allocation, Money::ZERO);

        // Positive leftovers don't roll over, so a quiet month after March is empty too
        let apr = month_of(&fixture, &store, 2022, 4);
        assert_eq!(apr.balance, Money::ZERO);
        assert_eq!(apr.allocation, Money::ZERO);
    }

    #[test]
    fn test_overspending_is_taken_from_next_month() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        fixture::spend(&store, &fixture, fixture::at(2022, 4, 2), "30.00");
        fixture::allocate(&store, &fixture, 2022, 5, "50.00");

        let apr = month_of(&fixture, &store, 2022, 4);
        assert_eq!(apr.balance, money("-30.00"));

        let may = month_of(&fixture, &store, 2022, 5);
        assert_eq!(may.spent, Money::ZERO);
        assert_eq!(may.allocation, money("50.00"));
        assert_eq!(may.balance, money("20.00"));
    }

    #[test]
    fn test_internal_transfers_do_not_count() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        fixture::transfer_to_savings(&store, &fixture, fixture::at(2022, 1, 20), "100");

        let jan = month_of(&fixture, &store, 2022, 1);
        assert_eq!(jan.spent, money("-10"));
    }

    #[test]
    fn test_refund_adds_to_envelope() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        fixture::refund(&store, &fixture, fixture::at(2022, 3, 28), "2.50");

        let mar = month_of(&fixture, &store, 2022, 3);
        assert_eq!(mar.spent, money("-12.50"));
        assert_eq!(mar.balance, money("18.67"));
    }

    #[test]
    fn test_zero_timestamp_is_invalid_month() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        let existing = envelope_month(
            &store,
            fixture.envelope.budget_id(),
            fixture.envelope.category_id(),
            fixture.envelope.envelope_id(),
            zero_timestamp(),
        );
        assert!(matches!(existing, Err(CalcError::InvalidMonth(_))));

        let missing = envelope_month(
            &store,
            Uuid::now_v7(),
            Uuid::now_v7(),
            Uuid::now_v7(),
            zero_timestamp(),
        );
        assert!(matches!(missing, Err(CalcError::InvalidMonth(_))));
    }

    #[test]
    fn test_envelope_under_wrong_path_is_not_found() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);

        let result = envelope_month(
            &store,
            fixture.envelope.budget_id(),
            Uuid::now_v7(),
            fixture.envelope.envelope_id(),
            fixture::at(2022, 1, 1),
        );

        assert!(matches!(
            result,
            Err(CalcError::NotFound(ResourceKind::Envelope))
        ));
    }
}
