use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::calc::envelope_month::{external_flags, fold_envelope};
use crate::calc::{CalcError, ResourceKind};
use crate::month::Month;
use crate::request_io::BudgetMonth;
use crate::store::Ledger;

/// Every envelope of a budget for the month containing `month`, in category order.
///
/// Fails as a whole if any envelope fails.
pub fn budget_month<L: Ledger + ?Sized>(
    ledger: &L,
    budget_id: Uuid,
    month: DateTime<Utc>,
) -> Result<BudgetMonth, CalcError> {
    let target = Month::from_timestamp(month)?;
    let not_found = CalcError::from_store(ResourceKind::Budget);

    let path = ledger.resolve_budget(budget_id).map_err(&not_found)?;
    let budget = ledger.budget(&path).map_err(&not_found)?;
    let externals = external_flags(ledger, &path).map_err(CalcError::Store)?;

    let envelopes = ledger
        .envelopes_in_budget(&path)
        .map_err(CalcError::Store)?
        .iter()
        .map(|envelope| fold_envelope(ledger, envelope, &externals, target))
        .collect::<Result<Vec<_>, _>>()
        .map_err(CalcError::Store)?;

    Ok(BudgetMonth {
        id: budget.id,
        name: budget.name,
        month: target.start(),
        envelopes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    use crate::calc::envelope_month;
    use crate::calc::fixture;
    use crate::money::Money;
    use crate::month::zero_timestamp;
    use crate::request_io::{InputCategory, InputEnvelope};
    use crate::store::memory::MemoryStore;
    use crate::store::{CategoryStore, EnvelopeStore, ResolvePath};

    #[test]
    fn test_budget_month_matches_envelope_months() {
        let store = MemoryStore::new();
        let fixture = fixture::groceries(&store);
        let budget_id = fixture.envelope.budget_id();

        let budget_path = store.resolve_budget(budget_id).unwrap();
        let household = store
            .create_category(
                &budget_path,
                &InputCategory {
                    name: String::from("Household"),
                    note: String::new(),
                },
            )
            .unwrap();
        let household_path = store.resolve_category(budget_id, household.id).unwrap();
        let cleaning = store
            .create_envelope(
                &household_path,
                &InputEnvelope {
                    name: String::from("Cleaning"),
                    note: String::new(),
                },
            )
            .unwrap();

        let month = fixture::at(2022, 2, 1);
        let result = budget_month(&store, budget_id, month).unwrap();

        assert_eq!(result.id, budget_id);
        assert_eq!(result.name, "Household");
        assert_eq!(result.month, Month::new(2022, 2).unwrap().start());
        assert_eq!(result.envelopes.len(), 2);

        assert_eq!(
            result.envelopes[0],
            envelope_month(
                &store,
                budget_id,
                fixture.envelope.category_id(),
                fixture.envelope.envelope_id(),
                month,
            )
            .unwrap()
        );
        assert_eq!(result.envelopes[0].balance, Money::from_str("42.12").unwrap());

        assert_eq!(result.envelopes[1].id, cleaning.id);
        assert_eq!(result.envelopes[1].balance, Money::ZERO);
    }

    #[test]
    fn test_budget_without_envelopes() {
        let store = MemoryStore::new();
        let path = fixture::empty_envelope(&store, "Rent");

        let other_budget = fixture::empty_envelope(&store, "Fuel");
        let result = budget_month(&store, path.budget_id(), fixture::at(2023, 6, 1)).unwrap();

        assert_eq!(result.envelopes.len(), 1);
        assert_eq!(result.envelopes[0].name, "Rent");
        assert_ne!(result.envelopes[0].id, other_budget.envelope_id());
    }

    #[test]
    fn test_zero_timestamp_wins_over_missing_budget() {
        let store = MemoryStore::new();
        let path = fixture::empty_envelope(&store, "Rent");

        assert!(matches!(
            budget_month(&store, path.budget_id(), zero_timestamp()),
            Err(CalcError::InvalidMonth(_))
        ));
        assert!(matches!(
            budget_month(&store, Uuid::now_v7(), zero_timestamp()),
            Err(CalcError::InvalidMonth(_))
        ));
        assert!(matches!(
            budget_month(&store, Uuid::now_v7(), fixture::at(2022, 1, 1)),
            Err(CalcError::NotFound(ResourceKind::Budget))
        ));
    }
}
