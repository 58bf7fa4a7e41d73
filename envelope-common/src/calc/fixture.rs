use chrono::{DateTime, TimeZone, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::money::Money;
use crate::request_io::{
    InputAccount, InputAllocation, InputBudget, InputCategory, InputEnvelope, InputTransaction,
};
use crate::store::memory::MemoryStore;
use crate::store::{
    AccountStore, AllocationStore, BudgetStore, CategoryStore, EnvelopePath, EnvelopeStore,
    ResolvePath, TransactionStore,
};

pub struct Fixture {
    pub envelope: EnvelopePath,
    pub checking: Uuid,
    pub savings: Uuid,
    pub shop: Uuid,
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn account(store: &MemoryStore, fixture_budget: Uuid, name: &str, external: bool) -> Uuid {
    let path = store.resolve_budget(fixture_budget).unwrap();

    store
        .create_account(
            &path,
            &InputAccount {
                name: String::from(name),
                note: String::new(),
                on_budget: !external,
                external,
            },
        )
        .unwrap()
        .id
}

fn transaction(
    store: &MemoryStore,
    fixture: &Fixture,
    source: Uuid,
    destination: Uuid,
    date: DateTime<Utc>,
    amount: &str,
) {
    store
        .create_transaction(
            &fixture.envelope.budget(),
            &InputTransaction {
                date,
                amount: Money::from_str(amount).unwrap(),
                note: String::new(),
                source_account_id: source,
                destination_account_id: destination,
                envelope_id: Some(fixture.envelope.envelope_id()),
                reconciled_source: false,
                reconciled_destination: false,
                available_from: None,
                import_hash: None,
            },
        )
        .unwrap();
}

pub fn spend(store: &MemoryStore, fixture: &Fixture, date: DateTime<Utc>, amount: &str) {
    transaction(store, fixture, fixture.checking, fixture.shop, date, amount);
}

pub fn refund(store: &MemoryStore, fixture: &Fixture, date: DateTime<Utc>, amount: &str) {
    transaction(store, fixture, fixture.shop, fixture.checking, date, amount);
}

pub fn transfer_to_savings(
    store: &MemoryStore,
    fixture: &Fixture,
    date: DateTime<Utc>,
    amount: &str,
) {
    transaction(store, fixture, fixture.checking, fixture.savings, date, amount);
}

pub fn allocate(store: &MemoryStore, fixture: &Fixture, year: i32, month: i16, amount: &str) {
    store
        .create_allocation(
            &fixture.envelope,
            &InputAllocation {
                month,
                year,
                amount: Money::from_str(amount).unwrap(),
            },
        )
        .unwrap();
}

pub fn empty_envelope(store: &MemoryStore, name: &str) -> EnvelopePath {
    let budget = store
        .create_budget(&InputBudget {
            name: String::from("Household"),
            note: String::new(),
            currency: String::from("$"),
        })
        .unwrap();
    let budget_path = store.resolve_budget(budget.id).unwrap();

    let category = store
        .create_category(
            &budget_path,
            &InputCategory {
                name: String::from("Food"),
                note: String::new(),
            },
        )
        .unwrap();
    let category_path = store.resolve_category(budget.id, category.id).unwrap();

    let envelope = store
        .create_envelope(
            &category_path,
            &InputEnvelope {
                name: String::from(name),
                note: String::new(),
            },
        )
        .unwrap();

    store
        .resolve_envelope(budget.id, category.id, envelope.id)
        .unwrap()
}

/// A "Groceries" envelope funded with 20.99, 47.12 and 31.17 for January to March 2022,
/// spending 10, 5 and 15 in those months.
pub fn groceries(store: &MemoryStore) -> Fixture {
    let envelope = empty_envelope(store, "Groceries");
    let budget_id = envelope.budget_id();

    let fixture = Fixture {
        envelope,
        checking: account(store, budget_id, "Checking", false),
        savings: account(store, budget_id, "Savings", false),
        shop: account(store, budget_id, "Supermarket", true),
    };

    allocate(store, &fixture, 2022, 1, "20.99");
    allocate(store, &fixture, 2022, 2, "47.12");
    allocate(store, &fixture, 2022, 3, "31.17");

    spend(store, &fixture, at(2022, 1, 8), "10");
    spend(store, &fixture, at(2022, 2, 14), "5");
    spend(store, &fixture, at(2022, 3, 3), "15");

    fixture
}
