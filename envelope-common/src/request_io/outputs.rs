use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::account::Account;
use crate::models::allocation::Allocation;
use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::envelope::Envelope;
use crate::models::transaction::Transaction;
use crate::money::Money;

pub const API_ROOT: &str = "/api";

/// Relative URLs for a resource and its child collections, keyed by relation name.
pub type Links = BTreeMap<String, String>;

fn links<const N: usize>(entries: [(&str, String); N]) -> Links {
    entries
        .into_iter()
        .map(|(rel, href)| (String::from(rel), href))
        .collect()
}

pub fn budget_href(budget_id: Uuid) -> String {
    format!("{API_ROOT}/budgets/{budget_id}")
}

pub fn category_href(budget_id: Uuid, category_id: Uuid) -> String {
    format!("{}/categories/{category_id}", budget_href(budget_id))
}

pub fn envelope_href(budget_id: Uuid, category_id: Uuid, envelope_id: Uuid) -> String {
    format!(
        "{}/envelopes/{envelope_id}",
        category_href(budget_id, category_id)
    )
}

/// Figures for one envelope in one month. `spent` is negative when money left the envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMonth {
    pub id: Uuid,
    pub name: String,
    pub month: DateTime<Utc>,
    pub spent: Money,
    pub balance: Money,
    pub allocation: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetMonth {
    pub id: Uuid,
    pub name: String,
    pub month: DateTime<Utc>,
    pub envelopes: Vec<EnvelopeMonth>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: Money,
    pub reconciled_balance: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputBudget {
    pub id: Uuid,
    pub name: String,
    pub note: String,
    pub currency: String,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
    pub links: Links,
}

impl From<Budget> for OutputBudget {
    fn from(budget: Budget) -> Self {
        let href = budget_href(budget.id);

        OutputBudget {
            links: links([
                ("self", href.clone()),
                ("accounts", format!("{href}/accounts")),
                ("categories", format!("{href}/categories")),
                ("transactions", format!("{href}/transactions")),
                ("month", format!("{href}/month?month=YYYY-MM")),
            ]),
            id: budget.id,
            name: budget.name,
            note: budget.note,
            currency: budget.currency,
            created_timestamp: budget.created_timestamp,
            modified_timestamp: budget.modified_timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputAccount {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub note: String,
    pub on_budget: bool,
    pub external: bool,
    pub balance: Money,
    pub reconciled_balance: Money,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
    pub links: Links,
}

impl OutputAccount {
    pub fn new(account: Account, balance: AccountBalance) -> Self {
        OutputAccount {
            links: links([
                (
                    "self",
                    format!("{}/accounts/{}", budget_href(account.budget_id), account.id),
                ),
                ("budget", budget_href(account.budget_id)),
            ]),
            id: account.id,
            budget_id: account.budget_id,
            name: account.name,
            note: account.note,
            on_budget: account.on_budget,
            external: account.external,
            balance: balance.balance,
            reconciled_balance: balance.reconciled_balance,
            created_timestamp: account.created_timestamp,
            modified_timestamp: account.modified_timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputCategory {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub note: String,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
    pub links: Links,
}

impl From<Category> for OutputCategory {
    fn from(category: Category) -> Self {
        let href = category_href(category.budget_id, category.id);

        OutputCategory {
            links: links([
                ("self", href.clone()),
                ("envelopes", format!("{href}/envelopes")),
                ("budget", budget_href(category.budget_id)),
            ]),
            id: category.id,
            budget_id: category.budget_id,
            name: category.name,
            note: category.note,
            created_timestamp: category.created_timestamp,
            modified_timestamp: category.modified_timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputEnvelope {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub note: String,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
    pub links: Links,
}

impl OutputEnvelope {
    // Envelopes don't store their budget, so the caller supplies it from the resolved path
    pub fn new(budget_id: Uuid, envelope: Envelope) -> Self {
        let href = envelope_href(budget_id, envelope.category_id, envelope.id);

        OutputEnvelope {
            links: links([
                ("self", href.clone()),
                ("allocations", format!("{href}/allocations")),
                ("month", format!("{href}/month?month=YYYY-MM")),
                ("category", category_href(budget_id, envelope.category_id)),
            ]),
            id: envelope.id,
            category_id: envelope.category_id,
            name: envelope.name,
            note: envelope.note,
            created_timestamp: envelope.created_timestamp,
            modified_timestamp: envelope.modified_timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputAllocation {
    pub id: Uuid,
    pub envelope_id: Uuid,
    pub month: i16,
    pub year: i32,
    pub amount: Money,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
    pub links: Links,
}

impl OutputAllocation {
    pub fn new(envelope_href: &str, allocation: Allocation) -> Self {
        OutputAllocation {
            links: links([
                (
                    "self",
                    format!("{envelope_href}/allocations/{}", allocation.id),
                ),
                ("envelope", String::from(envelope_href)),
            ]),
            id: allocation.id,
            envelope_id: allocation.envelope_id,
            month: allocation.month,
            year: allocation.year,
            amount: allocation.amount,
            created_timestamp: allocation.created_timestamp,
            modified_timestamp: allocation.modified_timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputTransaction {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub note: String,
    pub source_account_id: Uuid,
    pub destination_account_id: Uuid,
    pub envelope_id: Option<Uuid>,
    pub reconciled_source: bool,
    pub reconciled_destination: bool,
    pub available_from: Option<DateTime<Utc>>,
    pub import_hash: Option<String>,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
    pub links: Links,
}

impl From<Transaction> for OutputTransaction {
    fn from(transaction: Transaction) -> Self {
        let budget = budget_href(transaction.budget_id);

        OutputTransaction {
            links: links([
                (
                    "self",
                    format!("{budget}/transactions/{}", transaction.id),
                ),
                (
                    "source_account",
                    format!("{budget}/accounts/{}", transaction.source_account_id),
                ),
                (
                    "destination_account",
                    format!("{budget}/accounts/{}", transaction.destination_account_id),
                ),
                ("budget", budget),
            ]),
            id: transaction.id,
            budget_id: transaction.budget_id,
            date: transaction.date,
            amount: transaction.amount,
            note: transaction.note,
            source_account_id: transaction.source_account_id,
            destination_account_id: transaction.destination_account_id,
            envelope_id: transaction.envelope_id,
            reconciled_source: transaction.reconciled_source,
            reconciled_destination: transaction.reconciled_destination,
            available_from: transaction.available_from,
            import_hash: transaction.import_hash,
            created_timestamp: transaction.created_timestamp,
            modified_timestamp: transaction.modified_timestamp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    IncorrectlyFormed,
    InvalidMonth,
    InvalidInput,
    ConflictWithExisting,
    DoesNotExist,
    InternalError,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerErrorResponse {
    pub error_type: ErrorType,
    pub message: String,
}
