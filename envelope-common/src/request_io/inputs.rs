use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::money::Money;
use crate::validators::{self, Validity};

// Update payloads are patches: a field that is left out is left unchanged, while a field that
// is present always overwrites, even with "", 0 or false. Nullable fields are
// `Option<Option<T>>` so that an explicit `null` can clear them.

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputBudget {
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub currency: String,
}

impl InputBudget {
    pub fn validate(&self) -> Validity {
        Validity::all([validate_name(&self.name), validate_note(&self.note)])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BudgetUpdate {
    pub name: Option<String>,
    pub note: Option<String>,
    pub currency: Option<String>,
}

impl BudgetUpdate {
    pub fn validate(&self) -> Validity {
        Validity::all([
            validate_optional_name(self.name.as_deref()),
            validate_optional_note(self.note.as_deref()),
        ])
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputAccount {
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_true")]
    pub on_budget: bool,
    #[serde(default)]
    pub external: bool,
}

impl InputAccount {
    pub fn validate(&self) -> Validity {
        Validity::all([validate_name(&self.name), validate_note(&self.note)])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub note: Option<String>,
    pub on_budget: Option<bool>,
    pub external: Option<bool>,
}

impl AccountUpdate {
    pub fn validate(&self) -> Validity {
        Validity::all([
            validate_optional_name(self.name.as_deref()),
            validate_optional_note(self.note.as_deref()),
        ])
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputCategory {
    pub name: String,
    #[serde(default)]
    pub note: String,
}

impl InputCategory {
    pub fn validate(&self) -> Validity {
        Validity::all([validate_name(&self.name), validate_note(&self.note)])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub note: Option<String>,
}

impl CategoryUpdate {
    pub fn validate(&self) -> Validity {
        Validity::all([
            validate_optional_name(self.name.as_deref()),
            validate_optional_note(self.note.as_deref()),
        ])
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputEnvelope {
    pub name: String,
    #[serde(default)]
    pub note: String,
}

impl InputEnvelope {
    pub fn validate(&self) -> Validity {
        Validity::all([validate_name(&self.name), validate_note(&self.note)])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EnvelopeUpdate {
    pub name: Option<String>,
    pub note: Option<String>,
    // Moves the envelope to another category of the same budget
    pub category_id: Option<Uuid>,
}

impl EnvelopeUpdate {
    pub fn validate(&self) -> Validity {
        Validity::all([
            validate_optional_name(self.name.as_deref()),
            validate_optional_note(self.note.as_deref()),
        ])
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputAllocation {
    pub month: i16,
    pub year: i32,
    pub amount: Money,
}

impl InputAllocation {
    pub fn validate(&self) -> Validity {
        Validity::all([
            validators::validate_allocation_month(self.month),
            validators::validate_allocation_year(self.year),
            validators::validate_allocation_amount(&self.amount),
        ])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AllocationUpdate {
    pub month: Option<i16>,
    pub year: Option<i32>,
    pub amount: Option<Money>,
}

impl AllocationUpdate {
    pub fn validate(&self) -> Validity {
        Validity::all([
            self.month
                .map(validators::validate_allocation_month)
                .unwrap_or(Validity::Valid),
            self.year
                .map(validators::validate_allocation_year)
                .unwrap_or(Validity::Valid),
            self.amount
                .as_ref()
                .map(validators::validate_allocation_amount)
                .unwrap_or(Validity::Valid),
        ])
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputTransaction {
    pub date: DateTime<Utc>,
    pub amount: Money,
    #[serde(default)]
    pub note: String,
    pub source_account_id: Uuid,
    pub destination_account_id: Uuid,
    #[serde(default)]
    pub envelope_id: Option<Uuid>,
    #[serde(default)]
    pub reconciled_source: bool,
    #[serde(default)]
    pub reconciled_destination: bool,
    #[serde(default)]
    pub available_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub import_hash: Option<String>,
}

impl InputTransaction {
    pub fn validate(&self) -> Validity {
        Validity::all([
            validators::validate_transaction_amount(&self.amount),
            validators::validate_distinct_accounts(
                self.source_account_id,
                self.destination_account_id,
            ),
            validate_note(&self.note),
            validators::validate_date(&self.date),
            self.available_from
                .as_ref()
                .map(validators::validate_date)
                .unwrap_or(Validity::Valid),
        ])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TransactionUpdate {
    pub date: Option<DateTime<Utc>>,
    pub amount: Option<Money>,
    pub note: Option<String>,
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub envelope_id: Option<Option<Uuid>>,
    pub reconciled_source: Option<bool>,
    pub reconciled_destination: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub available_from: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub import_hash: Option<Option<String>>,
}

impl TransactionUpdate {
    /// Checks the fields that can be checked without the stored transaction. Whether source and
    /// destination still differ after the patch is checked by the store.
    pub fn validate(&self) -> Validity {
        let amount = match &self.amount {
            Some(amount) => validators::validate_transaction_amount(amount),
            None => Validity::Valid,
        };

        let accounts = match (self.source_account_id, self.destination_account_id) {
            (Some(source), Some(destination)) => {
                validators::validate_distinct_accounts(source, destination)
            }
            _ => Validity::Valid,
        };

        Validity::all([
            amount,
            accounts,
            validate_optional_note(self.note.as_deref()),
            self.date
                .as_ref()
                .map(validators::validate_date)
                .unwrap_or(Validity::Valid),
            self.available_from
                .flatten()
                .as_ref()
                .map(validators::validate_date)
                .unwrap_or(Validity::Valid),
        ])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputMonth {
    pub month: Option<String>,
}

fn validate_name(name: &str) -> Validity {
    validators::validate_name(name)
}

fn validate_note(note: &str) -> Validity {
    validators::validate_note(note)
}

fn validate_optional_name(name: Option<&str>) -> Validity {
    name.map(validators::validate_name).unwrap_or(Validity::Valid)
}

fn validate_optional_note(note: Option<&str>) -> Validity {
    note.map(validators::validate_note).unwrap_or(Validity::Valid)
}
