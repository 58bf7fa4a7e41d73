use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::budget::Budget;
use crate::money::Money;
use crate::schema::transactions;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(Budget, foreign_key = budget_id))]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Transaction {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub date: DateTime<Utc>,

    // Always positive. The direction of the flow is given by source and destination.
    pub amount: Money,
    pub note: String,

    pub source_account_id: Uuid,
    pub destination_account_id: Uuid,
    pub envelope_id: Option<Uuid>,

    pub reconciled_source: bool,
    pub reconciled_destination: bool,

    // For income that only funds the budget from a later month
    pub available_from: Option<DateTime<Utc>>,
    pub import_hash: Option<String>,

    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTransaction<'a> {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub note: &'a str,
    pub source_account_id: Uuid,
    pub destination_account_id: Uuid,
    pub envelope_id: Option<Uuid>,
    pub reconciled_source: bool,
    pub reconciled_destination: bool,
    pub available_from: Option<DateTime<Utc>>,
    pub import_hash: Option<&'a str>,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
}

// Nullable columns use a nested Option: `None` leaves the column alone and `Some(None)` sets
// it to NULL.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransactionChangeset<'a> {
    pub date: Option<DateTime<Utc>>,
    pub amount: Option<Money>,
    pub note: Option<&'a str>,
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    pub envelope_id: Option<Option<Uuid>>,
    pub reconciled_source: Option<bool>,
    pub reconciled_destination: Option<bool>,
    pub available_from: Option<Option<DateTime<Utc>>>,
    pub import_hash: Option<Option<&'a str>>,
    pub modified_timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn touches_account(&self, account_id: Uuid) -> bool {
        self.source_account_id == account_id || self.destination_account_id == account_id
    }
}
