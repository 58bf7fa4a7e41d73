use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::budget::Budget;
use crate::schema::accounts;

#[derive(Clone, Debug, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(Budget, foreign_key = budget_id))]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub note: String,

    // Whether the balance of this account counts toward budgeted money
    pub on_budget: bool,
    // Whether the account is outside of the user's control, e.g. a merchant
    pub external: bool,

    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccount<'a> {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: &'a str,
    pub note: &'a str,
    pub on_budget: bool,
    pub external: bool,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountChangeset<'a> {
    pub name: Option<&'a str>,
    pub note: Option<&'a str>,
    pub on_budget: Option<bool>,
    pub external: Option<bool>,
    pub modified_timestamp: DateTime<Utc>,
}
