use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::envelope::Envelope;
use crate::money::Money;
use crate::schema::allocations;

#[derive(Clone, Debug, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(Envelope, foreign_key = envelope_id))]
#[diesel(table_name = allocations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Allocation {
    pub id: Uuid,
    pub envelope_id: Uuid,
    pub month: i16,
    pub year: i32,
    pub amount: Money,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = allocations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAllocation {
    pub id: Uuid,
    pub envelope_id: Uuid,
    pub month: i16,
    pub year: i32,
    pub amount: Money,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = allocations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AllocationChangeset {
    pub month: Option<i16>,
    pub year: Option<i32>,
    pub amount: Option<Money>,
    pub modified_timestamp: DateTime<Utc>,
}
