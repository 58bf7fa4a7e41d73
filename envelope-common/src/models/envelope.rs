use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::category::Category;
use crate::schema::envelopes;

#[derive(Clone, Debug, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(Category, foreign_key = category_id))]
#[diesel(table_name = envelopes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Envelope {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub note: String,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = envelopes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewEnvelope<'a> {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: &'a str,
    pub note: &'a str,
    pub created_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = envelopes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EnvelopeChangeset<'a> {
    pub category_id: Option<Uuid>,
    pub name: Option<&'a str>,
    pub note: Option<&'a str>,
    pub modified_timestamp: DateTime<Utc>,
}
