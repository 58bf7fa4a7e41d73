use chrono::Utc;
use diesel::{dsl, BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::{Dao, DaoError};
use crate::models::envelope::{Envelope, EnvelopeChangeset, NewEnvelope};
use crate::request_io::{EnvelopeUpdate, InputEnvelope};
use crate::schema::categories as category_fields;
use crate::schema::categories::dsl::categories;
use crate::schema::envelopes as envelope_fields;
use crate::schema::envelopes::dsl::envelopes;
use crate::store::{CategoryPath, EnvelopePath, EnvelopeStore};

impl EnvelopeStore for Dao {
    fn create_envelope(
        &self,
        path: &CategoryPath,
        envelope: &InputEnvelope,
    ) -> Result<Envelope, DaoError> {
        let now = Utc::now();

        let new_envelope = NewEnvelope {
            id: Uuid::now_v7(),
            category_id: path.category_id(),
            name: &envelope.name,
            note: &envelope.note,
            created_timestamp: now,
            modified_timestamp: now,
        };

        Ok(diesel::insert_into(envelopes)
            .values(&new_envelope)
            .get_result::<Envelope>(&mut self.conn()?)?)
    }

    fn get_envelopes(&self, path: &CategoryPath) -> Result<Vec<Envelope>, DaoError> {
        Ok(envelopes
            .filter(envelope_fields::category_id.eq(path.category_id()))
            .order((envelope_fields::created_timestamp, envelope_fields::id))
            .load::<Envelope>(&mut self.conn()?)?)
    }

    fn update_envelope(
        &self,
        path: &EnvelopePath,
        update: &EnvelopeUpdate,
    ) -> Result<Envelope, DaoError> {
        let changeset = EnvelopeChangeset {
            category_id: update.category_id,
            name: update.name.as_deref(),
            note: update.note.as_deref(),
            modified_timestamp: Utc::now(),
        };

        let mut db_connection = self.conn()?;

        let envelope = db_connection
            .build_transaction()
            .run::<_, diesel::result::Error, _>(|conn| {
                if let Some(target_category_id) = update.category_id {
                    let target_in_budget = dsl::select(dsl::exists(
                        categories.filter(
                            category_fields::id
                                .eq(target_category_id)
                                .and(category_fields::budget_id.eq(path.budget_id())),
                        ),
                    ))
                    .get_result::<bool>(conn)?;

                    if !target_in_budget {
                        return Err(diesel::result::Error::NotFound);
                    }
                }

                diesel::update(envelopes.find(path.envelope_id()))
                    .set(&changeset)
                    .get_result::<Envelope>(conn)
            })?;

        Ok(envelope)
    }

    fn delete_envelope(&self, path: &EnvelopePath) -> Result<(), DaoError> {
        let deleted = diesel::delete(envelopes)
            .filter(
                envelope_fields::id
                    .eq(path.envelope_id())
                    .and(envelope_fields::category_id.eq(path.category_id())),
            )
            .execute(&mut self.conn()?)?;

        if deleted == 0 {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use crate::db::budget::tests::generate_budget;
    use crate::db::category::tests::generate_category;
    use crate::db::test_pool;
    use crate::store::{Ledger, ResolvePath};

    pub fn generate_envelope(path: &CategoryPath) -> Result<Envelope, DaoError> {
        test_pool::dao().create_envelope(
            path,
            &InputEnvelope {
                name: format!("Envelope {}", Uuid::now_v7().simple()),
                note: String::new(),
            },
        )
    }

    #[test]
    #[ignore]
    fn test_envelope_under_other_category_is_not_found() {
        let dao = test_pool::dao();
        let budget_id = generate_budget().unwrap().id;
        let budget_path = dao.resolve_budget(budget_id).unwrap();

        let category = generate_category(&budget_path).unwrap();
        let other_category = generate_category(&budget_path).unwrap();
        let category_path = dao.resolve_category(budget_id, category.id).unwrap();

        let envelope = generate_envelope(&category_path).unwrap();

        assert!(dao
            .resolve_envelope(budget_id, category.id, envelope.id)
            .is_ok());
        assert!(dao
            .resolve_envelope(budget_id, other_category.id, envelope.id)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    #[ignore]
    fn test_move_envelope_within_budget_only() {
        let dao = test_pool::dao();
        let budget_id = generate_budget().unwrap().id;
        let budget_path = dao.resolve_budget(budget_id).unwrap();
        let other_budget_path = dao.resolve_budget(generate_budget().unwrap().id).unwrap();

        let category = generate_category(&budget_path).unwrap();
        let sibling = generate_category(&budget_path).unwrap();
        let foreign = generate_category(&other_budget_path).unwrap();

        let category_path = dao.resolve_category(budget_id, category.id).unwrap();
        let envelope = generate_envelope(&category_path).unwrap();
        let path = dao
            .resolve_envelope(budget_id, category.id, envelope.id)
            .unwrap();

        let err = dao
            .update_envelope(
                &path,
                &EnvelopeUpdate {
                    category_id: Some(foreign.id),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());

        let moved = dao
            .update_envelope(
                &path,
                &EnvelopeUpdate {
                    category_id: Some(sibling.id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.category_id, sibling.id);
        assert_eq!(moved.name, envelope.name);

        let moved_path = dao
            .resolve_envelope(budget_id, sibling.id, envelope.id)
            .unwrap();
        assert_eq!(dao.envelope(&moved_path).unwrap().category_id, sibling.id);
    }
}
