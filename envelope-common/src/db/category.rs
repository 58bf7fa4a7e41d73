use chrono::Utc;
use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::{Dao, DaoError};
use crate::models::category::{Category, CategoryChangeset, NewCategory};
use crate::request_io::{CategoryUpdate, InputCategory};
use crate::schema::categories as category_fields;
use crate::schema::categories::dsl::categories;
use crate::store::{BudgetPath, CategoryPath, CategoryStore};

impl CategoryStore for Dao {
    fn create_category(
        &self,
        path: &BudgetPath,
        category: &InputCategory,
    ) -> Result<Category, DaoError> {
        let now = Utc::now();

        let new_category = NewCategory {
            id: Uuid::now_v7(),
            budget_id: path.budget_id(),
            name: &category.name,
            note: &category.note,
            created_timestamp: now,
            modified_timestamp: now,
        };

        Ok(diesel::insert_into(categories)
            .values(&new_category)
            .get_result::<Category>(&mut self.conn()?)?)
    }

    fn get_category(&self, path: &CategoryPath) -> Result<Category, DaoError> {
        Ok(categories
            .find(path.category_id())
            .get_result::<Category>(&mut self.conn()?)?)
    }

    fn get_categories(&self, path: &BudgetPath) -> Result<Vec<Category>, DaoError> {
        Ok(categories
            .filter(category_fields::budget_id.eq(path.budget_id()))
            .order((category_fields::created_timestamp, category_fields::id))
            .load::<Category>(&mut self.conn()?)?)
    }

    fn update_category(
        &self,
        path: &CategoryPath,
        update: &CategoryUpdate,
    ) -> Result<Category, DaoError> {
        let changeset = CategoryChangeset {
            name: update.name.as_deref(),
            note: update.note.as_deref(),
            modified_timestamp: Utc::now(),
        };

        Ok(diesel::update(categories)
            .filter(
                category_fields::id
                    .eq(path.category_id())
                    .and(category_fields::budget_id.eq(path.budget_id())),
            )
            .set(&changeset)
            .get_result::<Category>(&mut self.conn()?)?)
    }

    fn delete_category(&self, path: &CategoryPath) -> Result<(), DaoError> {
        let deleted = diesel::delete(categories)
            .filter(
                category_fields::id
                    .eq(path.category_id())
                    .and(category_fields::budget_id.eq(path.budget_id())),
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
    use crate::db::test_pool;
    use crate::store::ResolvePath;

    pub fn generate_category(path: &BudgetPath) -> Result<Category, DaoError> {
        test_pool::dao().create_category(
            path,
            &InputCategory {
                name: format!("Category {}", Uuid::now_v7().simple()),
                note: String::new(),
            },
        )
    }

    #[test]
    #[ignore]
    fn test_category_path_requires_matching_budget() {
        let dao = test_pool::dao();
        let budget_id = generate_budget().unwrap().id;
        let other_budget_id = generate_budget().unwrap().id;
        let path = dao.resolve_budget(budget_id).unwrap();

        let category = generate_category(&path).unwrap();

        assert!(dao.resolve_category(budget_id, category.id).is_ok());
        assert!(dao
            .resolve_category(other_budget_id, category.id)
            .unwrap_err()
            .is_not_found());
        assert!(dao
            .resolve_category(budget_id, Uuid::now_v7())
            .unwrap_err()
            .is_not_found());

        let listed = dao.get_categories(&path).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, category.id);

        let category_path = dao.resolve_category(budget_id, category.id).unwrap();
        dao.delete_category(&category_path).unwrap();
        assert!(dao.get_categories(&path).unwrap().is_empty());
    }
}
