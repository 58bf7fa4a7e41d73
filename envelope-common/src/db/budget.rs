use chrono::Utc;
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::{Dao, DaoError};
use crate::models::budget::{Budget, BudgetChangeset, NewBudget};
use crate::request_io::{BudgetUpdate, InputBudget};
use crate::schema::budgets as budget_fields;
use crate::schema::budgets::dsl::budgets;
use crate::store::{BudgetPath, BudgetStore};

impl BudgetStore for Dao {
    fn create_budget(&self, budget: &InputBudget) -> Result<Budget, DaoError> {
        let now = Utc::now();

        let new_budget = NewBudget {
            id: Uuid::now_v7(),
            name: &budget.name,
            note: &budget.note,
            currency: &budget.currency,
            created_timestamp: now,
            modified_timestamp: now,
        };

        Ok(diesel::insert_into(budgets)
            .values(&new_budget)
            .get_result::<Budget>(&mut self.conn()?)?)
    }

    fn get_all_budgets(&self) -> Result<Vec<Budget>, DaoError> {
        Ok(budgets
            .order((budget_fields::created_timestamp, budget_fields::id))
            .load::<Budget>(&mut self.conn()?)?)
    }

    fn update_budget(&self, path: &BudgetPath, update: &BudgetUpdate) -> Result<Budget, DaoError> {
        let changeset = BudgetChangeset {
            name: update.name.as_deref(),
            note: update.note.as_deref(),
            currency: update.currency.as_deref(),
            modified_timestamp: Utc::now(),
        };

        Ok(diesel::update(budgets.find(path.budget_id()))
            .set(&changeset)
            .get_result::<Budget>(&mut self.conn()?)?)
    }

    fn delete_budget(&self, path: &BudgetPath) -> Result<(), DaoError> {
        let deleted = diesel::delete(budgets.find(path.budget_id()))
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

    use crate::db::test_pool;
    use crate::store::{Ledger, ResolvePath};

    pub fn generate_budget() -> Result<Budget, DaoError> {
        let budget_number = Uuid::now_v7().simple();

        test_pool::dao().create_budget(&InputBudget {
            name: format!("Test Budget {budget_number}"),
            note: String::from("A budget for testing"),
            currency: String::from("$"),
        })
    }

    #[test]
    #[ignore]
    fn test_create_update_and_delete_budget() {
        let dao = test_pool::dao();
        let created = generate_budget().unwrap();
        let path = dao.resolve_budget(created.id).unwrap();

        let updated = dao
            .update_budget(
                &path,
                &BudgetUpdate {
                    note: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, created.name);
        assert_eq!(updated.note, "");
        assert_eq!(updated.currency, "$");
        assert!(updated.modified_timestamp >= created.modified_timestamp);

        assert_eq!(dao.budget(&path).unwrap().note, "");

        dao.delete_budget(&path).unwrap();
        assert!(dao.resolve_budget(created.id).unwrap_err().is_not_found());
    }
}
