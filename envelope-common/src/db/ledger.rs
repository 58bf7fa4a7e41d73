use chrono::{DateTime, Utc};
use diesel::{
    dsl, BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl,
};
use uuid::Uuid;

use crate::db::{Dao, DaoError};
use crate::models::account::Account;
use crate::models::budget::Budget;
use crate::models::envelope::Envelope;
use crate::models::transaction::Transaction;
use crate::money::Money;
use crate::month::Month;
use crate::schema::accounts as account_fields;
use crate::schema::accounts::dsl::accounts;
use crate::schema::allocations as allocation_fields;
use crate::schema::allocations::dsl::allocations;
use crate::schema::budgets as budget_fields;
use crate::schema::budgets::dsl::budgets;
use crate::schema::categories as category_fields;
use crate::schema::categories::dsl::categories;
use crate::schema::envelopes as envelope_fields;
use crate::schema::envelopes::dsl::envelopes;
use crate::schema::transactions as transaction_fields;
use crate::schema::transactions::dsl::transactions;
use crate::store::{BudgetPath, CategoryPath, EnvelopePath, Ledger, ResolvePath};

impl ResolvePath for Dao {
    fn resolve_budget(&self, budget_id: Uuid) -> Result<BudgetPath, DaoError> {
        let id = budgets
            .find(budget_id)
            .select(budget_fields::id)
            .get_result::<Uuid>(&mut self.conn()?)?;

        Ok(BudgetPath::new(id))
    }

    fn resolve_category(
        &self,
        budget_id: Uuid,
        category_id: Uuid,
    ) -> Result<CategoryPath, DaoError> {
        let id = categories
            .select(category_fields::id)
            .filter(
                category_fields::id
                    .eq(category_id)
                    .and(category_fields::budget_id.eq(budget_id)),
            )
            .get_result::<Uuid>(&mut self.conn()?)?;

        Ok(CategoryPath::new(budget_id, id))
    }

    fn resolve_envelope(
        &self,
        budget_id: Uuid,
        category_id: Uuid,
        envelope_id: Uuid,
    ) -> Result<EnvelopePath, DaoError> {
        let id = envelopes
            .inner_join(categories)
            .select(envelope_fields::id)
            .filter(
                envelope_fields::id
                    .eq(envelope_id)
                    .and(envelope_fields::category_id.eq(category_id))
                    .and(category_fields::budget_id.eq(budget_id)),
            )
            .get_result::<Uuid>(&mut self.conn()?)?;

        Ok(EnvelopePath::new(budget_id, category_id, id))
    }
}

impl Ledger for Dao {
    fn budget(&self, path: &BudgetPath) -> Result<Budget, DaoError> {
        Ok(budgets
            .find(path.budget_id())
            .get_result::<Budget>(&mut self.conn()?)?)
    }

    fn envelope(&self, path: &EnvelopePath) -> Result<Envelope, DaoError> {
        Ok(envelopes
            .find(path.envelope_id())
            .get_result::<Envelope>(&mut self.conn()?)?)
    }

    fn account(&self, path: &BudgetPath, account_id: Uuid) -> Result<Account, DaoError> {
        Ok(accounts
            .filter(
                account_fields::id
                    .eq(account_id)
                    .and(account_fields::budget_id.eq(path.budget_id())),
            )
            .get_result::<Account>(&mut self.conn()?)?)
    }

    fn accounts_in_budget(&self, path: &BudgetPath) -> Result<Vec<Account>, DaoError> {
        Ok(accounts
            .filter(account_fields::budget_id.eq(path.budget_id()))
            .order((account_fields::created_timestamp, account_fields::id))
            .load::<Account>(&mut self.conn()?)?)
    }

    fn envelopes_in_budget(&self, path: &BudgetPath) -> Result<Vec<Envelope>, DaoError> {
        Ok(envelopes
            .inner_join(categories)
            .filter(category_fields::budget_id.eq(path.budget_id()))
            .order((
                category_fields::created_timestamp,
                category_fields::id,
                envelope_fields::created_timestamp,
                envelope_fields::id,
            ))
            .select(envelope_fields::all_columns)
            .load::<Envelope>(&mut self.conn()?)?)
    }

    fn first_activity_month(&self, envelope_id: Uuid) -> Result<Option<Month>, DaoError> {
        let mut db_connection = self.conn()?;

        let first_allocation = allocations
            .select((allocation_fields::year, allocation_fields::month))
            .filter(allocation_fields::envelope_id.eq(envelope_id))
            .order((allocation_fields::year.asc(), allocation_fields::month.asc()))
            .first::<(i32, i16)>(&mut db_connection)
            .optional()?;

        let first_allocation = match first_allocation {
            Some((year, month)) => {
                let month = u32::try_from(month)
                    .ok()
                    .and_then(|m| Month::new(year, m).ok())
                    .ok_or(DaoError::CannotRunQuery("Stored allocation month is invalid"))?;
                Some(month)
            }
            None => None,
        };

        let first_transaction = transactions
            .select(dsl::min(transaction_fields::date))
            .filter(transaction_fields::envelope_id.eq(envelope_id))
            .get_result::<Option<DateTime<Utc>>>(&mut db_connection)?
            .map(Month::try_from)
            .transpose()
            .map_err(|_| DaoError::CannotRunQuery("Stored transaction date is out of range"))?;

        Ok(match (first_allocation, first_transaction) {
            (Some(a), Some(t)) => Some(a.min(t)),
            (a, t) => a.or(t),
        })
    }

    fn allocation_for(&self, envelope_id: Uuid, month: Month) -> Result<Option<Money>, DaoError> {
        Ok(allocations
            .select(allocation_fields::amount)
            .filter(
                allocation_fields::envelope_id
                    .eq(envelope_id)
                    .and(allocation_fields::year.eq(month.year()))
                    .and(allocation_fields::month.eq(month.month() as i16)),
            )
            .first::<Money>(&mut self.conn()?)
            .optional()?)
    }

    fn transactions_affecting(
        &self,
        envelope_id: Uuid,
        month: Month,
    ) -> Result<Vec<Transaction>, DaoError> {
        Ok(transactions
            .filter(
                transaction_fields::envelope_id
                    .eq(envelope_id)
                    .and(transaction_fields::date.ge(month.start()))
                    .and(transaction_fields::date.lt(month.end())),
            )
            .order((transaction_fields::date, transaction_fields::id))
            .load::<Transaction>(&mut self.conn()?)?)
    }

    fn transactions_for_account(&self, account_id: Uuid) -> Result<Vec<Transaction>, DaoError> {
        Ok(transactions
            .filter(
                transaction_fields::source_account_id
                    .eq(account_id)
                    .or(transaction_fields::destination_account_id.eq(account_id)),
            )
            .order((transaction_fields::date, transaction_fields::id))
            .load::<Transaction>(&mut self.conn()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::budget::tests::generate_budget;
    use crate::db::category::tests::generate_category;
    use crate::db::envelope::tests::generate_envelope;
    use crate::db::test_pool;

    #[test]
    #[ignore]
    fn test_envelopes_in_budget_follow_category_order() {
        let dao = test_pool::dao();
        let budget_id = generate_budget().unwrap().id;
        let path = dao.resolve_budget(budget_id).unwrap();

        let first_category = generate_category(&path).unwrap();
        let second_category = generate_category(&path).unwrap();

        let second_path = dao.resolve_category(budget_id, second_category.id).unwrap();
        let first_path = dao.resolve_category(budget_id, first_category.id).unwrap();

        let late = generate_envelope(&second_path).unwrap();
        let early = generate_envelope(&first_path).unwrap();

        let ids: Vec<Uuid> = dao
            .envelopes_in_budget(&path)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec![early.id, late.id]);
        assert_eq!(dao.first_activity_month(early.id).unwrap(), None);
    }

    #[test]
    #[ignore]
    fn test_resolve_missing_budget() {
        let dao = test_pool::dao();
        assert!(dao.resolve_budget(Uuid::now_v7()).unwrap_err().is_not_found());
    }
}
