use chrono::Utc;
use diesel::{BoolExpressionMethods, ExpressionMethods, RunQueryDsl};
use uuid::Uuid;

use crate::db::{Dao, DaoError};
use crate::models::account::{Account, AccountChangeset, NewAccount};
use crate::request_io::{AccountUpdate, InputAccount};
use crate::schema::accounts as account_fields;
use crate::schema::accounts::dsl::accounts;
use crate::store::{AccountStore, BudgetPath};

impl AccountStore for Dao {
    fn create_account(
        &self,
        path: &BudgetPath,
        account: &InputAccount,
    ) -> Result<Account, DaoError> {
        let now = Utc::now();

        let new_account = NewAccount {
            id: Uuid::now_v7(),
            budget_id: path.budget_id(),
            name: &account.name,
            note: &account.note,
            on_budget: account.on_budget,
            external: account.external,
            created_timestamp: now,
            modified_timestamp: now,
        };

        Ok(diesel::insert_into(accounts)
            .values(&new_account)
            .get_result::<Account>(&mut self.conn()?)?)
    }

    fn update_account(
        &self,
        path: &BudgetPath,
        account_id: Uuid,
        update: &AccountUpdate,
    ) -> Result<Account, DaoError> {
        let changeset = AccountChangeset {
            name: update.name.as_deref(),
            note: update.note.as_deref(),
            on_budget: update.on_budget,
            external: update.external,
            modified_timestamp: Utc::now(),
        };

        Ok(diesel::update(accounts)
            .filter(
                account_fields::id
                    .eq(account_id)
                    .and(account_fields::budget_id.eq(path.budget_id())),
            )
            .set(&changeset)
            .get_result::<Account>(&mut self.conn()?)?)
    }

    fn delete_account(&self, path: &BudgetPath, account_id: Uuid) -> Result<(), DaoError> {
        let deleted = diesel::delete(accounts)
            .filter(
                account_fields::id
                    .eq(account_id)
                    .and(account_fields::budget_id.eq(path.budget_id())),
            )
            .execute(&mut self.conn()?)?;

        if deleted == 0 {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        Ok(())
    }
}
