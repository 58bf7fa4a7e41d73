//! A [`Store`] held entirely in memory.
//!
//! Used by the HTTP tests. It mirrors the PostgreSQL schema's behavior: cascading deletes,
//! the one-allocation-per-envelope-per-month index, and diesel's `NotFound` for rows that
//! don't exist under the given parent.

use chrono::{DateTime, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::db::DaoError;
use crate::models::account::Account;
use crate::models::allocation::Allocation;
use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::envelope::Envelope;
use crate::models::transaction::Transaction;
use crate::money::Money;
use crate::month::{start_of_month, Month};
use crate::request_io::{
    AccountUpdate, AllocationUpdate, BudgetUpdate, CategoryUpdate, EnvelopeUpdate, InputAccount,
    InputAllocation, InputBudget, InputCategory, InputEnvelope, InputTransaction,
    TransactionUpdate,
};
use crate::store::{
    AccountStore, AllocationStore, BudgetPath, BudgetStore, CategoryPath, CategoryStore,
    EnvelopePath, EnvelopeStore, Ledger, ResolvePath, Store, StoreHealth, TransactionStore,
    SAME_ACCOUNT_MSG,
};

#[derive(Default)]
struct Tables {
    budgets: Vec<Budget>,
    accounts: Vec<Account>,
    categories: Vec<Category>,
    envelopes: Vec<Envelope>,
    allocations: Vec<Allocation>,
    transactions: Vec<Transaction>,
}

impl Tables {
    fn category_in_budget(&self, budget_id: Uuid, category_id: Uuid) -> bool {
        self.categories
            .iter()
            .any(|c| c.id == category_id && c.budget_id == budget_id)
    }

    fn envelope_in_budget(&self, budget_id: Uuid, envelope_id: Uuid) -> bool {
        self.envelopes
            .iter()
            .any(|e| e.id == envelope_id && self.category_in_budget(budget_id, e.category_id))
    }

    fn account_in_budget(&self, budget_id: Uuid, account_id: Uuid) -> bool {
        self.accounts
            .iter()
            .any(|a| a.id == account_id && a.budget_id == budget_id)
    }

    fn category_created(&self, category_id: Uuid) -> Option<(DateTime<Utc>, Uuid)> {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| (c.created_timestamp, c.id))
    }

    fn allocation_taken(&self, envelope_id: Uuid, year: i32, month: i16, except: Uuid) -> bool {
        self.allocations.iter().any(|a| {
            a.envelope_id == envelope_id && a.year == year && a.month == month && a.id != except
        })
    }
}

fn not_found() -> DaoError {
    DaoError::QueryFailure(DieselError::NotFound)
}

fn unique_violation(message: &str) -> DaoError {
    DaoError::QueryFailure(DieselError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new(String::from(message)),
    ))
}

/// Timestamps on a single thread can repeat, which would make creation order ambiguous, so
/// each new row's timestamp is forced past the last one handed out.
fn next_timestamp(last: &mut DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    let next = if now > *last {
        now
    } else {
        *last + chrono::Duration::microseconds(1)
    };

    *last = next;
    next
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    last_timestamp: Mutex<DateTime<Utc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock leaves plain data behind, so the poison is ignored
        self.tables.lock().unwrap_or_else(|poisoned| {
            log::warn!("Memory store lock was poisoned; continuing with its data");
            poisoned.into_inner()
        })
    }

    fn now(&self) -> DateTime<Utc> {
        let mut last = self
            .last_timestamp
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        next_timestamp(&mut last)
    }
}

impl ResolvePath for MemoryStore {
    fn resolve_budget(&self, budget_id: Uuid) -> Result<BudgetPath, DaoError> {
        let tables = self.tables();

        if tables.budgets.iter().any(|b| b.id == budget_id) {
            Ok(BudgetPath::new(budget_id))
        } else {
            Err(not_found())
        }
    }

    fn resolve_category(
        &self,
        budget_id: Uuid,
        category_id: Uuid,
    ) -> Result<CategoryPath, DaoError> {
        if self.tables().category_in_budget(budget_id, category_id) {
            Ok(CategoryPath::new(budget_id, category_id))
        } else {
            Err(not_found())
        }
    }

    fn resolve_envelope(
        &self,
        budget_id: Uuid,
        category_id: Uuid,
        envelope_id: Uuid,
    ) -> Result<EnvelopePath, DaoError> {
        let tables = self.tables();

        let found = tables.category_in_budget(budget_id, category_id)
            && tables
                .envelopes
                .iter()
                .any(|e| e.id == envelope_id && e.category_id == category_id);

        if found {
            Ok(EnvelopePath::new(budget_id, category_id, envelope_id))
        } else {
            Err(not_found())
        }
    }
}

impl Ledger for MemoryStore {
    fn budget(&self, path: &BudgetPath) -> Result<Budget, DaoError> {
        self.tables()
            .budgets
            .iter()
            .find(|b| b.id == path.budget_id())
            .cloned()
            .ok_or_else(not_found)
    }

    fn envelope(&self, path: &EnvelopePath) -> Result<Envelope, DaoError> {
        self.tables()
            .envelopes
            .iter()
            .find(|e| e.id == path.envelope_id())
            .cloned()
            .ok_or_else(not_found)
    }

    fn account(&self, path: &BudgetPath, account_id: Uuid) -> Result<Account, DaoError> {
        self.tables()
            .accounts
            .iter()
            .find(|a| a.id == account_id && a.budget_id == path.budget_id())
            .cloned()
            .ok_or_else(not_found)
    }

    fn accounts_in_budget(&self, path: &BudgetPath) -> Result<Vec<Account>, DaoError> {
        Ok(self
            .tables()
            .accounts
            .iter()
            .filter(|a| a.budget_id == path.budget_id())
            .cloned()
            .collect())
    }

    fn envelopes_in_budget(&self, path: &BudgetPath) -> Result<Vec<Envelope>, DaoError> {
        let tables = self.tables();

        let mut in_budget: Vec<((DateTime<Utc>, Uuid), Envelope)> = tables
            .envelopes
            .iter()
            .filter(|e| tables.category_in_budget(path.budget_id(), e.category_id))
            .filter_map(|e| Some((tables.category_created(e.category_id)?, e.clone())))
            .collect();

        in_budget.sort_by(|(a_category, a), (b_category, b)| {
            a_category
                .cmp(b_category)
                .then(a.created_timestamp.cmp(&b.created_timestamp))
                .then(a.id.cmp(&b.id))
        });

        Ok(in_budget.into_iter().map(|(_, e)| e).collect())
    }

    fn first_activity_month(&self, envelope_id: Uuid) -> Result<Option<Month>, DaoError> {
        let tables = self.tables();

        let allocation_months = tables
            .allocations
            .iter()
            .filter(|a| a.envelope_id == envelope_id)
            .filter_map(|a| Month::new(a.year, u32::try_from(a.month).ok()?).ok());

        let transaction_months = tables
            .transactions
            .iter()
            .filter(|t| t.envelope_id == Some(envelope_id))
            .filter_map(|t| Month::try_from(t.date).ok());

        Ok(allocation_months.chain(transaction_months).min())
    }

    fn allocation_for(&self, envelope_id: Uuid, month: Month) -> Result<Option<Money>, DaoError> {
        Ok(self
            .tables()
            .allocations
            .iter()
            .find(|a| {
                a.envelope_id == envelope_id
                    && a.year == month.year()
                    && i64::from(a.month) == i64::from(month.month())
            })
            .map(|a| a.amount))
    }

    fn transactions_affecting(
        &self,
        envelope_id: Uuid,
        month: Month,
    ) -> Result<Vec<Transaction>, DaoError> {
        Ok(self
            .tables()
            .transactions
            .iter()
            .filter(|t| t.envelope_id == Some(envelope_id) && month.contains(&t.date))
            .cloned()
            .collect())
    }

    fn transactions_for_account(&self, account_id: Uuid) -> Result<Vec<Transaction>, DaoError> {
        Ok(self
            .tables()
            .transactions
            .iter()
            .filter(|t| t.touches_account(account_id))
            .cloned()
            .collect())
    }
}

impl BudgetStore for MemoryStore {
    fn create_budget(&self, budget: &InputBudget) -> Result<Budget, DaoError> {
        let now = self.now();

        let budget = Budget {
            id: Uuid::now_v7(),
            name: budget.name.clone(),
            note: budget.note.clone(),
            currency: budget.currency.clone(),
            created_timestamp: now,
            modified_timestamp: now,
        };

        self.tables().budgets.push(budget.clone());
        Ok(budget)
    }

    fn get_all_budgets(&self) -> Result<Vec<Budget>, DaoError> {
        Ok(self.tables().budgets.clone())
    }

    fn update_budget(&self, path: &BudgetPath, update: &BudgetUpdate) -> Result<Budget, DaoError> {
        let now = self.now();
        let mut tables = self.tables();

        let budget = tables
            .budgets
            .iter_mut()
            .find(|b| b.id == path.budget_id())
            .ok_or_else(not_found)?;

        if let Some(name) = &update.name {
            budget.name = name.clone();
        }
        if let Some(note) = &update.note {
            budget.note = note.clone();
        }
        if let Some(currency) = &update.currency {
            budget.currency = currency.clone();
        }
        budget.modified_timestamp = now;

        Ok(budget.clone())
    }

    fn delete_budget(&self, path: &BudgetPath) -> Result<(), DaoError> {
        let mut tables = self.tables();
        let budget_id = path.budget_id();

        let before = tables.budgets.len();
        tables.budgets.retain(|b| b.id != budget_id);
        if tables.budgets.len() == before {
            return Err(not_found());
        }

        let category_ids: Vec<Uuid> = tables
            .categories
            .iter()
            .filter(|c| c.budget_id == budget_id)
            .map(|c| c.id)
            .collect();
        let envelope_ids: Vec<Uuid> = tables
            .envelopes
            .iter()
            .filter(|e| category_ids.contains(&e.category_id))
            .map(|e| e.id)
            .collect();

        tables.accounts.retain(|a| a.budget_id != budget_id);
        tables.categories.retain(|c| c.budget_id != budget_id);
        tables.envelopes.retain(|e| !envelope_ids.contains(&e.id));
        tables
            .allocations
            .retain(|a| !envelope_ids.contains(&a.envelope_id));
        tables.transactions.retain(|t| t.budget_id != budget_id);

        Ok(())
    }
}

impl AccountStore for MemoryStore {
    fn create_account(
        &self,
        path: &BudgetPath,
        account: &InputAccount,
    ) -> Result<Account, DaoError> {
        let now = self.now();

        let account = Account {
            id: Uuid::now_v7(),
            budget_id: path.budget_id(),
            name: account.name.clone(),
            note: account.note.clone(),
            on_budget: account.on_budget,
            external: account.external,
            created_timestamp: now,
            modified_timestamp: now,
        };

        self.tables().accounts.push(account.clone());
        Ok(account)
    }

    fn update_account(
        &self,
        path: &BudgetPath,
        account_id: Uuid,
        update: &AccountUpdate,
    ) -> Result<Account, DaoError> {
        let now = self.now();
        let mut tables = self.tables();

        let account = tables
            .accounts
            .iter_mut()
            .find(|a| a.id == account_id && a.budget_id == path.budget_id())
            .ok_or_else(not_found)?;

        if let Some(name) = &update.name {
            account.name = name.clone();
        }
        if let Some(note) = &update.note {
            account.note = note.clone();
        }
        if let Some(on_budget) = update.on_budget {
            account.on_budget = on_budget;
        }
        if let Some(external) = update.external {
            account.external = external;
        }
        account.modified_timestamp = now;

        Ok(account.clone())
    }

    fn delete_account(&self, path: &BudgetPath, account_id: Uuid) -> Result<(), DaoError> {
        let mut tables = self.tables();

        let before = tables.accounts.len();
        tables
            .accounts
            .retain(|a| !(a.id == account_id && a.budget_id == path.budget_id()));

        if tables.accounts.len() == before {
            return Err(not_found());
        }

        Ok(())
    }
}

impl CategoryStore for MemoryStore {
    fn create_category(
        &self,
        path: &BudgetPath,
        category: &InputCategory,
    ) -> Result<Category, DaoError> {
        let now = self.now();

        let category = Category {
            id: Uuid::now_v7(),
            budget_id: path.budget_id(),
            name: category.name.clone(),
            note: category.note.clone(),
            created_timestamp: now,
            modified_timestamp: now,
        };

        self.tables().categories.push(category.clone());
        Ok(category)
    }

    fn get_category(&self, path: &CategoryPath) -> Result<Category, DaoError> {
        self.tables()
            .categories
            .iter()
            .find(|c| c.id == path.category_id())
            .cloned()
            .ok_or_else(not_found)
    }

    fn get_categories(&self, path: &BudgetPath) -> Result<Vec<Category>, DaoError> {
        Ok(self
            .tables()
            .categories
            .iter()
            .filter(|c| c.budget_id == path.budget_id())
            .cloned()
            .collect())
    }

    fn update_category(
        &self,
        path: &CategoryPath,
        update: &CategoryUpdate,
    ) -> Result<Category, DaoError> {
        let now = self.now();
        let mut tables = self.tables();

        let category = tables
            .categories
            .iter_mut()
            .find(|c| c.id == path.category_id() && c.budget_id == path.budget_id())
            .ok_or_else(not_found)?;

        if let Some(name) = &update.name {
            category.name = name.clone();
        }
        if let Some(note) = &update.note {
            category.note = note.clone();
        }
        category.modified_timestamp = now;

        Ok(category.clone())
    }

    fn delete_category(&self, path: &CategoryPath) -> Result<(), DaoError> {
        let mut tables = self.tables();
        let category_id = path.category_id();

        let before = tables.categories.len();
        tables
            .categories
            .retain(|c| !(c.id == category_id && c.budget_id == path.budget_id()));
        if tables.categories.len() == before {
            return Err(not_found());
        }

        let envelope_ids: Vec<Uuid> = tables
            .envelopes
            .iter()
            .filter(|e| e.category_id == category_id)
            .map(|e| e.id)
            .collect();

        tables.envelopes.retain(|e| e.category_id != category_id);
        tables
            .allocations
            .retain(|a| !envelope_ids.contains(&a.envelope_id));
        for transaction in tables.transactions.iter_mut() {
            if transaction
                .envelope_id
                .is_some_and(|id| envelope_ids.contains(&id))
            {
                transaction.envelope_id = None;
            }
        }

        Ok(())
    }
}

impl EnvelopeStore for MemoryStore {
    fn create_envelope(
        &self,
        path: &CategoryPath,
        envelope: &InputEnvelope,
    ) -> Result<Envelope, DaoError> {
        let now = self.now();

        let envelope = Envelope {
            id: Uuid::now_v7(),
            category_id: path.category_id(),
            name: envelope.name.clone(),
            note: envelope.note.clone(),
            created_timestamp: now,
            modified_timestamp: now,
        };

        self.tables().envelopes.push(envelope.clone());
        Ok(envelope)
    }

    fn get_envelopes(&self, path: &CategoryPath) -> Result<Vec<Envelope>, DaoError> {
        Ok(self
            .tables()
            .envelopes
            .iter()
            .filter(|e| e.category_id == path.category_id())
            .cloned()
            .collect())
    }

    fn update_envelope(
        &self,
        path: &EnvelopePath,
        update: &EnvelopeUpdate,
    ) -> Result<Envelope, DaoError> {
        let now = self.now();
        let mut tables = self.tables();

        if let Some(target_category_id) = update.category_id {
            if !tables.category_in_budget(path.budget_id(), target_category_id) {
                return Err(not_found());
            }
        }

        let envelope = tables
            .envelopes
            .iter_mut()
            .find(|e| e.id == path.envelope_id())
            .ok_or_else(not_found)?;

        if let Some(name) = &update.name {
            envelope.name = name.clone();
        }
        if let Some(note) = &update.note {
            envelope.note = note.clone();
        }
        if let Some(category_id) = update.category_id {
            envelope.category_id = category_id;
        }
        envelope.modified_timestamp = now;

        Ok(envelope.clone())
    }

    fn delete_envelope(&self, path: &EnvelopePath) -> Result<(), DaoError> {
        let mut tables = self.tables();
        let envelope_id = path.envelope_id();

        let before = tables.envelopes.len();
        tables
            .envelopes
            .retain(|e| !(e.id == envelope_id && e.category_id == path.category_id()));
        if tables.envelopes.len() == before {
            return Err(not_found());
        }

        tables.allocations.retain(|a| a.envelope_id != envelope_id);
        for transaction in tables.transactions.iter_mut() {
            if transaction.envelope_id == Some(envelope_id) {
                transaction.envelope_id = None;
            }
        }

        Ok(())
    }
}

impl AllocationStore for MemoryStore {
    fn create_allocation(
        &self,
        path: &EnvelopePath,
        allocation: &InputAllocation,
    ) -> Result<Allocation, DaoError> {
        let now = self.now();
        let mut tables = self.tables();

        if tables.allocation_taken(
            path.envelope_id(),
            allocation.year,
            allocation.month,
            Uuid::nil(),
        ) {
            return Err(unique_violation("allocation_envelope_month_unique"));
        }

        let allocation = Allocation {
            id: Uuid::now_v7(),
            envelope_id: path.envelope_id(),
            month: allocation.month,
            year: allocation.year,
            amount: allocation.amount,
            created_timestamp: now,
            modified_timestamp: now,
        };

        tables.allocations.push(allocation.clone());
        Ok(allocation)
    }

    fn get_allocation(
        &self,
        path: &EnvelopePath,
        allocation_id: Uuid,
    ) -> Result<Allocation, DaoError> {
        self.tables()
            .allocations
            .iter()
            .find(|a| a.id == allocation_id && a.envelope_id == path.envelope_id())
            .cloned()
            .ok_or_else(not_found)
    }

    fn get_allocations(&self, path: &EnvelopePath) -> Result<Vec<Allocation>, DaoError> {
        let mut allocations: Vec<Allocation> = self
            .tables()
            .allocations
            .iter()
            .filter(|a| a.envelope_id == path.envelope_id())
            .cloned()
            .collect();

        allocations.sort_by_key(|a| (a.year, a.month));
        Ok(allocations)
    }

    fn update_allocation(
        &self,
        path: &EnvelopePath,
        allocation_id: Uuid,
        update: &AllocationUpdate,
    ) -> Result<Allocation, DaoError> {
        let now = self.now();
        let mut tables = self.tables();

        let existing = tables
            .allocations
            .iter()
            .find(|a| a.id == allocation_id && a.envelope_id == path.envelope_id())
            .cloned()
            .ok_or_else(not_found)?;

        let year = update.year.unwrap_or(existing.year);
        let month = update.month.unwrap_or(existing.month);

        if tables.allocation_taken(path.envelope_id(), year, month, allocation_id) {
            return Err(unique_violation("allocation_envelope_month_unique"));
        }

        let allocation = tables
            .allocations
            .iter_mut()
            .find(|a| a.id == allocation_id)
            .ok_or_else(not_found)?;

        allocation.year = year;
        allocation.month = month;
        if let Some(amount) = update.amount {
            allocation.amount = amount;
        }
        allocation.modified_timestamp = now;

        Ok(allocation.clone())
    }

    fn delete_allocation(
        &self,
        path: &EnvelopePath,
        allocation_id: Uuid,
    ) -> Result<(), DaoError> {
        let mut tables = self.tables();

        let before = tables.allocations.len();
        tables
            .allocations
            .retain(|a| !(a.id == allocation_id && a.envelope_id == path.envelope_id()));

        if tables.allocations.len() == before {
            return Err(not_found());
        }

        Ok(())
    }
}

impl TransactionStore for MemoryStore {
    fn create_transaction(
        &self,
        path: &BudgetPath,
        transaction: &InputTransaction,
    ) -> Result<Transaction, DaoError> {
        if transaction.source_account_id == transaction.destination_account_id {
            return Err(DaoError::CannotRunQuery(SAME_ACCOUNT_MSG));
        }

        let now = self.now();
        let mut tables = self.tables();
        let budget_id = path.budget_id();

        let accounts_found = tables.account_in_budget(budget_id, transaction.source_account_id)
            && tables.account_in_budget(budget_id, transaction.destination_account_id);
        let envelope_found = transaction
            .envelope_id
            .map_or(true, |id| tables.envelope_in_budget(budget_id, id));

        if !accounts_found || !envelope_found {
            return Err(not_found());
        }

        let transaction = Transaction {
            id: Uuid::now_v7(),
            budget_id,
            date: transaction.date,
            amount: transaction.amount,
            note: transaction.note.clone(),
            source_account_id: transaction.source_account_id,
            destination_account_id: transaction.destination_account_id,
            envelope_id: transaction.envelope_id,
            reconciled_source: transaction.reconciled_source,
            reconciled_destination: transaction.reconciled_destination,
            available_from: transaction.available_from.map(start_of_month),
            import_hash: transaction.import_hash.clone(),
            created_timestamp: now,
            modified_timestamp: now,
        };

        tables.transactions.push(transaction.clone());
        Ok(transaction)
    }

    fn get_transaction(
        &self,
        path: &BudgetPath,
        transaction_id: Uuid,
    ) -> Result<Transaction, DaoError> {
        self.tables()
            .transactions
            .iter()
            .find(|t| t.id == transaction_id && t.budget_id == path.budget_id())
            .cloned()
            .ok_or_else(not_found)
    }

    fn get_transactions(&self, path: &BudgetPath) -> Result<Vec<Transaction>, DaoError> {
        let mut transactions: Vec<Transaction> = self
            .tables()
            .transactions
            .iter()
            .filter(|t| t.budget_id == path.budget_id())
            .cloned()
            .collect();

        transactions.sort_by_key(|t| (t.date, t.id));
        Ok(transactions)
    }

    fn update_transaction(
        &self,
        path: &BudgetPath,
        transaction_id: Uuid,
        update: &TransactionUpdate,
    ) -> Result<Transaction, DaoError> {
        let now = self.now();
        let mut tables = self.tables();
        let budget_id = path.budget_id();

        let existing = tables
            .transactions
            .iter()
            .find(|t| t.id == transaction_id && t.budget_id == budget_id)
            .cloned()
            .ok_or_else(not_found)?;

        let source = update.source_account_id.unwrap_or(existing.source_account_id);
        let destination = update
            .destination_account_id
            .unwrap_or(existing.destination_account_id);

        if source == destination {
            return Err(DaoError::CannotRunQuery(SAME_ACCOUNT_MSG));
        }

        let accounts_found = [update.source_account_id, update.destination_account_id]
            .into_iter()
            .flatten()
            .all(|id| tables.account_in_budget(budget_id, id));
        let envelope_found = match update.envelope_id {
            Some(Some(id)) => tables.envelope_in_budget(budget_id, id),
            _ => true,
        };

        if !accounts_found || !envelope_found {
            return Err(not_found());
        }

        let transaction = tables
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(not_found)?;

        if let Some(date) = update.date {
            transaction.date = date;
        }
        if let Some(amount) = update.amount {
            transaction.amount = amount;
        }
        if let Some(note) = &update.note {
            transaction.note = note.clone();
        }
        transaction.source_account_id = source;
        transaction.destination_account_id = destination;
        if let Some(envelope_id) = update.envelope_id {
            transaction.envelope_id = envelope_id;
        }
        if let Some(reconciled) = update.reconciled_source {
            transaction.reconciled_source = reconciled;
        }
        if let Some(reconciled) = update.reconciled_destination {
            transaction.reconciled_destination = reconciled;
        }
        if let Some(available_from) = update.available_from {
            transaction.available_from = available_from.map(start_of_month);
        }
        if let Some(import_hash) = &update.import_hash {
            transaction.import_hash = import_hash.clone();
        }
        transaction.modified_timestamp = now;

        Ok(transaction.clone())
    }

    fn delete_transaction(
        &self,
        path: &BudgetPath,
        transaction_id: Uuid,
    ) -> Result<(), DaoError> {
        let mut tables = self.tables();

        let before = tables.transactions.len();
        tables
            .transactions
            .retain(|t| !(t.id == transaction_id && t.budget_id == path.budget_id()));

        if tables.transactions.len() == before {
            return Err(not_found());
        }

        Ok(())
    }
}

impl Store for MemoryStore {
    fn health(&self) -> StoreHealth {
        StoreHealth::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use std::str::FromStr;

    fn budget_with_envelope(store: &MemoryStore) -> EnvelopePath {
        let budget = store
            .create_budget(&InputBudget {
                name: String::from("Household"),
                note: String::new(),
                currency: String::from("€"),
            })
            .unwrap();
        let budget_path = store.resolve_budget(budget.id).unwrap();

        let category = store
            .create_category(
                &budget_path,
                &InputCategory {
                    name: String::from("Food"),
                    note: String::new(),
                },
            )
            .unwrap();
        let category_path = store.resolve_category(budget.id, category.id).unwrap();

        let envelope = store
            .create_envelope(
                &category_path,
                &InputEnvelope {
                    name: String::from("Groceries"),
                    note: String::new(),
                },
            )
            .unwrap();

        store
            .resolve_envelope(budget.id, category.id, envelope.id)
            .unwrap()
    }

    #[test]
    fn test_duplicate_allocation_is_unique_violation() {
        let store = MemoryStore::new();
        let path = budget_with_envelope(&store);

        let input = InputAllocation {
            month: 3,
            year: 2022,
            amount: Money::from_str("16.17").unwrap(),
        };

        let first = store.create_allocation(&path, &input).unwrap();
        assert!(store
            .create_allocation(&path, &input)
            .unwrap_err()
            .is_unique_violation());

        // Updating an allocation to its own month is not a conflict
        let same = store
            .update_allocation(
                &path,
                first.id,
                &AllocationUpdate {
                    month: Some(3),
                    amount: Some(Money::from(20)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(same.amount, Money::from(20));
    }

    #[test]
    fn test_envelope_under_wrong_category_is_not_found() {
        let store = MemoryStore::new();
        let path = budget_with_envelope(&store);

        let other_category = store
            .create_category(
                &path.budget(),
                &InputCategory {
                    name: String::from("Other"),
                    note: String::new(),
                },
            )
            .unwrap();

        assert!(store
            .resolve_envelope(path.budget_id(), other_category.id, path.envelope_id())
            .unwrap_err()
            .is_not_found());
        assert!(store
            .resolve_envelope(Uuid::now_v7(), path.category_id(), path.envelope_id())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_envelope_detaches_transactions() {
        let store = MemoryStore::new();
        let path = budget_with_envelope(&store);
        let budget_path = path.budget();

        let checking = store
            .create_account(
                &budget_path,
                &InputAccount {
                    name: String::from("Checking"),
                    note: String::new(),
                    on_budget: true,
                    external: false,
                },
            )
            .unwrap();
        let shop = store
            .create_account(
                &budget_path,
                &InputAccount {
                    name: String::from("Shop"),
                    note: String::new(),
                    on_budget: false,
                    external: true,
                },
            )
            .unwrap();

        let transaction = store
            .create_transaction(
                &budget_path,
                &InputTransaction {
                    date: Utc.with_ymd_and_hms(2022, 1, 10, 0, 0, 0).unwrap(),
                    amount: Money::from(10),
                    note: String::new(),
                    source_account_id: checking.id,
                    destination_account_id: shop.id,
                    envelope_id: Some(path.envelope_id()),
                    reconciled_source: false,
                    reconciled_destination: false,
                    available_from: None,
                    import_hash: None,
                },
            )
            .unwrap();

        store
            .create_allocation(
                &path,
                &InputAllocation {
                    month: 1,
                    year: 2022,
                    amount: Money::from(5),
                },
            )
            .unwrap();

        store.delete_envelope(&path).unwrap();

        let kept = store.get_transaction(&budget_path, transaction.id).unwrap();
        assert_eq!(kept.envelope_id, None);
        assert_eq!(store.first_activity_month(path.envelope_id()).unwrap(), None);
    }

    #[test]
    fn test_delete_budget_cascades() {
        let store = MemoryStore::new();
        let path = budget_with_envelope(&store);

        store.delete_budget(&path.budget()).unwrap();

        assert!(store.get_all_budgets().unwrap().is_empty());
        assert!(store
            .resolve_category(path.budget_id(), path.category_id())
            .unwrap_err()
            .is_not_found());
        assert!(store
            .delete_budget(&path.budget())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_timestamps_are_strictly_increasing() {
        let mut last = DateTime::<Utc>::MIN_UTC;
        let first = next_timestamp(&mut last);
        let second = next_timestamp(&mut last);

        assert!(second > first);
    }
}
