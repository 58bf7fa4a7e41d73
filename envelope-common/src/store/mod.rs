//! The storage seams of the backend.
//!
//! Handlers and calculators only talk to these traits. [`crate::db::Dao`] implements them on
//! top of PostgreSQL and, with the `memory-store` feature, [`memory::MemoryStore`] implements
//! them in memory. Both report a missing row as
//! `DaoError::QueryFailure(diesel::result::Error::NotFound)` and a uniqueness conflict as
//! `DaoError::QueryFailure(diesel::result::Error::DatabaseError(UniqueViolation, _))`, so
//! callers handle either backend the same way.

use uuid::Uuid;

use crate::db::DaoError;
use crate::models::account::Account;
use crate::models::allocation::Allocation;
use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::envelope::Envelope;
use crate::models::transaction::Transaction;
use crate::money::Money;
use crate::month::Month;
use crate::request_io::{
    AccountUpdate, AllocationUpdate, BudgetUpdate, CategoryUpdate, EnvelopeUpdate, InputAccount,
    InputAllocation, InputBudget, InputCategory, InputEnvelope, InputTransaction,
    TransactionUpdate,
};

#[cfg(any(test, feature = "memory-store"))]
pub mod memory;

/// A budget that is known to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetPath {
    budget_id: Uuid,
}

/// A category that is known to exist and to belong to `budget_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryPath {
    budget_id: Uuid,
    category_id: Uuid,
}

/// An envelope that is known to exist and to sit under `category_id` of `budget_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvelopePath {
    budget_id: Uuid,
    category_id: Uuid,
    envelope_id: Uuid,
}

impl BudgetPath {
    pub(crate) fn new(budget_id: Uuid) -> Self {
        Self { budget_id }
    }

    pub fn budget_id(&self) -> Uuid {
        self.budget_id
    }
}

impl CategoryPath {
    pub(crate) fn new(budget_id: Uuid, category_id: Uuid) -> Self {
        Self {
            budget_id,
            category_id,
        }
    }

    pub fn budget_id(&self) -> Uuid {
        self.budget_id
    }

    pub fn category_id(&self) -> Uuid {
        self.category_id
    }

    pub fn budget(&self) -> BudgetPath {
        BudgetPath::new(self.budget_id)
    }
}

impl EnvelopePath {
    pub(crate) fn new(budget_id: Uuid, category_id: Uuid, envelope_id: Uuid) -> Self {
        Self {
            budget_id,
            category_id,
            envelope_id,
        }
    }

    pub fn budget_id(&self) -> Uuid {
        self.budget_id
    }

    pub fn category_id(&self) -> Uuid {
        self.category_id
    }

    pub fn envelope_id(&self) -> Uuid {
        self.envelope_id
    }

    pub fn budget(&self) -> BudgetPath {
        BudgetPath::new(self.budget_id)
    }

    pub fn href(&self) -> String {
        crate::request_io::envelope_href(self.budget_id, self.category_id, self.envelope_id)
    }
}

/// Checks a chain of parent IDs from a request path, once, before anything is read or written
/// beneath it. A child that exists under a different parent is reported as not found.
pub trait ResolvePath {
    fn resolve_budget(&self, budget_id: Uuid) -> Result<BudgetPath, DaoError>;

    fn resolve_category(&self, budget_id: Uuid, category_id: Uuid)
        -> Result<CategoryPath, DaoError>;

    fn resolve_envelope(
        &self,
        budget_id: Uuid,
        category_id: Uuid,
        envelope_id: Uuid,
    ) -> Result<EnvelopePath, DaoError>;
}

/// The read-only queries the balance calculators are built on.
pub trait Ledger: ResolvePath {
    fn budget(&self, path: &BudgetPath) -> Result<Budget, DaoError>;

    fn envelope(&self, path: &EnvelopePath) -> Result<Envelope, DaoError>;

    fn account(&self, path: &BudgetPath, account_id: Uuid) -> Result<Account, DaoError>;

    fn accounts_in_budget(&self, path: &BudgetPath) -> Result<Vec<Account>, DaoError>;

    /// Every envelope of the budget, ordered by category creation and then by envelope
    /// creation.
    fn envelopes_in_budget(&self, path: &BudgetPath) -> Result<Vec<Envelope>, DaoError>;

    /// The earliest month in which an allocation or a transaction references the envelope.
    fn first_activity_month(&self, envelope_id: Uuid) -> Result<Option<Month>, DaoError>;

    fn allocation_for(&self, envelope_id: Uuid, month: Month) -> Result<Option<Money>, DaoError>;

    /// Transactions that reference the envelope and are dated within `month`.
    fn transactions_affecting(
        &self,
        envelope_id: Uuid,
        month: Month,
    ) -> Result<Vec<Transaction>, DaoError>;

    /// Transactions where the account is the source or the destination.
    fn transactions_for_account(&self, account_id: Uuid) -> Result<Vec<Transaction>, DaoError>;
}

pub trait BudgetStore {
    fn create_budget(&self, budget: &InputBudget) -> Result<Budget, DaoError>;

    fn get_all_budgets(&self) -> Result<Vec<Budget>, DaoError>;

    fn update_budget(&self, path: &BudgetPath, update: &BudgetUpdate) -> Result<Budget, DaoError>;

    /// Also deletes everything beneath the budget.
    fn delete_budget(&self, path: &BudgetPath) -> Result<(), DaoError>;
}

pub trait AccountStore {
    fn create_account(
        &self,
        path: &BudgetPath,
        account: &InputAccount,
    ) -> Result<Account, DaoError>;

    fn update_account(
        &self,
        path: &BudgetPath,
        account_id: Uuid,
        update: &AccountUpdate,
    ) -> Result<Account, DaoError>;

    /// Transactions that reference the account are left in place.
    fn delete_account(&self, path: &BudgetPath, account_id: Uuid) -> Result<(), DaoError>;
}

pub trait CategoryStore {
    fn create_category(
        &self,
        path: &BudgetPath,
        category: &InputCategory,
    ) -> Result<Category, DaoError>;

    fn get_category(&self, path: &CategoryPath) -> Result<Category, DaoError>;

    fn get_categories(&self, path: &BudgetPath) -> Result<Vec<Category>, DaoError>;

    fn update_category(
        &self,
        path: &CategoryPath,
        update: &CategoryUpdate,
    ) -> Result<Category, DaoError>;

    /// Also deletes the category's envelopes and their allocations.
    fn delete_category(&self, path: &CategoryPath) -> Result<(), DaoError>;
}

pub trait EnvelopeStore {
    fn create_envelope(
        &self,
        path: &CategoryPath,
        envelope: &InputEnvelope,
    ) -> Result<Envelope, DaoError>;

    fn get_envelopes(&self, path: &CategoryPath) -> Result<Vec<Envelope>, DaoError>;

    /// Moving the envelope to a category of another budget is reported as not found.
    fn update_envelope(
        &self,
        path: &EnvelopePath,
        update: &EnvelopeUpdate,
    ) -> Result<Envelope, DaoError>;

    /// Also deletes the envelope's allocations. Its transactions are kept without an envelope.
    fn delete_envelope(&self, path: &EnvelopePath) -> Result<(), DaoError>;
}

pub trait AllocationStore {
    fn create_allocation(
        &self,
        path: &EnvelopePath,
        allocation: &InputAllocation,
    ) -> Result<Allocation, DaoError>;

    fn get_allocation(
        &self,
        path: &EnvelopePath,
        allocation_id: Uuid,
    ) -> Result<Allocation, DaoError>;

    fn get_allocations(&self, path: &EnvelopePath) -> Result<Vec<Allocation>, DaoError>;

    fn update_allocation(
        &self,
        path: &EnvelopePath,
        allocation_id: Uuid,
        update: &AllocationUpdate,
    ) -> Result<Allocation, DaoError>;

    fn delete_allocation(&self, path: &EnvelopePath, allocation_id: Uuid)
        -> Result<(), DaoError>;
}

pub trait TransactionStore {
    /// The accounts and the envelope must belong to the budget; otherwise this is not found.
    fn create_transaction(
        &self,
        path: &BudgetPath,
        transaction: &InputTransaction,
    ) -> Result<Transaction, DaoError>;

    fn get_transaction(
        &self,
        path: &BudgetPath,
        transaction_id: Uuid,
    ) -> Result<Transaction, DaoError>;

    fn get_transactions(&self, path: &BudgetPath) -> Result<Vec<Transaction>, DaoError>;

    fn update_transaction(
        &self,
        path: &BudgetPath,
        transaction_id: Uuid,
        update: &TransactionUpdate,
    ) -> Result<Transaction, DaoError>;

    fn delete_transaction(&self, path: &BudgetPath, transaction_id: Uuid)
        -> Result<(), DaoError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreHealth {
    pub connections: u32,
    pub idle_connections: u32,
}

pub trait Store:
    Ledger
    + BudgetStore
    + AccountStore
    + CategoryStore
    + EnvelopeStore
    + AllocationStore
    + TransactionStore
    + Send
    + Sync
{
    fn health(&self) -> StoreHealth;
}

pub(crate) const SAME_ACCOUNT_MSG: &str = "Source and destination accounts must be different";
