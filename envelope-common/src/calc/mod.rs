//! Derived figures computed from the ledger on every read. Nothing here is stored.

use std::fmt;

use crate::db::DaoError;
use crate::month::MonthError;

mod account_balance;
mod budget_month;
mod envelope_month;

#[cfg(test)]
pub(crate) mod fixture;

pub use account_balance::{account_balance, accounts_with_balances, balance_for};
pub use budget_month::budget_month;
pub use envelope_month::envelope_month;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Budget,
    Account,
    Envelope,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Budget => write!(f, "Budget"),
            ResourceKind::Account => write!(f, "Account"),
            ResourceKind::Envelope => write!(f, "Envelope"),
        }
    }
}

#[derive(Debug)]
pub enum CalcError {
    InvalidMonth(MonthError),
    NotFound(ResourceKind),
    Store(DaoError),
}

impl std::error::Error for CalcError {}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::InvalidMonth(e) => write!(f, "CalcError: Invalid month: {e}"),
            CalcError::NotFound(kind) => write!(f, "CalcError: {kind} not found"),
            CalcError::Store(e) => write!(f, "CalcError: {e}"),
        }
    }
}

impl From<MonthError> for CalcError {
    fn from(error: MonthError) -> Self {
        CalcError::InvalidMonth(error)
    }
}

impl CalcError {
    /// Maps a store error, turning a missing row into `NotFound(kind)`.
    pub(crate) fn from_store(kind: ResourceKind) -> impl Fn(DaoError) -> CalcError {
        move |error| {
            if error.is_not_found() {
                CalcError::NotFound(kind)
            } else {
                CalcError::Store(error)
            }
        }
    }
}
