use uuid::Uuid;

use crate::calc::{CalcError, ResourceKind};
use crate::db::DaoError;
use crate::models::account::Account;
use crate::models::transaction::Transaction;
use crate::request_io::AccountBalance;
use crate::store::{BudgetPath, Ledger};

/// Sums the transactions of an account. Money leaving the account is subtracted and money
/// arriving is added; the reconciled figure only counts the sides marked reconciled.
pub fn balance_for(account_id: Uuid, transactions: &[Transaction]) -> AccountBalance {
    let mut balance = AccountBalance::default();

    for transaction in transactions {
        if transaction.source_account_id == account_id {
            balance.balance -= transaction.amount;
            if transaction.reconciled_source {
                balance.reconciled_balance -= transaction.amount;
            }
        }

        if transaction.destination_account_id == account_id {
            balance.balance += transaction.amount;
            if transaction.reconciled_destination {
                balance.reconciled_balance += transaction.amount;
            }
        }
    }

    balance
}

pub fn account_balance<L: Ledger + ?Sized>(
    ledger: &L,
    budget_id: Uuid,
    account_id: Uuid,
) -> Result<(Account, AccountBalance), CalcError> {
    let not_found = CalcError::from_store(ResourceKind::Account);

    let path = ledger.resolve_budget(budget_id).map_err(&not_found)?;
    let account = ledger.account(&path, account_id).map_err(&not_found)?;
    let transactions = ledger
        .transactions_for_account(account.id)
        .map_err(CalcError::Store)?;

    let balance = balance_for(account.id, &transactions);
    Ok((account, balance))
}

/// Every account of the budget with its balance.
pub fn accounts_with_balances<L: Ledger + ?Sized>(
    ledger: &L,
    path: &BudgetPath,
) -> Result<Vec<(Account, AccountBalance)>, DaoError> {
    ledger
        .accounts_in_budget(path)?
        .into_iter()
        .map(|account| {
            let transactions = ledger.transactions_for_account(account.id)?;
            let balance = balance_for(account.id, &transactions);
            Ok((account, balance))
        })
        .collect()
}
