//! Ledger Module
//!
//! Accounts, transactions, savings and the per-user aggregates computed
//! from them.

mod aggregates;
mod models;
mod store;

pub use aggregates::{
    expense_records, spending_by_category, total_balance, total_expense, ExpenseRecord,
};
pub use models::{
    Account, AccountType, AccountUpdate, NewAccount, NewSavingsAccount, NewSavingsTransaction,
    NewTransaction, SavingsAccount, SavingsTransaction, SavingsTransactionKind,
    SavingsTransactionUpdate, Transaction, TransactionKind, UserId,
};
pub use store::{LedgerStore, MemoryLedger};
