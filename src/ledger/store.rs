//! Ledger Store
//!
//! Persistence interface for accounts, transactions and savings, with an
//! in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{
    Account, AccountUpdate, NewAccount, NewSavingsAccount, NewSavingsTransaction, NewTransaction,
    SavingsAccount, SavingsTransaction, SavingsTransactionUpdate, Transaction, UserId,
};

/// Storage for ledger records. Every operation is scoped to one user; records
/// belonging to someone else are reported as not found.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Accounts owned by `user`, oldest first.
    async fn list_accounts(&self, user: &UserId) -> LedgerResult<Vec<Account>>;

    async fn create_account(&self, user: &UserId, input: NewAccount) -> LedgerResult<Account>;

    async fn update_account(
        &self,
        user: &UserId,
        id: Uuid,
        update: AccountUpdate,
    ) -> LedgerResult<Account>;

    /// Deletes the account and every transaction recorded against it.
    async fn delete_account(&self, user: &UserId, id: Uuid) -> LedgerResult<Account>;

    /// Transactions owned by `user`, newest first.
    async fn list_transactions(&self, user: &UserId) -> LedgerResult<Vec<Transaction>>;

    /// Records a transaction and applies it to the account balance.
    async fn create_transaction(
        &self,
        user: &UserId,
        input: NewTransaction,
    ) -> LedgerResult<Transaction>;

    /// Records several transactions at once. Nothing is written unless every
    /// input is valid and refers to an account the user owns.
    async fn create_transactions(
        &self,
        user: &UserId,
        inputs: Vec<NewTransaction>,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Replaces a transaction, moving its balance effect to the new account
    /// and amount. A missing `date` keeps the existing one.
    async fn update_transaction(
        &self,
        user: &UserId,
        id: Uuid,
        input: NewTransaction,
    ) -> LedgerResult<Transaction>;

    /// Deletes a transaction and reverses its effect on the account balance.
    async fn delete_transaction(&self, user: &UserId, id: Uuid) -> LedgerResult<Transaction>;

    /// Savings accounts owned by `user`, oldest first.
    async fn list_savings(&self, user: &UserId) -> LedgerResult<Vec<SavingsAccount>>;

    async fn create_savings(
        &self,
        user: &UserId,
        input: NewSavingsAccount,
    ) -> LedgerResult<SavingsAccount>;

    /// Deletes the savings account and its transactions.
    async fn delete_savings(&self, user: &UserId, id: Uuid) -> LedgerResult<SavingsAccount>;

    /// Savings transactions owned by `user`, newest first, optionally for a
    /// single savings account.
    async fn list_savings_transactions(
        &self,
        user: &UserId,
        savings_id: Option<Uuid>,
    ) -> LedgerResult<Vec<SavingsTransaction>>;

    /// Records a savings transaction and applies it to the running balance.
    async fn create_savings_transaction(
        &self,
        user: &UserId,
        input: NewSavingsTransaction,
    ) -> LedgerResult<SavingsTransaction>;

    /// Replaces a savings transaction, reversing the old effect first.
    async fn update_savings_transaction(
        &self,
        user: &UserId,
        update: SavingsTransactionUpdate,
    ) -> LedgerResult<SavingsTransaction>;

    /// Deletes a savings transaction and reverses its effect.
    async fn delete_savings_transaction(
        &self,
        user: &UserId,
        id: Uuid,
    ) -> LedgerResult<SavingsTransaction>;
}

#[derive(Debug, Default)]
struct LedgerData {
    accounts: HashMap<Uuid, Account>,
    transactions: HashMap<Uuid, Transaction>,
    savings: HashMap<Uuid, SavingsAccount>,
    savings_transactions: HashMap<Uuid, SavingsTransaction>,
}

impl LedgerData {
    fn owned_account_mut(&mut self, user: &UserId, id: Uuid) -> LedgerResult<&mut Account> {
        self.accounts
            .get_mut(&id)
            .filter(|account| &account.user_id == user)
            .ok_or(LedgerError::AccountNotFound(id))
    }

    fn owned_transaction(&self, user: &UserId, id: Uuid) -> LedgerResult<&Transaction> {
        self.transactions
            .get(&id)
            .filter(|tx| &tx.user_id == user)
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    fn owned_savings_mut(&mut self, user: &UserId, id: Uuid) -> LedgerResult<&mut SavingsAccount> {
        self.savings
            .get_mut(&id)
            .filter(|savings| &savings.user_id == user)
            .ok_or(LedgerError::SavingsNotFound(id))
    }

    fn owned_savings_transaction(
        &self,
        user: &UserId,
        id: Uuid,
    ) -> LedgerResult<&SavingsTransaction> {
        self.savings_transactions
            .get(&id)
            .filter(|tx| &tx.user_id == user)
            .ok_or(LedgerError::SavingsTransactionNotFound(id))
    }

    /// Adds `delta` to an account balance. Missing accounts are skipped; they
    /// may have been deleted along with their history.
    fn adjust_balance(&mut self, user: &UserId, account_id: Uuid, delta: f64) {
        if let Ok(account) = self.owned_account_mut(user, account_id) {
            account.balance += delta;
            account.updated_at = Utc::now();
        }
    }

    fn adjust_savings(&mut self, user: &UserId, savings_id: Uuid, delta: f64) {
        if let Ok(savings) = self.owned_savings_mut(user, savings_id) {
            savings.running_balance += delta;
            savings.updated_at = Utc::now();
        }
    }
}

fn build_transaction(user: &UserId, input: NewTransaction) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: Uuid::new_v4(),
        user_id: user.clone(),
        account_id: input.account_id,
        kind: input.kind,
        amount: input.amount,
        category: input.category.trim().to_string(),
        description: input.description,
        date: input.date.unwrap_or(now),
        created_at: now,
    }
}

fn build_savings_transaction(user: &UserId, input: NewSavingsTransaction) -> SavingsTransaction {
    let now = Utc::now();
    SavingsTransaction {
        id: Uuid::new_v4(),
        user_id: user.clone(),
        savings_id: input.savings_id,
        kind: input.kind,
        amount: input.amount,
        date: input.date.unwrap_or(now),
        description: input.description,
        created_at: now,
    }
}

// == Memory Ledger ==
/// [`LedgerStore`] held in process memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    data: RwLock<LedgerData>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn list_accounts(&self, user: &UserId) -> LedgerResult<Vec<Account>> {
        let data = self.data.read().await;
        let mut accounts: Vec<Account> = data
            .accounts
            .values()
            .filter(|account| &account.user_id == user)
            .cloned()
            .collect();
        accounts.sort_by_key(|account| account.created_at);
        Ok(accounts)
    }

    async fn create_account(&self, user: &UserId, input: NewAccount) -> LedgerResult<Account> {
        input.validate()?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            user_id: user.clone(),
            name: input.name.trim().to_string(),
            account_type: input.account_type,
            balance: input.balance,
            created_at: now,
            updated_at: now,
        };

        self.data
            .write()
            .await
            .accounts
            .insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_account(
        &self,
        user: &UserId,
        id: Uuid,
        update: AccountUpdate,
    ) -> LedgerResult<Account> {
        update.validate()?;

        let mut data = self.data.write().await;
        let account = data.owned_account_mut(user, id)?;

        if let Some(name) = update.name {
            account.name = name.trim().to_string();
        }
        if let Some(account_type) = update.account_type {
            account.account_type = account_type;
        }
        if let Some(balance) = update.balance {
            account.balance = balance;
        }
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn delete_account(&self, user: &UserId, id: Uuid) -> LedgerResult<Account> {
        let mut data = self.data.write().await;
        data.owned_account_mut(user, id)?;

        data.transactions.retain(|_, tx| tx.account_id != id);
        data.accounts
            .remove(&id)
            .ok_or(LedgerError::AccountNotFound(id))
    }

    async fn list_transactions(&self, user: &UserId) -> LedgerResult<Vec<Transaction>> {
        let data = self.data.read().await;
        let mut transactions: Vec<Transaction> = data
            .transactions
            .values()
            .filter(|tx| &tx.user_id == user)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(transactions)
    }

    async fn create_transaction(
        &self,
        user: &UserId,
        input: NewTransaction,
    ) -> LedgerResult<Transaction> {
        input.validate()?;

        let mut data = self.data.write().await;
        data.owned_account_mut(user, input.account_id)?;

        let transaction = build_transaction(user, input);
        data.adjust_balance(user, transaction.account_id, transaction.signed_amount());
        data.transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn create_transactions(
        &self,
        user: &UserId,
        inputs: Vec<NewTransaction>,
    ) -> LedgerResult<Vec<Transaction>> {
        if inputs.is_empty() {
            return Err(LedgerError::Invalid("transactions cannot be empty".to_string()));
        }
        for input in &inputs {
            input.validate()?;
        }

        let mut data = self.data.write().await;
        for input in &inputs {
            data.owned_account_mut(user, input.account_id)?;
        }

        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let transaction = build_transaction(user, input);
            data.adjust_balance(user, transaction.account_id, transaction.signed_amount());
            data.transactions.insert(transaction.id, transaction.clone());
            created.push(transaction);
        }
        Ok(created)
    }

    async fn update_transaction(
        &self,
        user: &UserId,
        id: Uuid,
        input: NewTransaction,
    ) -> LedgerResult<Transaction> {
        input.validate()?;

        let mut data = self.data.write().await;
        let previous = data.owned_transaction(user, id)?.clone();
        data.owned_account_mut(user, input.account_id)?;

        let updated = Transaction {
            account_id: input.account_id,
            kind: input.kind,
            amount: input.amount,
            category: input.category.trim().to_string(),
            description: input.description,
            date: input.date.unwrap_or(previous.date),
            ..previous.clone()
        };

        data.adjust_balance(user, previous.account_id, -previous.signed_amount());
        data.adjust_balance(user, updated.account_id, updated.signed_amount());
        data.transactions.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_transaction(&self, user: &UserId, id: Uuid) -> LedgerResult<Transaction> {
        let mut data = self.data.write().await;
        data.owned_transaction(user, id)?;

        let transaction = data
            .transactions
            .remove(&id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        data.adjust_balance(user, transaction.account_id, -transaction.signed_amount());
        Ok(transaction)
    }

    async fn list_savings(&self, user: &UserId) -> LedgerResult<Vec<SavingsAccount>> {
        let data = self.data.read().await;
        let mut savings: Vec<SavingsAccount> = data
            .savings
            .values()
            .filter(|savings| &savings.user_id == user)
            .cloned()
            .collect();
        savings.sort_by_key(|savings| savings.created_at);
        Ok(savings)
    }

    async fn create_savings(
        &self,
        user: &UserId,
        input: NewSavingsAccount,
    ) -> LedgerResult<SavingsAccount> {
        input.validate()?;

        let now = Utc::now();
        let savings = SavingsAccount {
            id: Uuid::new_v4(),
            user_id: user.clone(),
            account_name: input.account_name.trim().to_string(),
            savings_type: input.savings_type.trim().to_string(),
            amount: input.amount,
            running_balance: input.amount,
            created_at: now,
            updated_at: now,
        };

        self.data
            .write()
            .await
            .savings
            .insert(savings.id, savings.clone());
        Ok(savings)
    }

    async fn delete_savings(&self, user: &UserId, id: Uuid) -> LedgerResult<SavingsAccount> {
        let mut data = self.data.write().await;
        data.owned_savings_mut(user, id)?;

        data.savings_transactions.retain(|_, tx| tx.savings_id != id);
        data.savings
            .remove(&id)
            .ok_or(LedgerError::SavingsNotFound(id))
    }

    async fn list_savings_transactions(
        &self,
        user: &UserId,
        savings_id: Option<Uuid>,
    ) -> LedgerResult<Vec<SavingsTransaction>> {
        let data = self.data.read().await;
        let mut transactions: Vec<SavingsTransaction> = data
            .savings_transactions
            .values()
            .filter(|tx| &tx.user_id == user)
            .filter(|tx| savings_id.is_none() || savings_id == Some(tx.savings_id))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(transactions)
    }

    async fn create_savings_transaction(
        &self,
        user: &UserId,
        input: NewSavingsTransaction,
    ) -> LedgerResult<SavingsTransaction> {
        input.validate()?;

        let mut data = self.data.write().await;
        data.owned_savings_mut(user, input.savings_id)?;

        let transaction = build_savings_transaction(user, input);
        data.adjust_savings(user, transaction.savings_id, transaction.signed_amount());
        data.savings_transactions
            .insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn update_savings_transaction(
        &self,
        user: &UserId,
        update: SavingsTransactionUpdate,
    ) -> LedgerResult<SavingsTransaction> {
        let SavingsTransactionUpdate { id, fields } = update;
        fields.validate()?;

        let mut data = self.data.write().await;
        let previous = data.owned_savings_transaction(user, id)?.clone();
        data.owned_savings_mut(user, fields.savings_id)?;

        let updated = SavingsTransaction {
            savings_id: fields.savings_id,
            kind: fields.kind,
            amount: fields.amount,
            date: fields.date.unwrap_or(previous.date),
            description: fields.description,
            ..previous.clone()
        };

        data.adjust_savings(user, previous.savings_id, -previous.signed_amount());
        data.adjust_savings(user, updated.savings_id, updated.signed_amount());
        data.savings_transactions.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_savings_transaction(
        &self,
        user: &UserId,
        id: Uuid,
    ) -> LedgerResult<SavingsTransaction> {
        let mut data = self.data.write().await;
        data.owned_savings_transaction(user, id)?;

        let transaction = data
            .savings_transactions
            .remove(&id)
            .ok_or(LedgerError::SavingsTransactionNotFound(id))?;
        data.adjust_savings(user, transaction.savings_id, -transaction.signed_amount());
        Ok(transaction)
    }
}
