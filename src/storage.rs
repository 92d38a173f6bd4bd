use crate::errors::LedgerError;
use crate::models::{Account, AccountStatus, LedgerEntry, Transaction};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Durable relations behind the ledger: accounts, transactions and
/// ledger_entries. Handles are dependency-injected (`Arc<dyn LedgerStore>`),
/// never a process-wide singleton.
///
/// Reads observe a consistent snapshot for the duration of the call. `commit`
/// is the atomic unit: the transaction and all of its entries become visible
/// together or not at all.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert_account(&self, account: Account) -> Result<Account, LedgerError>;

    async fn get_account(&self, id: Uuid) -> Option<Account>;

    /// Change an account's status. Closed is terminal.
    async fn update_account_status(
        &self,
        id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, LedgerError>;

    /// Accounts owned by a user, in creation order.
    async fn accounts_for_user(&self, user_id: &str) -> Vec<Account>;

    async fn get_transaction(&self, id: Uuid) -> Option<Transaction>;

    /// Entries posted against an account, newest first.
    async fn entries_for_account(&self, account_id: Uuid) -> Vec<LedgerEntry>;

    async fn entries_for_transaction(&self, transaction_id: Uuid) -> Vec<LedgerEntry>;

    /// Atomically persist a transaction together with its ledger entries.
    /// Validates referential integrity and the one-entry-per
    /// (transaction, account, entry_type) constraint before anything is
    /// written; on any failure the store is left untouched.
    async fn commit(
        &self,
        transaction: Transaction,
        entries: Vec<LedgerEntry>,
    ) -> Result<Transaction, LedgerError>;
}

#[derive(Default)]
struct Relations {
    accounts: HashMap<Uuid, Account>,
    // Creation order for per-user listings.
    account_order: Vec<Uuid>,
    transactions: HashMap<Uuid, Transaction>,
    // Append-only, in posting order.
    entries: Vec<LedgerEntry>,
}

/// In-memory storage backend. All three relations live behind a single lock:
/// a read guard is a consistent snapshot, a write guard makes `commit`
/// all-or-nothing with no partial state observable to concurrent readers.
pub struct InMemoryStore {
    relations: RwLock<Relations>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            relations: RwLock::new(Relations::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_commit(
    relations: &Relations,
    transaction: &Transaction,
    entries: &[LedgerEntry],
) -> Result<(), LedgerError> {
    for (i, entry) in entries.iter().enumerate() {
        if entry.transaction_id != transaction.id {
            return Err(LedgerError::Validation(format!(
                "entry {} does not reference transaction {}",
                entry.id, transaction.id
            )));
        }
        if !relations.accounts.contains_key(&entry.account_id) {
            return Err(LedgerError::AccountNotFound(entry.account_id));
        }
        let duplicate_in_batch = entries[..i]
            .iter()
            .any(|e| e.account_id == entry.account_id && e.entry_type == entry.entry_type);
        let duplicate_in_store = relations.entries.iter().any(|e| {
            e.transaction_id == entry.transaction_id
                && e.account_id == entry.account_id
                && e.entry_type == entry.entry_type
        });
        if duplicate_in_batch || duplicate_in_store {
            return Err(LedgerError::DuplicateEntry {
                transaction_id: entry.transaction_id,
                account_id: entry.account_id,
            });
        }
    }
    Ok(())
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn insert_account(&self, account: Account) -> Result<Account, LedgerError> {
        let mut relations = self.relations.write().await;
        relations.account_order.push(account.id);
        relations.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> Option<Account> {
        let relations = self.relations.read().await;
        relations.accounts.get(&id).cloned()
    }

    async fn update_account_status(
        &self,
        id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, LedgerError> {
        let mut relations = self.relations.write().await;
        let account = relations
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        if account.status == AccountStatus::Closed {
            return Err(LedgerError::Validation(
                "closed accounts cannot change status".to_string(),
            ));
        }
        account.status = status;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn accounts_for_user(&self, user_id: &str) -> Vec<Account> {
        let relations = self.relations.read().await;
        relations
            .account_order
            .iter()
            .filter_map(|id| relations.accounts.get(id))
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    async fn get_transaction(&self, id: Uuid) -> Option<Transaction> {
        let relations = self.relations.read().await;
        relations.transactions.get(&id).cloned()
    }

    async fn entries_for_account(&self, account_id: Uuid) -> Vec<LedgerEntry> {
        let relations = self.relations.read().await;
        relations
            .entries
            .iter()
            .rev()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect()
    }

    async fn entries_for_transaction(&self, transaction_id: Uuid) -> Vec<LedgerEntry> {
        let relations = self.relations.read().await;
        relations
            .entries
            .iter()
            .filter(|e| e.transaction_id == transaction_id)
            .cloned()
            .collect()
    }

    async fn commit(
        &self,
        transaction: Transaction,
        entries: Vec<LedgerEntry>,
    ) -> Result<Transaction, LedgerError> {
        let mut relations = self.relations.write().await;

        if relations.transactions.contains_key(&transaction.id) {
            return Err(LedgerError::Validation(format!(
                "transaction {} already committed",
                transaction.id
            )));
        }
        validate_commit(&relations, &transaction, &entries)?;

        relations
            .transactions
            .insert(transaction.id, transaction.clone());
        relations.entries.extend(entries);
        Ok(transaction)
    }
}
