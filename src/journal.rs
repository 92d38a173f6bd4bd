use crate::errors::LedgerError;
use crate::models::{Account, AccountStatus, LedgerEntry, Transaction};
use crate::storage::{InMemoryStore, LedgerStore};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use uuid::Uuid;

/// One committed mutation of the ledger state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum JournalRecord {
    AccountOpened {
        account: Account,
    },
    AccountStatusChanged {
        account_id: Uuid,
        status: AccountStatus,
    },
    Committed {
        transaction: Transaction,
        entries: Vec<LedgerEntry>,
    },
}

/// Append-only journal of committed ledger state, one JSON record per line.
/// Replayable on startup; the ledger is always rebuildable from it.
pub struct Journal {
    path: PathBuf,
    writer: Mutex<File>,
}

impl Journal {
    pub async fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// Append a record to the journal.
    pub async fn append(&self, record: &JournalRecord) -> Result<()> {
        let mut writer = self.writer.lock().await;

        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;

        Ok(())
    }

    /// Replay all records from the journal. Unparseable lines are skipped.
    pub async fn replay(&self) -> Result<Vec<JournalRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let mut records = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(record) = serde_json::from_str(&line) {
                records.push(record);
            }
        }

        Ok(records)
    }
}

/// A `LedgerStore` backed by `InMemoryStore` for serving reads, with every
/// successful mutation journaled for durability. `open` rebuilds the
/// in-memory relations by replaying the journal.
pub struct JournaledStore {
    inner: InMemoryStore,
    journal: Journal,
    // Held across each inner mutation and its append, so journal order
    // always matches application order.
    write_lock: Mutex<()>,
}

impl JournaledStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let journal = Journal::new(path.as_ref().to_path_buf()).await?;
        let inner = InMemoryStore::new();

        for record in journal.replay().await? {
            match record {
                JournalRecord::AccountOpened { account } => {
                    inner.insert_account(account).await?;
                }
                JournalRecord::AccountStatusChanged { account_id, status } => {
                    inner.update_account_status(account_id, status).await?;
                }
                JournalRecord::Committed {
                    transaction,
                    entries,
                } => {
                    inner.commit(transaction, entries).await?;
                }
            }
        }

        Ok(Self {
            inner,
            journal,
            write_lock: Mutex::new(()),
        })
    }

    async fn journal(&self, record: JournalRecord) -> Result<(), LedgerError> {
        self.journal
            .append(&record)
            .await
            .map_err(|e| LedgerError::Journal(e.to_string()))
    }
}

#[async_trait]
impl LedgerStore for JournaledStore {
    async fn insert_account(&self, account: Account) -> Result<Account, LedgerError> {
        let _guard = self.write_lock.lock().await;
        let account = self.inner.insert_account(account).await?;
        self.journal(JournalRecord::AccountOpened {
            account: account.clone(),
        })
        .await?;
        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> Option<Account> {
        self.inner.get_account(id).await
    }

    async fn update_account_status(
        &self,
        id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, LedgerError> {
        let _guard = self.write_lock.lock().await;
        let account = self.inner.update_account_status(id, status).await?;
        self.journal(JournalRecord::AccountStatusChanged {
            account_id: id,
            status,
        })
        .await?;
        Ok(account)
    }

    async fn accounts_for_user(&self, user_id: &str) -> Vec<Account> {
        self.inner.accounts_for_user(user_id).await
    }

    async fn get_transaction(&self, id: Uuid) -> Option<Transaction> {
        self.inner.get_transaction(id).await
    }

    async fn entries_for_account(&self, account_id: Uuid) -> Vec<LedgerEntry> {
        self.inner.entries_for_account(account_id).await
    }

    async fn entries_for_transaction(&self, transaction_id: Uuid) -> Vec<LedgerEntry> {
        self.inner.entries_for_transaction(transaction_id).await
    }

    async fn commit(
        &self,
        transaction: Transaction,
        entries: Vec<LedgerEntry>,
    ) -> Result<Transaction, LedgerError> {
        let _guard = self.write_lock.lock().await;
        let transaction = self.inner.commit(transaction, entries.clone()).await?;
        self.journal(JournalRecord::Committed {
            transaction: transaction.clone(),
            entries,
        })
        .await?;
        Ok(transaction)
    }
}
