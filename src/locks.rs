use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

/// Per-account locks serializing the mutating operations that touch an
/// account. Holding an account's lock across the balance read and the store
/// commit gives the no-overdraft guarantee: two operations debiting the same
/// account cannot both decide against the same stale balance.
pub struct AccountLocks {
    locks: RwLock<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    async fn entry(&self, account_id: Uuid) -> Arc<Mutex<()>> {
        // Fast path under the read lock.
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(&account_id) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        // Double-check: another task might have created it.
        locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the lock for one account. Blocks until available; callers
    /// wanting timeouts impose them externally.
    pub async fn lock(&self, account_id: Uuid) -> OwnedMutexGuard<()> {
        self.entry(account_id).await.lock_owned().await
    }

    /// Acquire the locks for a pair of accounts in a canonical order so two
    /// transfers between the same accounts cannot deadlock.
    pub async fn lock_pair(&self, a: Uuid, b: Uuid) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b);
        if a < b {
            let first = self.lock(a).await;
            let second = self.lock(b).await;
            (first, second)
        } else {
            let first = self.lock(b).await;
            let second = self.lock(a).await;
            (second, first)
        }
    }
}

impl Default for AccountLocks {
    fn default() -> Self {
        Self::new()
    }
}
