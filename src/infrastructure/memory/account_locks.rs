//! Per-account async locks
//!
//! Balance mutations are read-modify-write against the store; holding the
//! account's lock across the whole cycle keeps concurrent deposits and
//! withdrawals on the same account from losing updates.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ledger::AccountNum;

/// One mutex per account number, created on first use.
#[derive(Default)]
pub struct AccountLocks {
    locks: DashMap<AccountNum, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `num`. Released when the guard drops.
    pub async fn acquire(&self, num: AccountNum) -> OwnedMutexGuard<()> {
        // Clone out of the map so no shard lock is held across the await.
        let lock = self
            .locks
            .entry(num)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
