//! Per-list async locks.
//!
//! Every backend serializes list transactions within a process by holding
//! the list's lock for the lifetime of the transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::ids::ListId;

/// Lazily created mutex per list ID.
#[derive(Debug, Default)]
pub(crate) struct ListLocks {
    locks: Mutex<HashMap<ListId, Arc<AsyncMutex<()>>>>,
}

impl ListLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `list`.
    pub(crate) async fn acquire(&self, list: &ListId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(*list).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop the lock slot of a deleted list.
    pub(crate) fn forget(&self, list: &ListId) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.remove(list);
    }
}
