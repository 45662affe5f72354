//! Per-filename exclusive locks.
//!
//! [`KeyedLocks`] hands out one mutex per key, created on first use and
//! dropped from the table when the last holder or waiter releases it. Two
//! requests for the same filename serialize; requests for different filenames
//! never touch the same mutex. The table itself is only locked for the few
//! instructions it takes to look up or reclaim an entry.

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;

type KeyMutex = Arc<Mutex<()>>;

#[derive(Default)]
pub struct KeyedLocks {
    table: Mutex<HashMap<String, KeyMutex>>,
}

/// Exclusive hold on one key. Releases (and possibly reclaims) on drop.
pub struct KeyGuard<'a> {
    owner: &'a KeyedLocks,
    key: String,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `key` is free, then hold it until the guard drops.
    pub fn lock(&self, key: &str) -> KeyGuard<'_> {
        // Clone under the table lock so reclamation can trust the refcount.
        let entry = {
            let mut table = self.table.lock();
            Arc::clone(table.entry(key.to_string()).or_default())
        };
        let guard = Mutex::lock_arc(&entry);
        KeyGuard {
            owner: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // Release the key first so our Arc clone is gone before we count.
        drop(self.guard.take());
        let mut table = self.owner.table.lock();
        if let Some(entry) = table.get(&self.key)
            && Arc::strong_count(entry) == 1
        {
            table.remove(&self.key);
        }
    }
}
