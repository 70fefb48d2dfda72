//! Named exclusive locks with blocking acquisition.
//!
//! # Concurrency model
//!
//! All lock state and the connection registry sit behind one
//! `std::sync::Mutex`. The mutex is only held for short, non-async critical
//! sections and never across an `.await`, so it is safe to use from any
//! number of tokio tasks.
//!
//! Each resource owns a [`Notify`]. A contended `acquire` waits on that
//! resource's `Notify`; `release` wakes exactly one waiter with
//! `notify_one`. Woken waiters re-check ownership under the mutex, so
//! wake-ups are hints, not grants, and there is no fairness between waiters.
//!
//! A release that happens between a waiter's failed check and its wait
//! registration is not lost: `notify_one` stores a permit when nobody is
//! registered, and the next `notified()` consumes it.
//!
//! Dropping a pending `acquire` future (the client went away, the server is
//! shutting down) removes the waiter without granting anything. A wake-up
//! that had already been delivered to the dropped waiter is forwarded to the
//! next one by `Notify`.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use padlock_proto::ResourceName;
use tokio::sync::Notify;

use crate::{ConnectionId, LockError, registry::Registry};

/// How an acquisition was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The lock was free (possibly after waiting) and is now owned by the
    /// requester.
    Acquired {
        /// Whether the requester had to wait for another owner to release
        waited: bool,
    },
    /// The requester already owned the lock; nothing changed.
    AlreadyHeld,
}

/// Lock state of a single resource.
///
/// Entries are created on first use and kept after release, so repeated
/// lock cycles on one name reuse the same entry and the same wake-up signal.
#[derive(Default)]
struct LockState {
    /// `None` means unlocked.
    owner: Option<ConnectionId>,
    waiters: Arc<Notify>,
}

#[derive(Default)]
struct TableState {
    locks: HashMap<ResourceName, LockState>,
    registry: Registry,
}

enum Attempt {
    Granted(Grant),
    Contended(Arc<Notify>),
}

impl TableState {
    fn attempt(&mut self, resource: &ResourceName, requester: ConnectionId) -> Attempt {
        let entry = self.locks.entry(resource.clone()).or_default();

        match entry.owner {
            None => {
                entry.owner = Some(requester);
                self.registry.record(requester, resource);
                Attempt::Granted(Grant::Acquired { waited: false })
            },
            Some(owner) if owner == requester => Attempt::Granted(Grant::AlreadyHeld),
            Some(_) => Attempt::Contended(Arc::clone(&entry.waiters)),
        }
    }

    /// Free `resource` if `owner` holds it and wake one waiter.
    fn unlock(&mut self, resource: &ResourceName, owner: ConnectionId) -> bool {
        match self.locks.get_mut(resource) {
            Some(entry) if entry.owner == Some(owner) => {
                entry.owner = None;
                entry.waiters.notify_one();
                true
            },
            _ => false,
        }
    }
}

/// The authoritative map from resource name to lock state.
///
/// Construct one per server and share it with every session through an
/// `Arc`. Independent tables are fully isolated from each other.
#[derive(Default)]
pub struct LockTable {
    state: Mutex<TableState>,
}

impl LockTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire `resource` for `requester`, waiting as long as another
    /// connection owns it.
    ///
    /// Re-acquiring a lock the requester already owns returns
    /// [`Grant::AlreadyHeld`] immediately. Ownership is a flag, not a count:
    /// one release frees the lock no matter how often it was re-acquired.
    pub async fn acquire(&self, resource: &ResourceName, requester: ConnectionId) -> Grant {
        let mut waited = false;

        loop {
            let attempt = self.lock_state().attempt(resource, requester);
            let waiters = match attempt {
                Attempt::Granted(Grant::Acquired { .. }) => return Grant::Acquired { waited },
                Attempt::Granted(Grant::AlreadyHeld) => return Grant::AlreadyHeld,
                Attempt::Contended(waiters) => waiters,
            };

            waited = true;
            waiters.notified().await;
        }
    }

    /// Acquire `resource` only if that needs no waiting.
    ///
    /// Returns `None` when another connection owns the lock.
    pub fn try_acquire(&self, resource: &ResourceName, requester: ConnectionId) -> Option<Grant> {
        match self.lock_state().attempt(resource, requester) {
            Attempt::Granted(grant) => Some(grant),
            Attempt::Contended(_) => None,
        }
    }

    /// Release `resource` on behalf of `requester` and wake one waiter.
    ///
    /// Fails without changing anything when the resource is unknown, free,
    /// or owned by another connection.
    pub fn release(&self, resource: &ResourceName, requester: ConnectionId) -> Result<(), LockError> {
        let mut state = self.lock_state();

        if !state.unlock(resource, requester) {
            return Err(LockError::NotHeldByCaller { resource: resource.clone() });
        }
        state.registry.forget(requester, resource);
        Ok(())
    }

    /// Release every lock `requester` holds and delete its registry entry.
    ///
    /// Runs in a single critical section, so no concurrent acquire or
    /// release can observe a half-cleaned connection. Returns the released
    /// resource names.
    pub fn release_all(&self, requester: ConnectionId) -> Vec<ResourceName> {
        let mut state = self.lock_state();
        let held = state.registry.take(requester);

        held.into_iter().filter(|resource| state.unlock(resource, requester)).collect()
    }

    /// Current owner of `resource`, if it is locked.
    pub fn holder(&self, resource: &str) -> Option<ConnectionId> {
        self.lock_state().locks.get(resource).and_then(|entry| entry.owner)
    }

    /// Resources currently held by `connection`, in name order.
    pub fn held_by(&self, connection: ConnectionId) -> Vec<ResourceName> {
        self.lock_state().registry.held_by(connection)
    }

    /// Whether `connection` has a registry entry (it has been granted a
    /// lock and not yet cleaned up).
    pub fn is_registered(&self, connection: ConnectionId) -> bool {
        self.lock_state().registry.contains(connection)
    }

    /// Number of resource names the table has ever seen.
    pub fn resource_count(&self) -> usize {
        self.lock_state().locks.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, TableState> {
        // Critical sections never leave the state half-updated, so a poisoned
        // mutex still guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LockTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockTable").field("resources", &self.resource_count()).finish_non_exhaustive()
    }
}
