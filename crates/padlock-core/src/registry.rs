//! Per-connection record of held locks.
//!
//! The registry is the reverse index of the lock table: for each connection
//! it lists the resources that connection owns. It exists so cleanup on
//! disconnect touches exactly the connection's own locks instead of scanning
//! the whole table. It is only ever mutated under the lock table's mutex.

use std::collections::{BTreeSet, HashMap};

use padlock_proto::ResourceName;

use crate::ConnectionId;

#[derive(Debug, Default)]
pub(crate) struct Registry {
    held: HashMap<ConnectionId, BTreeSet<ResourceName>>,
}

impl Registry {
    /// Note that `connection` now owns `resource`. Idempotent.
    pub(crate) fn record(&mut self, connection: ConnectionId, resource: &ResourceName) {
        let held = self.held.entry(connection).or_default();
        if !held.contains(resource) {
            held.insert(resource.clone());
        }
    }

    /// Note that `connection` no longer owns `resource`.
    ///
    /// The connection's entry is kept even when it becomes empty; only
    /// [`Registry::take`] deletes it.
    pub(crate) fn forget(&mut self, connection: ConnectionId, resource: &ResourceName) {
        if let Some(held) = self.held.get_mut(&connection) {
            held.remove(resource);
        }
    }

    /// Remove the connection's entry, returning what it held.
    pub(crate) fn take(&mut self, connection: ConnectionId) -> BTreeSet<ResourceName> {
        self.held.remove(&connection).unwrap_or_default()
    }

    pub(crate) fn held_by(&self, connection: ConnectionId) -> Vec<ResourceName> {
        self.held.get(&connection).map(|held| held.iter().cloned().collect()).unwrap_or_default()
    }

    pub(crate) fn contains(&self, connection: ConnectionId) -> bool {
        self.held.contains_key(&connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ResourceName {
        ResourceName::new(s).unwrap()
    }

    #[test]
    fn record_is_idempotent() {
        let mut registry = Registry::default();
        let conn = ConnectionId::new(1);

        registry.record(conn, &name("a"));
        registry.record(conn, &name("a"));

        assert_eq!(registry.held_by(conn), vec![name("a")]);
    }

    #[test]
    fn forget_keeps_empty_entry_until_taken() {
        let mut registry = Registry::default();
        let conn = ConnectionId::new(1);

        registry.record(conn, &name("a"));
        registry.forget(conn, &name("a"));
        assert!(registry.contains(conn));
        assert!(registry.held_by(conn).is_empty());

        assert!(registry.take(conn).is_empty());
        assert!(!registry.contains(conn));
    }

    #[test]
    fn take_returns_only_own_resources() {
        let mut registry = Registry::default();
        let alice = ConnectionId::new(1);
        let bob = ConnectionId::new(2);

        registry.record(alice, &name("a"));
        registry.record(alice, &name("b"));
        registry.record(bob, &name("c"));

        let taken: Vec<_> = registry.take(alice).into_iter().collect();
        assert_eq!(taken, vec![name("a"), name("b")]);
        assert_eq!(registry.held_by(bob), vec![name("c")]);
    }
}
