//! Connection identifiers.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Identity of one client connection.
///
/// Lock ownership is recorded against this id, never against a socket
/// handle, so an id stays meaningful until the session's cleanup has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Hands out connection ids, starting at 1.
///
/// Ids are never reused for the lifetime of the generator.
#[derive(Debug, Default)]
pub struct ConnectionIdGenerator {
    issued: AtomicU64,
}

impl ConnectionIdGenerator {
    /// Create a generator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> ConnectionId {
        ConnectionId(self.issued.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
