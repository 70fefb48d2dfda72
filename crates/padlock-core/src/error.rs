//! Error types for lock operations and connection transport.

use std::io;

use padlock_proto::ResourceName;
use thiserror::Error;

/// Errors from lock table operations.
///
/// These are protocol-level failures: the session answers `ERR` and the
/// connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Release of a lock that is free, unknown, or owned by someone else.
    #[error("lock {resource:?} is not held by this connection")]
    NotHeldByCaller {
        /// Resource named in the release
        resource: ResourceName,
    },
}

/// Errors that end a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading from or writing to the peer failed.
    #[error("connection I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The peer sent more than the line limit without a terminator.
    #[error("command line exceeds {limit} bytes")]
    LineTooLong {
        /// Configured maximum line length
        limit: usize,
    },
}
