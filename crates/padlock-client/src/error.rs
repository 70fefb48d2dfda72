//! Client errors.

use std::io;

use padlock_proto::ProtocolError;
use thiserror::Error;

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by [`crate::LockClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket failure while connecting, sending or receiving.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The server closed the connection before answering.
    #[error("server closed the connection")]
    ConnectionClosed,

    /// The server answered `ERR`.
    #[error("server rejected `{command}`")]
    Rejected {
        /// Command that was rejected, without its terminator
        command: String,
    },

    /// The server sent something other than `OK` or `ERR`.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
