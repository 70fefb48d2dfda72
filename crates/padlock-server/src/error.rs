//! Server errors.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: SocketAddr,
        /// Underlying socket error
        source: io::Error,
    },

    /// The bound listener could not report its address.
    #[error("failed to read listener address: {0}")]
    LocalAddr(#[source] io::Error),
}
