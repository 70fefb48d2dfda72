//! Protocol error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while parsing or building protocol lines.
///
/// Every variant is recoverable: a server answers it with `ERR` and keeps the
/// connection open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// `LOCK` or `UNLOCK` without a resource name.
    #[error("{verb} requires a resource name")]
    MissingOperand {
        /// Verb that was missing its operand
        verb: &'static str,
    },

    /// The first word of the line is not a known verb.
    #[error("unknown command verb {0:?}")]
    UnknownVerb(String),

    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    /// A resource name was empty.
    #[error("resource name must not be empty")]
    EmptyResourceName,

    /// A resource name contained the line terminator.
    #[error("resource name must not contain a line terminator")]
    TerminatorInResourceName,

    /// A server reply was neither `OK` nor `ERR`.
    #[error("unexpected response {0:?}")]
    UnexpectedResponse(String),
}
