//! Wire format for the padlock lock service.
//!
//! The protocol is line oriented: every command and every response is a
//! single UTF-8 line terminated by `\n`. A client sends one command and waits
//! for exactly one response before sending the next, so there is no framing
//! beyond the terminator and no request identifiers.
//!
//! ```text
//! client                      server
//!   LOCK inventory\n   ───▶
//!                      ◀───   OK\n        (possibly after blocking)
//!   UNLOCK inventory\n ───▶
//!                      ◀───   OK\n
//!   QUIT\n             ───▶
//!                      ◀───   OK\n
//! ```
//!
//! Malformed input never closes the connection; it is answered with `ERR`.
//! Resource names are opaque: they may contain spaces but never the line
//! terminator.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod errors;
pub mod resource;
pub mod response;

pub use command::Command;
pub use errors::{ProtocolError, Result};
pub use resource::ResourceName;
pub use response::Response;

/// Byte that terminates every command and response line.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Default TCP port of the lock service.
pub const DEFAULT_PORT: u16 = 5555;

/// Longest command line (excluding the terminator) a server buffers before
/// giving up on the connection.
pub const MAX_LINE_LENGTH: usize = 4096;
