//! Server responses.

use std::fmt;

use crate::{ProtocolError, Result};

/// The single-line reply the server sends for every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    /// The command succeeded.
    Ok,
    /// The command was malformed or not permitted.
    Err,
}

impl Response {
    /// Response text without the terminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Err => "ERR",
        }
    }

    /// Response encoded as a terminated wire line.
    pub const fn as_line(self) -> &'static [u8] {
        match self {
            Self::Ok => b"OK\n",
            Self::Err => b"ERR\n",
        }
    }

    /// Parse a server line (terminator already removed).
    pub fn parse(line: &[u8]) -> Result<Self> {
        match line {
            b"OK" => Ok(Self::Ok),
            b"ERR" => Ok(Self::Err),
            other => Err(ProtocolError::UnexpectedResponse(String::from_utf8_lossy(other).into_owned())),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
