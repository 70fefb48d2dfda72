//! Client commands.
//!
//! A command line is split at its first whitespace character. The head is
//! the verb, the tail is the operand taken verbatim: embedded spaces are
//! kept and nothing is trimmed, so `LOCK  a b` names the resource ` a b`.

use std::fmt;

use crate::{ProtocolError, ResourceName, Result};

/// Verb that requests a lock.
pub const LOCK_VERB: &str = "LOCK";

/// Verb that releases a lock.
pub const UNLOCK_VERB: &str = "UNLOCK";

/// Verb that ends the session.
pub const QUIT_VERB: &str = "QUIT";

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Acquire the named lock, waiting until it is free.
    Lock(ResourceName),

    /// Release the named lock.
    Unlock(ResourceName),

    /// Close the session. Any operand is ignored.
    Quit,
}

impl Command {
    /// Parse one line (terminator already removed) as received off the wire.
    pub fn parse(line: &[u8]) -> Result<Self> {
        let line = std::str::from_utf8(line).map_err(|_| ProtocolError::InvalidUtf8)?;
        Self::parse_str(line)
    }

    /// Parse one line that is already known to be UTF-8.
    pub fn parse_str(line: &str) -> Result<Self> {
        let (verb, operand) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match verb {
            LOCK_VERB => Ok(Self::Lock(operand_name(LOCK_VERB, operand)?)),
            UNLOCK_VERB => Ok(Self::Unlock(operand_name(UNLOCK_VERB, operand)?)),
            QUIT_VERB => Ok(Self::Quit),
            other => Err(ProtocolError::UnknownVerb(other.to_string())),
        }
    }

    /// Wire verb of this command.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Lock(_) => LOCK_VERB,
            Self::Unlock(_) => UNLOCK_VERB,
            Self::Quit => QUIT_VERB,
        }
    }

    /// Resource named by the command, if any.
    pub fn resource(&self) -> Option<&ResourceName> {
        match self {
            Self::Lock(name) | Self::Unlock(name) => Some(name),
            Self::Quit => None,
        }
    }

    /// Encode the command as a terminated wire line.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource() {
            Some(name) => write!(f, "{} {name}", self.verb()),
            None => f.write_str(self.verb()),
        }
    }
}

fn operand_name(verb: &'static str, operand: &str) -> Result<ResourceName> {
    if operand.is_empty() {
        return Err(ProtocolError::MissingOperand { verb });
    }
    ResourceName::new(operand)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ResourceName {
        ResourceName::new(s).unwrap()
    }

    #[test]
    fn parses_lock_and_unlock() {
        assert_eq!(Command::parse(b"LOCK foo"), Ok(Command::Lock(name("foo"))));
        assert_eq!(Command::parse(b"UNLOCK foo"), Ok(Command::Unlock(name("foo"))));
    }

    #[test]
    fn operand_is_taken_verbatim() {
        assert_eq!(Command::parse(b"LOCK my file"), Ok(Command::Lock(name("my file"))));
        assert_eq!(Command::parse(b"LOCK  padded "), Ok(Command::Lock(name(" padded "))));
        assert_eq!(Command::parse(b"LOCK foo\r"), Ok(Command::Lock(name("foo\r"))));
    }

    #[test]
    fn missing_operand_is_rejected() {
        let lock_err = ProtocolError::MissingOperand { verb: LOCK_VERB };
        assert_eq!(Command::parse(b"LOCK"), Err(lock_err.clone()));
        assert_eq!(Command::parse(b"LOCK "), Err(lock_err));
        assert_eq!(
            Command::parse(b"UNLOCK"),
            Err(ProtocolError::MissingOperand { verb: UNLOCK_VERB })
        );
    }

    #[test]
    fn quit_ignores_operand() {
        assert_eq!(Command::parse(b"QUIT"), Ok(Command::Quit));
        assert_eq!(Command::parse(b"QUIT now"), Ok(Command::Quit));
    }

    #[test]
    fn unknown_verbs_are_rejected() {
        assert_eq!(Command::parse(b"FROB x"), Err(ProtocolError::UnknownVerb("FROB".into())));
        assert_eq!(Command::parse(b"lock x"), Err(ProtocolError::UnknownVerb("lock".into())));
        assert_eq!(Command::parse(b""), Err(ProtocolError::UnknownVerb(String::new())));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_eq!(Command::parse(b"LOCK \xff\xfe"), Err(ProtocolError::InvalidUtf8));
    }

    #[test]
    fn encodes_terminated_lines() {
        assert_eq!(Command::Lock(name("a b")).to_line(), "LOCK a b\n");
        assert_eq!(Command::Unlock(name("a")).to_line(), "UNLOCK a\n");
        assert_eq!(Command::Quit.to_line(), "QUIT\n");
    }
}
