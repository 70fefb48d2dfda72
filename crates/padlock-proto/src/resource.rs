//! Resource names.

use std::{borrow::Borrow, fmt, str::FromStr};

use crate::{LINE_TERMINATOR, ProtocolError, Result};

/// Name of a lockable resource.
///
/// Names are compared byte for byte; there is no hierarchy, case folding or
/// trimming. A valid name is non-empty and never contains the line
/// terminator, which is what lets it travel inside a single protocol line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceName(String);

impl ResourceName {
    /// Validate and wrap a resource name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ProtocolError::EmptyResourceName);
        }
        if name.as_bytes().contains(&LINE_TERMINATOR) {
            return Err(ProtocolError::TerminatorInResourceName);
        }
        Ok(Self(name))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResourceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceName {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
