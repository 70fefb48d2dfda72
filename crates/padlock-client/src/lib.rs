//! Client for the padlock lock service.
//!
//! [`LockClient`] speaks the line protocol over any tokio byte stream; the
//! [`store`] module holds the file operations the `padlock-client` binary
//! runs while it holds a lock.
//!
//! ```text
//! connect ─► LOCK name ─► read/write <dir>/<name>.txt ─► UNLOCK name ─► QUIT
//! ```

pub mod client;
pub mod error;
pub mod store;

pub use client::LockClient;
pub use error::{ClientError, Result};
