//! padlock lock service core
//!
//! The concurrency engine of the lock service, decoupled from sockets and
//! process setup. Everything here works over any tokio byte stream, so the
//! same session code runs behind the TCP server, over in-memory pipes in
//! unit tests, and inside network simulations.
//!
//! # Architecture
//!
//! ```text
//!  bytes ──▶ LineReader ──▶ Session ──▶ Command::parse
//!                              │
//!                              ▼
//!                          LockTable ──▶ Registry
//!                              │
//!  bytes ◀── ResponseWriter ◀──┘  (OK / ERR)
//! ```
//!
//! One [`Session`] runs per connection. All sessions share one
//! [`LockTable`] through an `Arc`; the table's single mutex serializes every
//! acquire, release and cleanup. A session blocked on a contended lock waits
//! on that resource's wake-up signal only, so releases never wake unrelated
//! waiters.
//!
//! The key guarantee is cleanup: whichever way a session ends (QUIT, EOF,
//! I/O error, shutdown, or the task being dropped) every lock it holds is
//! released.
//!
//! # Components
//!
//! - [`lock_table`]: lock state, blocking acquire, release, bulk release
//! - [`session`]: per-connection command loop
//! - [`transport`]: line framing over async byte streams
//! - [`connection`]: connection identifiers
//! - [`shutdown`]: server-wide shutdown signal
//! - [`error`]: lock and transport error types

pub mod connection;
pub mod error;
pub mod lock_table;
mod registry;
pub mod session;
pub mod shutdown;
pub mod transport;

pub use connection::{ConnectionId, ConnectionIdGenerator};
pub use error::{LockError, TransportError};
pub use lock_table::{Grant, LockTable};
pub use session::{CloseReason, Session, SessionConfig, SessionState};
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use transport::{LineReader, ResponseWriter};
