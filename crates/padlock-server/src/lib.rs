//! TCP front end for the padlock lock service.
//!
//! Binds the listener, gives every accepted connection its own
//! [`padlock_core::Session`] task, and shuts everything down cleanly when
//! asked. All lock semantics live in `padlock-core`; this crate only moves
//! connections into it.

pub mod config;
pub mod error;
pub mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::Server;
