//! Per-connection command loop.
//!
//! # State Machine
//!
//! ```text
//!                   line received
//! ┌─────────────────┐ ──────────▶ ┌────────────┐
//! │ AwaitingCommand │             │ Processing │
//! └─────────────────┘ ◀────────── └────────────┘
//!          │          response sent      │
//!          │ EOF / I/O error / shutdown  │ QUIT / peer gone while waiting
//!          ▼                             │
//!     ┌────────┐                         │
//!     │ Closed │◀────────────────────────┘
//!     └────────┘
//! ```
//!
//! Entering `Closed` releases every lock the connection holds and shuts
//! down the write side. A session that is dropped before reaching `Closed`
//! (its task was aborted or panicked) releases its locks in `Drop`.
//!
//! While a `LOCK` waits for a contended resource the session keeps reading
//! from its peer. End of stream cancels the wait; bytes that arrive are
//! buffered and handled after the grant, since clients must wait for a
//! response before sending the next command. Read-ahead stops once the
//! buffer exceeds the line limit.

use std::sync::Arc;

use padlock_proto::{Command, MAX_LINE_LENGTH, ResourceName, Response};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::{ConnectionId, LineReader, LockTable, ResponseWriter, Shutdown, TransportError};

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Longest accepted command line, excluding the terminator
    pub max_line_length: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_line_length: MAX_LINE_LENGTH }
    }
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the next command line.
    AwaitingCommand,
    /// Executing a command, possibly blocked on a contended lock.
    Processing,
    /// Locks released and connection closed.
    Closed,
}

/// Why a session ended.
#[derive(Debug)]
pub enum CloseReason {
    /// The client sent `QUIT`.
    Quit,
    /// The client closed its side of the connection.
    PeerClosed,
    /// The server is shutting down.
    Shutdown,
    /// Reading or writing failed, or the client broke the line limit.
    Transport(TransportError),
}

/// One client connection being served.
pub struct Session<R, W> {
    id: ConnectionId,
    table: Arc<LockTable>,
    reader: LineReader<R>,
    writer: ResponseWriter<W>,
    shutdown: Shutdown,
    state: SessionState,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a session for connection `id` over the given stream halves.
    pub fn new(
        id: ConnectionId,
        table: Arc<LockTable>,
        reader: R,
        writer: W,
        shutdown: Shutdown,
        config: &SessionConfig,
    ) -> Self {
        Self {
            id,
            table,
            reader: LineReader::new(reader, config.max_line_length),
            writer: ResponseWriter::new(writer),
            shutdown,
            state: SessionState::AwaitingCommand,
        }
    }

    /// Connection this session serves.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Serve commands until the connection ends, then clean up.
    ///
    /// Always leaves the session in [`SessionState::Closed`] with none of
    /// its locks held.
    pub async fn run(&mut self) -> CloseReason {
        let reason = self.serve().await;
        self.close().await;
        reason
    }

    async fn serve(&mut self) -> CloseReason {
        loop {
            self.state = SessionState::AwaitingCommand;

            let line = tokio::select! {
                () = self.shutdown.wait() => return CloseReason::Shutdown,
                line = self.reader.next_line() => line,
            };
            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => return CloseReason::PeerClosed,
                Err(error) => return CloseReason::Transport(error),
            };

            self.state = SessionState::Processing;
            let response = match Command::parse(&line) {
                Ok(Command::Lock(resource)) => match self.lock(&resource).await {
                    Ok(()) => Response::Ok,
                    Err(reason) => return reason,
                },
                Ok(Command::Unlock(resource)) => self.unlock(&resource),
                Ok(Command::Quit) => {
                    return match self.writer.send(Response::Ok).await {
                        Ok(()) => CloseReason::Quit,
                        Err(error) => CloseReason::Transport(error.into()),
                    };
                },
                Err(error) => {
                    debug!(conn = %self.id, %error, "rejecting command");
                    Response::Err
                },
            };

            if let Err(error) = self.writer.send(response).await {
                return CloseReason::Transport(error.into());
            }
        }
    }

    async fn lock(&mut self, resource: &ResourceName) -> Result<(), CloseReason> {
        let acquire = self.table.acquire(resource, self.id);
        tokio::pin!(acquire);

        let grant = loop {
            tokio::select! {
                grant = &mut acquire => break grant,
                read = self.reader.fill(), if !self.reader.is_full() => match read {
                    Ok(0) => {
                        debug!(conn = %self.id, %resource, "peer closed while waiting for lock");
                        return Err(CloseReason::PeerClosed);
                    },
                    Ok(_) => {
                        debug!(
                            conn = %self.id,
                            buffered = self.reader.buffered(),
                            "input arrived while waiting for lock"
                        );
                    },
                    Err(error) => return Err(CloseReason::Transport(error.into())),
                },
                () = self.shutdown.wait() => return Err(CloseReason::Shutdown),
            }
        };

        debug!(conn = %self.id, %resource, ?grant, "lock granted");
        Ok(())
    }

    fn unlock(&self, resource: &ResourceName) -> Response {
        match self.table.release(resource, self.id) {
            Ok(()) => {
                debug!(conn = %self.id, %resource, "lock released");
                Response::Ok
            },
            Err(error) => {
                debug!(conn = %self.id, %error, "rejecting unlock");
                Response::Err
            },
        }
    }

    async fn close(&mut self) {
        self.state = SessionState::Closed;

        let released = self.table.release_all(self.id);
        if !released.is_empty() {
            info!(conn = %self.id, count = released.len(), "released locks held at close");
        }

        if let Err(error) = self.writer.shutdown().await {
            debug!(conn = %self.id, %error, "failed to shut down connection");
        }
    }
}

impl<R, W> Drop for Session<R, W> {
    fn drop(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        let released = self.table.release_all(self.id);
        if !released.is_empty() {
            warn!(conn = %self.id, count = released.len(), "session dropped while holding locks");
        }
    }
}
