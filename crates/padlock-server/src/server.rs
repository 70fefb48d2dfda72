//! TCP accept loop.
//!
//! ```text
//!  TcpListener ──accept──► Session task ──┐
//!       │                  Session task ──┼──► Arc<LockTable>
//!       │                  Session task ──┘
//!       ▼
//!   Shutdown ──► stop accepting, wait for every session to release
//! ```
//!
//! One task per connection. Sessions share nothing but the lock table, so a
//! slow or blocked client never delays anyone else.

use std::{future::Future, io, net::SocketAddr, sync::Arc, time::Duration};

use padlock_core::{
    CloseReason, ConnectionIdGenerator, LockTable, Session, SessionConfig, Shutdown,
};
use tokio::{
    net::{TcpListener, TcpStream},
    task::{JoinError, JoinSet},
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::{config::ServerConfig, error::ServerError};

/// Pause after a failed accept; usually fd exhaustion, so retrying at once
/// just spins.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Source of incoming connections.
trait Accept {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;
}

impl Accept for TcpListener {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }
}

/// Lock server bound to a TCP address.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    spawner: Spawner,
}

/// Everything a new session needs besides its socket.
#[derive(Debug)]
struct Spawner {
    table: Arc<LockTable>,
    ids: ConnectionIdGenerator,
    session_config: SessionConfig,
}

impl Server {
    /// Bind the listener with a fresh lock table.
    ///
    /// # Errors
    ///
    /// `ServerError::Bind` if the address is in use or not available.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        Self::with_table(config, Arc::new(LockTable::new())).await
    }

    /// Bind the listener around an existing lock table.
    ///
    /// # Errors
    ///
    /// `ServerError::Bind` if the address is in use or not available.
    pub async fn with_table(
        config: &ServerConfig,
        table: Arc<LockTable>,
    ) -> Result<Self, ServerError> {
        let addr = config.socket_addr();
        let listener =
            TcpListener::bind(addr).await.map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            spawner: Spawner {
                table,
                ids: ConnectionIdGenerator::new(),
                session_config: config.session_config(),
            },
        })
    }

    /// Address the listener actually bound, useful with port 0.
    ///
    /// # Errors
    ///
    /// `ServerError::LocalAddr` if the socket cannot report it.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    /// Shared lock table.
    pub fn lock_table(&self) -> Arc<LockTable> {
        Arc::clone(&self.spawner.table)
    }

    /// Accept connections until `shutdown` fires, then wait for every
    /// session to close and release its locks.
    pub async fn run(self, shutdown: Shutdown) {
        let mut sessions = accept_until_shutdown(&self.listener, &self.spawner, shutdown).await;

        info!(active = sessions.len(), "shutting down, waiting for sessions to close");
        drop(self.listener);

        while let Some(finished) = sessions.join_next().await {
            log_finished(finished);
        }
    }
}

/// Accept loop. Returns the still-running sessions once `shutdown` fires.
///
/// After a failed accept, accepting pauses for [`ACCEPT_BACKOFF`] while
/// shutdown and finished sessions are still handled.
async fn accept_until_shutdown(
    listener: &impl Accept,
    spawner: &Spawner,
    shutdown: Shutdown,
) -> JoinSet<()> {
    let mut sessions = JoinSet::new();
    let mut stop = shutdown.clone();
    let backoff = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(backoff);
    let mut backing_off = false;

    loop {
        tokio::select! {
            () = stop.wait() => break,
            () = &mut backoff, if backing_off => backing_off = false,
            accepted = listener.accept(), if !backing_off => match accepted {
                Ok((stream, peer)) => spawner.spawn(&mut sessions, stream, peer, &shutdown),
                Err(error) => {
                    warn!(%error, "failed to accept connection");
                    backoff.as_mut().reset(Instant::now() + ACCEPT_BACKOFF);
                    backing_off = true;
                },
            },
            Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                log_finished(finished);
            },
        }
    }

    sessions
}

impl Spawner {
    fn spawn(
        &self,
        sessions: &mut JoinSet<()>,
        stream: TcpStream,
        peer: SocketAddr,
        shutdown: &Shutdown,
    ) {
        let id = self.ids.next_id();
        if let Err(error) = stream.set_nodelay(true) {
            debug!(conn = %id, %error, "failed to set TCP_NODELAY");
        }

        let (reader, writer) = stream.into_split();
        let mut session = Session::new(
            id,
            Arc::clone(&self.table),
            reader,
            writer,
            shutdown.clone(),
            &self.session_config,
        );

        info!(conn = %id, %peer, "client connected");
        sessions.spawn(async move {
            match session.run().await {
                CloseReason::Transport(error) => {
                    warn!(conn = %id, %error, "client disconnected after transport error");
                },
                reason => info!(conn = %id, ?reason, "client disconnected"),
            }
        });
    }
}

fn log_finished(finished: Result<(), JoinError>) {
    if let Err(error) = finished
        && error.is_panic()
    {
        error!(%error, "session task panicked");
    }
}
