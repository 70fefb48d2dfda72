//! Protocol client.

use padlock_proto::{Command, LINE_TERMINATOR, ResourceName, Response};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::{TcpStream, ToSocketAddrs},
};
use tracing::debug;

use crate::error::{ClientError, Result};

/// One connection to a lock server.
///
/// Requests are strictly sequential: each call writes one command and waits
/// for its response, so a `lock` on a contended resource does not return
/// until the lock is granted.
#[derive(Debug)]
pub struct LockClient<S> {
    stream: BufReader<S>,
    line: Vec<u8>,
}

impl LockClient<TcpStream> {
    /// Connect over TCP.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

impl<S> LockClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected stream.
    pub fn new(stream: S) -> Self {
        Self { stream: BufReader::new(stream), line: Vec::new() }
    }

    /// Send one command and read its response.
    ///
    /// `ERR` is returned as a response here, not as an error.
    pub async fn request(&mut self, command: &Command) -> Result<Response> {
        let writer = self.stream.get_mut();
        writer.write_all(command.to_line().as_bytes()).await?;
        writer.flush().await?;

        self.line.clear();
        self.stream.read_until(LINE_TERMINATOR, &mut self.line).await?;
        if self.line.pop() != Some(LINE_TERMINATOR) {
            return Err(ClientError::ConnectionClosed);
        }

        let response = Response::parse(&self.line)?;
        debug!(%command, %response, "request answered");
        Ok(response)
    }

    /// Acquire `resource`, waiting as long as another client holds it.
    pub async fn lock(&mut self, resource: &ResourceName) -> Result<()> {
        self.expect_ok(Command::Lock(resource.clone())).await
    }

    /// Release `resource`.
    ///
    /// Fails with `ClientError::Rejected` if this connection does not hold it.
    pub async fn unlock(&mut self, resource: &ResourceName) -> Result<()> {
        self.expect_ok(Command::Unlock(resource.clone())).await
    }

    /// End the session. The server releases anything still held.
    pub async fn quit(mut self) -> Result<()> {
        self.expect_ok(Command::Quit).await
    }

    async fn expect_ok(&mut self, command: Command) -> Result<()> {
        match self.request(&command).await? {
            Response::Ok => Ok(()),
            Response::Err => Err(ClientError::Rejected { command: command.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, DuplexStream};

    use super::*;

    fn name(s: &str) -> ResourceName {
        ResourceName::new(s).unwrap()
    }

    async fn expect_line(server: &mut DuplexStream, expected: &[u8]) {
        let mut buf = vec![0; expected.len()];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, expected);
    }

    #[tokio::test]
    async fn lock_sends_the_command_line() {
        let (stream, mut server) = tokio::io::duplex(256);
        let mut client = LockClient::new(stream);

        server.write_all(b"OK\n").await.unwrap();
        client.lock(&name("my file")).await.unwrap();

        expect_line(&mut server, b"LOCK my file\n").await;
    }

    #[tokio::test]
    async fn err_response_is_a_rejection() {
        let (stream, mut server) = tokio::io::duplex(256);
        let mut client = LockClient::new(stream);

        server.write_all(b"ERR\n").await.unwrap();
        let err = client.unlock(&name("foo")).await.unwrap_err();

        assert!(matches!(err, ClientError::Rejected { ref command } if command == "UNLOCK foo"));
    }

    #[tokio::test]
    async fn eof_before_response_is_connection_closed() {
        let (stream, server) = tokio::io::duplex(256);
        let mut client = LockClient::new(stream);
        drop(server);

        let err = client.lock(&name("foo")).await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed | ClientError::Io(_)));
    }

    #[tokio::test]
    async fn partial_response_is_connection_closed() {
        let (stream, mut server) = tokio::io::duplex(256);
        let mut client = LockClient::new(stream);

        let request = tokio::spawn(async move { client.request(&Command::Quit).await });
        expect_line(&mut server, b"QUIT\n").await;
        server.write_all(b"O").await.unwrap();
        drop(server);

        assert!(matches!(request.await.unwrap(), Err(ClientError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn garbage_response_is_a_protocol_error() {
        let (stream, mut server) = tokio::io::duplex(256);
        let mut client = LockClient::new(stream);

        server.write_all(b"MAYBE\n").await.unwrap();
        let err = client.request(&Command::Quit).await.unwrap_err();

        assert!(matches!(err, ClientError::Protocol(_)));
    }
}
