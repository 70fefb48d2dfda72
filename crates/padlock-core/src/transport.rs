//! Line framing over async byte streams.
//!
//! Commands arrive as `\n`-terminated lines; responses leave the same way.
//! The reader keeps whatever follows a complete line in its buffer, so
//! several commands delivered in one segment are handed out one at a time.
//! Nothing is stripped except the terminator itself: a `\r` before it stays
//! part of the line.

use std::io;

use bytes::{Bytes, BytesMut};
use padlock_proto::{LINE_TERMINATOR, Response};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::TransportError;

/// Bytes requested from the stream per read.
const READ_CHUNK: usize = 1024;

/// Splits an incoming byte stream into lines.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buf: BytesMut,
    /// Prefix of `buf` already known to contain no terminator.
    scanned: usize,
    max_line_length: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wrap a stream, refusing lines longer than `max_line_length` bytes.
    pub fn new(inner: R, max_line_length: usize) -> Self {
        Self { inner, buf: BytesMut::with_capacity(READ_CHUNK), scanned: 0, max_line_length }
    }

    /// Next complete line without its terminator.
    ///
    /// Returns `Ok(None)` once the peer has closed its side; an unterminated
    /// fragment left at that point is discarded. Cancel safe.
    pub async fn next_line(&mut self) -> Result<Option<Bytes>, TransportError> {
        loop {
            if let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == LINE_TERMINATOR) {
                let end = self.scanned + offset;
                self.scanned = 0;
                if end > self.max_line_length {
                    return Err(TransportError::LineTooLong { limit: self.max_line_length });
                }

                let mut line = self.buf.split_to(end + 1);
                line.truncate(end);
                return Ok(Some(line.freeze()));
            }

            self.scanned = self.buf.len();
            if self.buf.len() > self.max_line_length {
                return Err(TransportError::LineTooLong { limit: self.max_line_length });
            }

            if self.fill().await? == 0 {
                return Ok(None);
            }
        }
    }

    /// Read whatever the peer has sent into the buffer.
    ///
    /// Returns the number of bytes read; `0` means the peer closed the
    /// stream. Cancel safe.
    pub async fn fill(&mut self) -> io::Result<usize> {
        self.buf.reserve(READ_CHUNK);
        self.inner.read_buf(&mut self.buf).await
    }

    /// Number of bytes buffered but not yet returned as lines.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer already holds more than one line's worth of bytes.
    ///
    /// Callers reading ahead with [`fill`](Self::fill) stop once this is
    /// true, which keeps read-ahead bounded by the line limit.
    pub fn is_full(&self) -> bool {
        self.buf.len() > self.max_line_length
    }
}

/// Writes protocol responses.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    /// Wrap a stream.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write one response line and flush it.
    pub async fn send(&mut self, response: Response) -> io::Result<()> {
        self.inner.write_all(response.as_line()).await?;
        self.inner.flush().await
    }

    /// Close the write side of the stream.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.inner.shutdown().await
    }
}
