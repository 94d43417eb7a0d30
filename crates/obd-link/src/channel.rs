//! Adapter Byte Channel
//!
//! Half-duplex request/response channel to a diagnostic adapter.

use crate::error::LinkError;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::debug;

/// Default per-read timeout
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;

/// Duplex byte stream usable as a channel backing
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ByteStream for T {}

/// Exclusive channel to the adapter.
///
/// The wire protocol is strictly half-duplex: one request/response exchange
/// in flight at a time. Exclusive `&mut` access enforces that here; callers
/// that need concurrent use must serialize outside this crate.
pub struct Channel {
    stream: Box<dyn ByteStream>,
    read_timeout: Duration,
    open: bool,
}

impl Channel {
    /// Wrap a duplex stream with a per-read timeout
    pub fn new(stream: impl ByteStream + 'static, read_timeout: Duration) -> Self {
        Self {
            stream: Box::new(stream),
            read_timeout,
            open: true,
        }
    }

    /// Change the per-read timeout
    pub fn set_read_timeout(&mut self, read_timeout: Duration) {
        self.read_timeout = read_timeout;
    }

    /// Current per-read timeout
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Whether the channel is still usable
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Write all bytes and flush
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::ChannelClosed);
        }
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read a single byte, `None` on end of stream.
    ///
    /// A read that outlives the configured timeout yields
    /// [`LinkError::ReadTimeout`].
    pub async fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        if !self.open {
            return Err(LinkError::ChannelClosed);
        }
        let mut buf = [0u8; 1];
        match timeout(self.read_timeout, self.stream.read(&mut buf)).await {
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(_)) => Ok(Some(buf[0])),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(LinkError::ReadTimeout(self.read_timeout.as_millis() as u64)),
        }
    }

    /// Flush and shut the stream down.
    ///
    /// Any use of the channel afterwards fails with
    /// [`LinkError::ChannelClosed`].
    pub async fn close(&mut self) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::ChannelClosed);
        }
        self.open = false;
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        debug!("Channel closed");
        Ok(())
    }
}
