//! Link Error Types

use thiserror::Error;

/// Errors that can occur on the adapter byte channel
#[derive(Debug, Error)]
pub enum LinkError {
    /// Connection to a network-attached adapter failed
    #[error("Connection to {0} failed: {1}")]
    Connect(String, String),

    /// Connection attempt exceeded the configured deadline
    #[error("Connection to {0} timed out after {1}ms")]
    ConnectTimeout(String, u64),

    /// Serial port could not be opened
    #[error("Serial port error: {0}")]
    Serial(String),

    /// Read or write failed at the I/O layer
    #[error("I/O error: {0}")]
    Io(String),

    /// No byte arrived within the read timeout
    #[error("Timeout waiting for adapter response after {0}ms")]
    ReadTimeout(u64),

    /// Stream ended before the response was complete
    #[error("Stream ended before the response was complete")]
    UnexpectedEof,

    /// Operation on a channel that was already closed
    #[error("Channel is closed")]
    ChannelClosed,
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::Io(err.to_string())
    }
}

impl From<tokio_serial::Error> for LinkError {
    fn from(err: tokio_serial::Error) -> Self {
        LinkError::Serial(err.to_string())
    }
}
