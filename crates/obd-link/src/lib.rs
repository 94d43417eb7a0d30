//! Adapter Link Layer
//!
//! Byte-channel abstraction over TCP sockets and serial lines for
//! request/response style diagnostic adapters. Higher layers see a single
//! [`Channel`] type regardless of how the adapter is attached.

mod channel;
mod error;
mod transport;

pub use channel::{ByteStream, Channel, DEFAULT_READ_TIMEOUT_MS};
pub use error::LinkError;
pub use transport::{open_serial, open_tcp, SerialConfig, DEFAULT_BAUD_RATE};
