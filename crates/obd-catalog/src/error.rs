//! Catalog Error Types

use thiserror::Error;

/// Reasons a raw response fragment cannot be decoded to a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The positive reply echo for this command was not found
    #[error("Reply echo {expected} not found in response {response:?}")]
    MissingEcho { expected: String, response: String },

    /// The reply carries no payload bytes after the echo
    #[error("Reply carries no payload bytes")]
    EmptyPayload,

    /// Payload hex has an odd number of digits
    #[error("Payload has an odd hex length of {0}")]
    OddHexLength(usize),

    /// Payload contains something that is not a hex digit
    #[error("Payload contains a non-hex pair {0:?}")]
    BadHexPair(String),

    /// The formula needs more payload bytes than the reply carries
    #[error("Payload too short: expected {expected} bytes, got {actual}")]
    ShortPayload { expected: usize, actual: usize },
}
