//! Scanner Error Types

use crate::session::SessionState;
use obd_link::LinkError;
use thiserror::Error;

/// Errors surfaced by discovery, batch execution, and the session
#[derive(Debug, Error)]
pub enum ScanError {
    /// The channel itself failed; the whole call is abandoned
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Operation called out of lifecycle order
    #[error("{operation} is not valid in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// Batch result and supported set disagree on length
    #[error("Batch has {actual} fragments but the supported set has {expected} commands")]
    ShapeMismatch { expected: usize, actual: usize },
}
