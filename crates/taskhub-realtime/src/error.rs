//! Socket write-path errors.

use std::time::Duration;

use thiserror::Error;

/// Failure writing a frame to a client socket.
///
/// Every variant ends the owning connection; none is retried.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket rejected the frame.
    #[error("socket send failed: {0}")]
    Send(#[from] axum::Error),
    /// The write did not complete within the configured timeout.
    #[error("write timed out after {0:?}")]
    Timeout(Duration),
    /// The outbound message could not be encoded.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}
