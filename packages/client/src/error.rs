//! Error types for the listener client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The WebSocket handshake did not succeed
    #[error("Failed to connect: {0}")]
    ConnectionFailed(String),

    /// An established connection ended without the user asking for it
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Gave up after the configured number of attempts
    #[error("Failed to reconnect after {0} attempts")]
    ReconnectExhausted(u32),
}
