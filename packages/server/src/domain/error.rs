//! Domain error types.

use thiserror::Error;

use super::{entity::ConnectionState, value_object::ConnectionId};

/// Rejected lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionStateError {
    #[error("Invalid connection state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(ConnectionId),
}

/// Failure to deliver one message to one connection.
///
/// Always scoped to a single connection; a broadcast collects these instead of
/// stopping at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The socket task is gone (peer disconnected or handler finished)
    #[error("Connection '{0}' is no longer accepting messages")]
    ChannelClosed(ConnectionId),

    /// The socket task accepted the message but the write failed
    #[error("Failed to write to connection '{id}': {reason}")]
    SocketWrite { id: ConnectionId, reason: String },

    /// The delivery task itself panicked or was cancelled
    #[error("Delivery task aborted: {0}")]
    Aborted(String),
}

impl DeliveryError {
    /// Connection the failure belongs to, if it is known.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        match self {
            DeliveryError::ChannelClosed(id) => Some(*id),
            DeliveryError::SocketWrite { id, .. } => Some(*id),
            DeliveryError::Aborted(_) => None,
        }
    }
}
