//! Connection entity and its lifecycle.

use tokio::sync::{mpsc, oneshot};

use super::{
    error::{ConnectionStateError, DeliveryError},
    value_object::{ConnectionId, OutboundMessage, Timestamp},
};

/// One message handed to the task that owns a socket.
///
/// The socket task reports the result of the write through `ack`.
#[derive(Debug)]
pub struct Delivery {
    pub message: OutboundMessage,
    pub ack: oneshot::Sender<Result<(), String>>,
}

/// Sending half towards the socket task of one connection
pub type PusherChannel = mpsc::UnboundedSender<Delivery>;

/// Receiving half, drained by the socket task
pub type PusherReceiver = mpsc::UnboundedReceiver<Delivery>;

/// Lifecycle of a connection: `Connecting -> Open -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    ///
    /// A failed handshake goes straight from `Connecting` to `Closed`.
    pub fn transition(self, next: ConnectionState) -> Result<ConnectionState, ConnectionStateError> {
        use ConnectionState::*;

        match (self, next) {
            (Connecting, Open) | (Connecting, Closed) | (Open, Closed) => Ok(next),
            (from, to) => Err(ConnectionStateError::InvalidTransition { from, to }),
        }
    }
}

/// Handle to one open connection, as held by the registry.
///
/// Cloning a handle does not duplicate the connection; every clone feeds the
/// same socket task.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub connected_at: Timestamp,
    channel: PusherChannel,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, connected_at: Timestamp, channel: PusherChannel) -> Self {
        Self {
            id,
            connected_at,
            channel,
        }
    }

    /// Hand `message` to the socket task and wait for the write result.
    pub async fn deliver(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        let (ack_tx, ack_rx) = oneshot::channel();

        self.channel
            .send(Delivery {
                message,
                ack: ack_tx,
            })
            .map_err(|_| DeliveryError::ChannelClosed(self.id))?;

        match ack_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(DeliveryError::SocketWrite {
                id: self.id,
                reason,
            }),
            // socket task dropped the delivery without writing it
            Err(_) => Err(DeliveryError::ChannelClosed(self.id)),
        }
    }
}
