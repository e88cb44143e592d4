//! WebSocket connection handlers.

use std::{fmt, net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::{Sink, SinkExt},
    stream::{Stream, StreamExt},
};
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{ConnectionId, ConnectionState, Delivery, PusherReceiver},
    ui::state::AppState,
};

/// Why a connection left the `Open` state
#[derive(Debug, Clone, PartialEq, Eq)]
enum CloseReason {
    PeerClosed,
    TransportError(String),
    ServerShutdown,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => write!(f, "peer closed"),
            CloseReason::TransportError(e) => write!(f, "transport error: {}", e),
            CloseReason::ServerShutdown => write!(f, "server shutdown"),
        }
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    tracing::debug!(%peer, "WebSocket upgrade requested");

    ws.on_failed_upgrade(move |e| {
        // Connecting -> Closed; the connection never reached the registry
        tracing::warn!(%peer, error = %e, "WebSocket handshake failed");
    })
    .on_upgrade(move |socket| handle_socket(socket, state, peer))
}

/// Record a lifecycle transition for `id`.
fn advance(state: &mut ConnectionState, next: ConnectionState, id: Option<ConnectionId>) {
    match state.transition(next) {
        Ok(next) => *state = next,
        Err(e) => tracing::warn!(connection_id = ?id, error = %e, "Unexpected lifecycle transition"),
    }
}

/// Spawns the task that owns the write half of the socket.
///
/// It drains deliveries from the dispatcher, writes each one as a text frame and
/// acknowledges the result. On server shutdown it sends a Close frame and stops.
fn pusher_loop<S>(
    mut rx: PusherReceiver,
    mut sender: S,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<CloseReason>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: fmt::Display + Send,
{
    tokio::spawn(async move {
        loop {
            if *shutdown.borrow_and_update() {
                let _ = sender
                    .send(Message::Close(Some(CloseFrame {
                        code: close_code::AWAY,
                        reason: "server shutting down".into(),
                    })))
                    .await;
                return CloseReason::ServerShutdown;
            }

            tokio::select! {
                delivery = rx.recv() => {
                    let Some(Delivery { message, ack }) = delivery else {
                        // every handle is gone, the registry itself was dropped
                        return CloseReason::ServerShutdown;
                    };

                    let result = sender
                        .send(Message::Text(message.into_string().into()))
                        .await
                        .map_err(|e| e.to_string());
                    let failure = result.as_ref().err().cloned();
                    let _ = ack.send(result);

                    if let Some(e) = failure {
                        return CloseReason::TransportError(e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // server state dropped without an explicit signal
                        return CloseReason::ServerShutdown;
                    }
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, peer: SocketAddr) {
    let (sender, receiver) = socket.split();
    serve_connection(sender, receiver, state, peer).await;
}

/// Register an upgraded connection, pump it until either half ends, then
/// unregister it.
async fn serve_connection<S, R, E>(sender: S, mut receiver: R, state: Arc<AppState>, peer: SocketAddr)
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: fmt::Display + Send,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let mut lifecycle = ConnectionState::Connecting;

    // The handshake is complete at this point, so the connection may be registered
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = match state.connect_usecase.execute(tx).await {
        Ok(connection) => connection,
        Err(e) => {
            advance(&mut lifecycle, ConnectionState::Closed, None);
            tracing::warn!(%peer, error = %e, "Failed to register connection");
            return;
        }
    };
    let connection_id = connection.id;
    advance(&mut lifecycle, ConnectionState::Open, Some(connection_id));
    tracing::info!(%peer, %connection_id, "Client connected");

    // Inbound frames are not part of the protocol; only watch for close/error
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    tracing::debug!(%connection_id, len = text.as_str().len(), "Ignoring inbound text frame");
                }
                Ok(Message::Binary(data)) => {
                    tracing::debug!(%connection_id, len = data.len(), "Ignoring inbound binary frame");
                }
                Ok(Message::Close(frame)) => {
                    tracing::debug!(%connection_id, ?frame, "Client requested close");
                    return CloseReason::PeerClosed;
                }
                // Ping/pong is handled by the WebSocket protocol layer
                Ok(_) => {}
                Err(e) => return CloseReason::TransportError(e.to_string()),
            }
        }
        CloseReason::PeerClosed
    });

    let mut send_task = pusher_loop(rx, sender, state.shutdown.clone());

    // If any one of the tasks completes, abort the other
    let reason = tokio::select! {
        result = &mut recv_task => {
            send_task.abort();
            result.unwrap_or_else(|e| CloseReason::TransportError(e.to_string()))
        }
        result = &mut send_task => {
            recv_task.abort();
            result.unwrap_or_else(|e| CloseReason::TransportError(e.to_string()))
        }
    };

    let was_registered = state.disconnect_usecase.execute(&connection_id).await;
    advance(&mut lifecycle, ConnectionState::Closed, Some(connection_id));

    let remaining = state.disconnect_usecase.count_remaining_connections().await;
    match &reason {
        CloseReason::TransportError(_) => tracing::warn!(
            %peer, %connection_id, %reason, was_registered, remaining,
            "Client disconnected"
        ),
        _ => tracing::info!(
            %peer, %connection_id, %reason, was_registered, remaining,
            "Client disconnected"
        ),
    }
}
