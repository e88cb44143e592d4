//! Server execution logic.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    usecase::{BroadcastMessageUseCase, ConnectUseCase, DisconnectUseCase, GetConnectionsUseCase},
};

use super::{
    error::ServerError,
    handler::{health_check, list_connections, websocket_handler},
    operator::{OperatorExit, OperatorReceiver, run_operator_loop, spawn_operator_input},
    signal::shutdown_signal,
    state::AppState,
};

/// How long to wait for open connections to close after shutdown starts
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Broadcast fan-out server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_usecase,
///     disconnect_usecase,
///     broadcast_usecase,
///     get_connections_usecase,
/// );
/// server.run(ServerConfig::default()).await?;
/// ```
pub struct Server {
    /// ConnectUseCase（接続登録のユースケース）
    connect_usecase: Arc<ConnectUseCase>,
    /// DisconnectUseCase（切断のユースケース）
    disconnect_usecase: Arc<DisconnectUseCase>,
    /// BroadcastMessageUseCase（ブロードキャストのユースケース）
    broadcast_usecase: Arc<BroadcastMessageUseCase>,
    /// GetConnectionsUseCase（接続一覧取得のユースケース）
    get_connections_usecase: Arc<GetConnectionsUseCase>,
}

impl Server {
    pub fn new(
        connect_usecase: Arc<ConnectUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        broadcast_usecase: Arc<BroadcastMessageUseCase>,
        get_connections_usecase: Arc<GetConnectionsUseCase>,
    ) -> Self {
        Self {
            connect_usecase,
            disconnect_usecase,
            broadcast_usecase,
            get_connections_usecase,
        }
    }

    /// Bind `config.bind_addr()`, read operator input from stdin and serve
    /// until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn run(self, config: ServerConfig) -> Result<(), ServerError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let operator = spawn_operator_input(config.input_mode, config.prompt);

        self.serve(listener, operator, shutdown_signal()).await
    }

    /// Serve on an already bound listener.
    ///
    /// Runs until `shutdown` resolves or the operator interrupts input. End of
    /// operator input alone does not stop the server.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        operator: OperatorReceiver,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let app_state = Arc::new(AppState {
            connect_usecase: self.connect_usecase,
            disconnect_usecase: self.disconnect_usecase.clone(),
            get_connections_usecase: self.get_connections_usecase,
            shutdown: shutdown_rx,
        });

        let app = Router::new()
            // WebSocket エンドポイント
            .route("/", get(websocket_handler))
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/connections", get(list_connections))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        let local_addr = listener.local_addr()?;
        tracing::info!("WebSocket server started on ws://{}", local_addr);
        tracing::info!("Type a message and press Enter to broadcast it to every client");

        let operator_task = tokio::spawn(run_operator_loop(operator, self.broadcast_usecase));
        let operator_abort = operator_task.abort_handle();

        let graceful = async move {
            tokio::select! {
                _ = shutdown => {}
                _ = operator_interrupted(operator_task) => {}
            }
            // tell every connection handler to close its socket
            let _ = shutdown_tx.send(true);
        };

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(graceful)
        .await?;

        operator_abort.abort();
        drain_connections(&self.disconnect_usecase).await;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Resolves only if the operator interrupted; end of input keeps the server running.
async fn operator_interrupted(operator_task: tokio::task::JoinHandle<OperatorExit>) {
    match operator_task.await {
        Ok(OperatorExit::Interrupted) => {}
        Ok(OperatorExit::EndOfInput) => {
            tracing::info!("No more operator input; still serving connections");
            std::future::pending::<()>().await;
        }
        Err(e) => {
            tracing::error!("Operator input task failed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Wait (bounded) for connection handlers to unregister after shutdown.
async fn drain_connections(disconnect_usecase: &DisconnectUseCase) {
    let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while disconnect_usecase.count_remaining_connections().await > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    })
    .await
    .is_ok();

    if !drained {
        let remaining = disconnect_usecase.count_remaining_connections().await;
        tracing::warn!(remaining, "Connections still open after shutdown timeout");
    }
}
