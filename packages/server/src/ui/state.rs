//! Shared application state.

use std::sync::Arc;

use tokio::sync::watch;

use crate::usecase::{ConnectUseCase, DisconnectUseCase, GetConnectionsUseCase};

/// Shared application state
pub struct AppState {
    /// ConnectUseCase（接続登録のユースケース）
    pub connect_usecase: Arc<ConnectUseCase>,
    /// DisconnectUseCase（切断のユースケース）
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    /// GetConnectionsUseCase（接続一覧取得のユースケース）
    pub get_connections_usecase: Arc<GetConnectionsUseCase>,
    /// Flips to `true` once the server starts shutting down
    pub shutdown: watch::Receiver<bool>,
}
