//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{infrastructure::dto::http::ConnectionListDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// List currently open connections
pub async fn list_connections(State(state): State<Arc<AppState>>) -> Json<ConnectionListDto> {
    let connections = state.get_connections_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(ConnectionListDto::from(connections))
}
