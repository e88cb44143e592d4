//! HTTP API response DTOs.

use fanout_shared::time::timestamp_to_rfc3339;
use serde::{Deserialize, Serialize};

use crate::domain::ConnectionHandle;

/// One open connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDto {
    pub connection_id: String,
    /// RFC 3339 (UTC)
    pub connected_at: String,
}

/// Response of `GET /api/connections`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionListDto {
    pub count: usize,
    pub connections: Vec<ConnectionDto>,
}

impl From<&ConnectionHandle> for ConnectionDto {
    fn from(handle: &ConnectionHandle) -> Self {
        Self {
            connection_id: handle.id.to_string(),
            connected_at: timestamp_to_rfc3339(handle.connected_at.value()),
        }
    }
}

impl From<Vec<ConnectionHandle>> for ConnectionListDto {
    fn from(handles: Vec<ConnectionHandle>) -> Self {
        let connections: Vec<ConnectionDto> = handles.iter().map(ConnectionDto::from).collect();
        Self {
            count: connections.len(),
            connections,
        }
    }
}
