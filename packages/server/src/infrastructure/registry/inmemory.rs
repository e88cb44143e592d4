//! InMemory ConnectionRegistry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! `HashMap<ConnectionId, ConnectionHandle>` を `tokio::sync::Mutex` で保護します。
//!
//! ロックは登録・削除・スナップショット取得の間だけ保持し、
//! 配送（`ConnectionHandle::deliver`）の間は保持しません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionHandle, ConnectionId, ConnectionRegistry, RegistryError};

/// インメモリ ConnectionRegistry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// 接続中のコネクション
    ///
    /// Key: ConnectionId
    /// Value: ConnectionHandle
    connections: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
}

impl InMemoryConnectionRegistry {
    /// 空の InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn add(&self, connection: ConnectionHandle) -> Result<(), RegistryError> {
        let mut connections = self.connections.lock().await;

        if connections.contains_key(&connection.id) {
            return Err(RegistryError::DuplicateConnection(connection.id));
        }

        let id = connection.id;
        connections.insert(id, connection);
        tracing::debug!(
            connection_id = %id,
            total = connections.len(),
            "Connection registered"
        );
        Ok(())
    }

    async fn remove(&self, connection_id: &ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(connection_id).is_some();

        if removed {
            tracing::debug!(
                connection_id = %connection_id,
                total = connections.len(),
                "Connection unregistered"
            );
        }
        removed
    }

    async fn snapshot(&self) -> Vec<ConnectionHandle> {
        let connections = self.connections.lock().await;
        connections.values().cloned().collect()
    }

    async fn count(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}
