//! ConnectionRegistry trait 定義
//!
//! ドメイン層が必要とする「接続中のコネクション集合」へのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ConnectionHandle, ConnectionId, RegistryError};

/// Authoritative set of open connections.
///
/// Implementations must be safe under concurrent `add`, `remove` and
/// `snapshot` calls from the connection handlers and the dispatcher.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Register a connection that has completed the handshake.
    async fn add(&self, connection: ConnectionHandle) -> Result<(), RegistryError>;

    /// Remove a connection. Returns `false` if it was not registered.
    async fn remove(&self, connection_id: &ConnectionId) -> bool;

    /// Copy of the current members, in no particular order.
    async fn snapshot(&self) -> Vec<ConnectionHandle>;

    /// Number of registered connections.
    async fn count(&self) -> usize;
}
