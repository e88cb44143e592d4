//! UseCase: 切断処理
//!
//! 切断の検知（ピアの Close、送受信エラー、サーバ停止）は複数経路から
//! 同時に起こりうるため、削除は冪等に扱います。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry};

/// 切断のユースケース
pub struct DisconnectUseCase {
    /// Registry（接続集合の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectUseCase {
    /// 新しい DisconnectUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// `true` if the connection was still registered, `false` if an earlier
    /// disconnect signal already removed it.
    pub async fn execute(&self, connection_id: &ConnectionId) -> bool {
        self.registry.remove(connection_id).await
    }

    /// 残りの接続数を取得
    pub async fn count_remaining_connections(&self) -> usize {
        self.registry.count().await
    }
}
