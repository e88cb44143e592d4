//! UseCase: 接続登録処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - ハンドシェイク完了後のコネクションだけが Registry に載ることを保証する
//! - 接続ごとに一意な ConnectionId が割り当てられることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録
//! - 正常系：複数接続がそれぞれ別の ID で登録される

use std::sync::Arc;

use fanout_shared::time::Clock;

use crate::domain::{
    ConnectionHandle, ConnectionIdFactory, ConnectionRegistry, PusherChannel, Timestamp,
};

use super::error::ConnectError;

/// 接続登録のユースケース
pub struct ConnectUseCase {
    /// Registry（接続集合の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// 接続時刻の取得元
    clock: Arc<dyn Clock>,
}

impl ConnectUseCase {
    /// 新しい ConnectUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// 接続登録を実行
    ///
    /// Must be called only after the WebSocket handshake has completed.
    ///
    /// # Arguments
    ///
    /// * `channel` - ソケットを所有するタスクへの送信チャネル
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionHandle)` - 登録されたコネクション
    /// * `Err(ConnectError)` - 登録失敗
    pub async fn execute(&self, channel: PusherChannel) -> Result<ConnectionHandle, ConnectError> {
        let handle = ConnectionHandle::new(
            ConnectionIdFactory::generate(),
            Timestamp::new(self.clock.now_millis()),
            channel,
        );

        self.registry.add(handle.clone()).await?;

        Ok(handle)
    }
}
