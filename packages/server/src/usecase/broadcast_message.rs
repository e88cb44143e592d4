//! UseCase: ブロードキャスト処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 呼び出し時点の Registry のスナップショット全員に 1 通ずつ届くことを保証する
//! - 1 つの接続への配送失敗が他の接続への配送を止めないことを確認する
//! - 配送が並行に行われることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数接続への配送
//! - 異常系：一部の接続が既に閉じている／書き込みに失敗する
//! - エッジケース：接続が 0 件

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::domain::{ConnectionId, ConnectionRegistry, DeliveryError, OutboundMessage};

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Size of the registry snapshot the broadcast was sent to
    pub attempted: usize,
    /// Connections that acknowledged the write
    pub delivered: Vec<ConnectionId>,
    /// One entry per connection the message did not reach
    pub failures: Vec<DeliveryError>,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// ブロードキャストのユースケース（Broadcast Dispatcher）
pub struct BroadcastMessageUseCase {
    /// Registry（接続集合の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
}

impl BroadcastMessageUseCase {
    /// 新しい BroadcastMessageUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// ブロードキャストを実行
    ///
    /// Delivers `message` to every member of a registry snapshot taken at call
    /// time. Each delivery runs in its own task; the call returns once all of
    /// them have finished. Failures are collected per connection and never
    /// stop the other deliveries.
    pub async fn execute(&self, message: OutboundMessage) -> BroadcastReport {
        let targets = self.registry.snapshot().await;
        let mut report = BroadcastReport {
            attempted: targets.len(),
            ..BroadcastReport::default()
        };

        if targets.is_empty() {
            tracing::debug!("No connections registered, nothing to broadcast");
            return report;
        }

        let mut deliveries = JoinSet::new();
        for target in targets {
            let message = message.clone();
            deliveries.spawn(async move {
                let id = target.id;
                (id, target.deliver(message).await)
            });
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((id, Ok(()))) => {
                    tracing::debug!(connection_id = %id, "Delivered message");
                    report.delivered.push(id);
                }
                Ok((id, Err(e))) => {
                    tracing::warn!(connection_id = %id, error = %e, "Failed to deliver message");
                    report.failures.push(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Delivery task did not finish");
                    report.failures.push(DeliveryError::Aborted(e.to_string()));
                }
            }
        }

        report
    }
}
