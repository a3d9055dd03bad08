//! 通知送信インターフェース

use crate::common::error::DeliveryError;
use async_trait::async_trait;
use tracing::info;

/// 1受信者へのメッセージ送信手段
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// メッセージを送信
    async fn send(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryError>;
}

/// ログ出力のみ行う送信手段（Botトークン未設定時）
#[derive(Debug, Clone, Default)]
pub struct LogSender;

#[async_trait]
impl MessageSender for LogSender {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryError> {
        info!(recipient_id = %recipient_id, message = %text, "Notification (log only)");
        Ok(())
    }
}
