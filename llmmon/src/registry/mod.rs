//! 通知受信者レジストリ
//!
//! 購読・購読解除はどちらも冪等で、重複・不在はエラーにしない。

use crate::db::recipients;
use crate::types::Recipient;
use sqlx::SqlitePool;
use tracing::info;

/// 受信者レジストリ
#[derive(Clone)]
pub struct RecipientRegistry {
    pool: SqlitePool,
}

impl RecipientRegistry {
    /// 新しいレジストリを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 購読を登録（新規登録なら`true`）
    pub async fn subscribe(&self, recipient_id: &str) -> Result<bool, sqlx::Error> {
        let created = recipients::add_recipient(&self.pool, recipient_id).await?;
        if created {
            info!(recipient_id = %recipient_id, "Recipient subscribed");
        }
        Ok(created)
    }

    /// 購読を解除（削除した場合は`true`）
    pub async fn unsubscribe(&self, recipient_id: &str) -> Result<bool, sqlx::Error> {
        let removed = recipients::remove_recipient(&self.pool, recipient_id).await?;
        if removed {
            info!(recipient_id = %recipient_id, "Recipient unsubscribed");
        }
        Ok(removed)
    }

    /// 受信者一覧
    pub async fn list(&self) -> Result<Vec<Recipient>, sqlx::Error> {
        recipients::list_recipients(&self.pool).await
    }

    /// 受信者数
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        recipients::count_recipients(&self.pool).await
    }
}
