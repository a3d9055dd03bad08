//! 通知受信者データベース操作

use super::{format_timestamp, parse_timestamp};
use crate::types::Recipient;
use chrono::Utc;
use sqlx::SqlitePool;

/// 受信者を追加（既に存在する場合は何もしない）
///
/// 新規に追加された場合は`true`を返す。
pub async fn add_recipient(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT OR IGNORE INTO recipients (id, subscribed_at) VALUES (?, ?)")
        .bind(id)
        .bind(format_timestamp(&Utc::now()))
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 受信者を削除（存在しない場合もエラーにしない）
///
/// 削除された場合は`true`を返す。
pub async fn remove_recipient(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM recipients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 受信者一覧（購読順）
pub async fn list_recipients(pool: &SqlitePool) -> Result<Vec<Recipient>, sqlx::Error> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT id, subscribed_at FROM recipients ORDER BY subscribed_at, id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, subscribed_at)| Recipient {
            id,
            subscribed_at: parse_timestamp(&subscribed_at),
        })
        .collect())
}

/// 受信者数
pub async fn count_recipients(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM recipients")
        .fetch_one(pool)
        .await
}
