//! 通知キューデータベース操作
//!
//! イベントは作成順（ID昇順）に配信され、配信処理後に`sent = 1`となる。

use super::{format_timestamp, parse_timestamp};
use crate::types::QueuedEvent;
use chrono::Utc;
use sqlx::SqlitePool;

/// イベントをキューに追加し、採番されたIDを返す
pub async fn enqueue_event(pool: &SqlitePool, message: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO event_queue (message, created_at, sent) VALUES (?, ?, 0)")
        .bind(message)
        .bind(format_timestamp(&Utc::now()))
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// 未配信イベント一覧（作成順）
pub async fn list_pending(pool: &SqlitePool) -> Result<Vec<QueuedEvent>, sqlx::Error> {
    let rows = sqlx::query_as::<_, QueuedEventRow>(
        r#"
        SELECT id, message, created_at, sent
        FROM event_queue
        WHERE sent = 0
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// イベントを配信済みにする
pub async fn mark_sent(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE event_queue SET sent = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// 複数イベントを1トランザクションで配信済みにする
pub async fn mark_sent_many(pool: &SqlitePool, ids: &[i64]) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for id in ids {
        sqlx::query("UPDATE event_queue SET sent = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// 全イベント一覧（配信済みを含む）
#[cfg(test)]
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<QueuedEvent>, sqlx::Error> {
    let rows = sqlx::query_as::<_, QueuedEventRow>(
        "SELECT id, message, created_at, sent FROM event_queue ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct QueuedEventRow {
    id: i64,
    message: String,
    created_at: String,
    sent: bool,
}

impl From<QueuedEventRow> for QueuedEvent {
    fn from(row: QueuedEventRow) -> Self {
        QueuedEvent {
            id: row.id,
            message: row.message,
            created_at: parse_timestamp(&row.created_at),
            sent: row.sent,
        }
    }
}
