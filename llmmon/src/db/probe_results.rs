//! プローブ結果データベース操作
//!
//! プローブ結果は追記のみで、更新・削除は行わない。

use super::{format_timestamp, parse_timestamp};
use crate::types::ProbeResult;
use sqlx::SqlitePool;

/// プローブ結果を記録し、採番されたIDを返す
pub async fn insert_probe_result(
    pool: &SqlitePool,
    result: &ProbeResult,
) -> Result<i64, sqlx::Error> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO probe_results (
            target_id, checked_at, status_code, latency_ms, success, error_text
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&result.target_id)
    .bind(format_timestamp(&result.checked_at))
    .bind(result.status_code as i64)
    .bind(result.latency_ms as i64)
    .bind(result.success)
    .bind(&result.error_text)
    .execute(pool)
    .await?;

    Ok(inserted.last_insert_rowid())
}

/// 直前のプローブ結果の成否（履歴がなければ`None`）
pub async fn latest_success(
    pool: &SqlitePool,
    target_id: &str,
) -> Result<Option<bool>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT success FROM probe_results
        WHERE target_id = ?
        ORDER BY checked_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(target_id)
    .fetch_optional(pool)
    .await
}

/// 監視対象のプローブ履歴（古い順）
pub async fn list_for_target(
    pool: &SqlitePool,
    target_id: &str,
) -> Result<Vec<ProbeResult>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProbeResultRow>(
        r#"
        SELECT id, target_id, checked_at, status_code, latency_ms, success, error_text
        FROM probe_results
        WHERE target_id = ?
        ORDER BY checked_at ASC, id ASC
        "#,
    )
    .bind(target_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct ProbeResultRow {
    id: i64,
    target_id: String,
    checked_at: String,
    status_code: i64,
    latency_ms: i64,
    success: bool,
    error_text: Option<String>,
}

impl From<ProbeResultRow> for ProbeResult {
    fn from(row: ProbeResultRow) -> Self {
        ProbeResult {
            id: row.id,
            target_id: row.target_id,
            checked_at: parse_timestamp(&row.checked_at),
            status_code: u16::try_from(row.status_code).unwrap_or_default(),
            latency_ms: u64::try_from(row.latency_ms).unwrap_or_default(),
            success: row.success,
            error_text: row.error_text,
        }
    }
}
