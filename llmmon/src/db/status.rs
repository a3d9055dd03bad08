//! ダッシュボード用の最新状態クエリ

use super::parse_timestamp;
use crate::types::{probe::TargetState, TargetStatus};
use sqlx::SqlitePool;

/// 有効な監視対象と最新プローブ結果の一覧
///
/// 並び順: 成功 → 失敗 → 未確認、同じ成否内では応答時間の昇順、最後にID。
pub async fn list_target_status(pool: &SqlitePool) -> Result<Vec<TargetStatus>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TargetStatusRow>(
        r#"
        SELECT
            t.id, t.name, t.context_length, t.accepts_images,
            p.success, p.status_code, p.latency_ms, p.checked_at, p.error_text
        FROM targets t
        LEFT JOIN probe_results p ON p.id = (
            SELECT id FROM probe_results
            WHERE target_id = t.id
            ORDER BY checked_at DESC, id DESC
            LIMIT 1
        )
        WHERE t.active = 1
        ORDER BY p.success DESC, p.latency_ms ASC, t.id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct TargetStatusRow {
    id: String,
    name: String,
    context_length: i64,
    accepts_images: bool,
    success: Option<bool>,
    status_code: Option<i64>,
    latency_ms: Option<i64>,
    checked_at: Option<String>,
    error_text: Option<String>,
}

impl From<TargetStatusRow> for TargetStatus {
    fn from(row: TargetStatusRow) -> Self {
        TargetStatus {
            id: row.id,
            name: row.name,
            context_length: row.context_length,
            accepts_images: row.accepts_images,
            state: TargetState::from_last_success(row.success),
            success: row.success,
            status_code: row.status_code.and_then(|c| u16::try_from(c).ok()),
            latency_ms: row.latency_ms.and_then(|l| u64::try_from(l).ok()),
            checked_at: row.checked_at.as_deref().map(parse_timestamp),
            error_text: row.error_text,
        }
    }
}
