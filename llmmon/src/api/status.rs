//! ステータスAPIハンドラー

use crate::common::error::MonitorError;
use crate::db::{probe_results, status, targets};
use crate::types::{ProbeResult, TargetStatus};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

/// 履歴取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// 監視対象ID（`/`を含みうる）
    pub target_id: String,
}

/// GET /api/status
///
/// 有効な監視対象と最新プローブ結果（成功→失敗→未確認、応答時間順）
pub async fn list_status(
    State(state): State<AppState>,
) -> Result<Json<Vec<TargetStatus>>, MonitorError> {
    let rows = status::list_target_status(&state.db_pool).await?;
    Ok(Json(rows))
}

/// GET /api/history?target_id=...
pub async fn target_history(
    State(state): State<AppState>,
    Query(HistoryQuery { target_id: id }): Query<HistoryQuery>,
) -> Result<Response, MonitorError> {
    if targets::get_target(&state.db_pool, &id).await?.is_none() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Target not found" })),
        )
            .into_response());
    }

    let history: Vec<ProbeResult> = probe_results::list_for_target(&state.db_pool, &id).await?;
    Ok(Json(history).into_response())
}
