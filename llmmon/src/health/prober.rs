//! プローバー
//!
//! 監視対象ごとに1回のプローブを実行し、結果の記録と遷移検出を行う。

use super::transition::{
    detect_transition, event_message, truncate_chars, Transition, MAX_ERROR_CHARS,
};
use crate::common::error::ProbeError;
use crate::db::{event_queue, probe_results, targets};
use crate::types::ProbeResult;
use crate::upstream::{ProbeResponse, ProbeTransport};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 成功とみなすHTTPステータス
const SUCCESS_STATUS: u16 = 200;

/// 1監視対象のプローブ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// 記録したプローブ結果
    pub result: ProbeResult,
    /// 検出した遷移（イベントをキューに積んだ場合）
    pub transition: Option<Transition>,
}

/// プローブサイクルの集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeCycleReport {
    /// 記録まで完了した監視対象数
    pub probed: usize,
    /// 成功数
    pub succeeded: usize,
    /// 失敗数
    pub failed: usize,
    /// キューに積んだイベント数
    pub events: usize,
    /// ストレージエラーで記録できなかった監視対象数
    pub errors: usize,
    /// APIキー未設定でサイクル自体をスキップした
    pub skipped: bool,
}

/// プローバー
#[derive(Clone)]
pub struct Prober {
    pool: SqlitePool,
    transport: Arc<dyn ProbeTransport>,
    timeout: Duration,
    concurrency: usize,
}

impl Prober {
    /// 新しいプローバーを作成
    pub fn new(
        pool: SqlitePool,
        transport: Arc<dyn ProbeTransport>,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            pool,
            transport,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// 有効な全監視対象をプローブ
    ///
    /// 同時実行数は`concurrency`で制限する。個別のストレージエラーは
    /// ログ出力して他の監視対象の処理を続ける。
    pub async fn run_cycle(&self) -> ProbeCycleReport {
        if !self.transport.is_ready() {
            warn!("OpenRouter API key not set, skipping health checks");
            return ProbeCycleReport {
                skipped: true,
                ..Default::default()
            };
        }

        let target_ids = match targets::list_active_target_ids(&self.pool).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "Failed to list active targets");
                return ProbeCycleReport::default();
            }
        };

        info!(
            count = target_ids.len(),
            concurrency = self.concurrency,
            "Starting health checks"
        );

        let outcomes: Vec<_> = stream::iter(target_ids)
            .map(|id| async move {
                let outcome = self.probe_target(&id).await;
                (id, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = ProbeCycleReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(outcome) => {
                    report.probed += 1;
                    if outcome.result.success {
                        report.succeeded += 1;
                    } else {
                        report.failed += 1;
                    }
                    if outcome.transition.is_some() {
                        report.events += 1;
                    }
                }
                Err(e) => {
                    report.errors += 1;
                    error!(target_id = %id, error = %e, "Failed to record probe result");
                }
            }
        }

        info!(
            probed = report.probed,
            succeeded = report.succeeded,
            failed = report.failed,
            events = report.events,
            "Health checks completed"
        );

        report
    }

    /// 単一監視対象のプローブ
    ///
    /// 直前の成否を読み、プローブを1回実行し、結果を記録した後で
    /// 遷移があればイベントをキューに積む。
    pub async fn probe_target(&self, target_id: &str) -> Result<ProbeOutcome, sqlx::Error> {
        let previous = probe_results::latest_success(&self.pool, target_id).await?;

        let started = Instant::now();
        let probe = self.transport.send_probe(target_id);
        let response = match tokio::time::timeout(self.timeout, probe).await {
            Ok(response) => response,
            Err(_) => Err(ProbeError::Timeout(self.timeout.as_millis() as u64)),
        };
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (status_code, success, error_text) = classify(response);

        let mut result = ProbeResult {
            id: 0,
            target_id: target_id.to_string(),
            checked_at: Utc::now(),
            status_code,
            latency_ms,
            success,
            error_text,
        };
        result.id = probe_results::insert_probe_result(&self.pool, &result).await?;

        if success {
            debug!(target_id = %target_id, latency_ms, "Probe succeeded");
        } else {
            warn!(
                target_id = %target_id,
                status_code,
                error = result.error_text.as_deref().unwrap_or_default(),
                "Probe failed"
            );
        }

        let transition = detect_transition(previous, success);
        if let Some(transition) = transition {
            let message = event_message(target_id, transition, result.error_text.as_deref());
            event_queue::enqueue_event(&self.pool, &message).await?;
            info!(target_id = %target_id, ?transition, "State transition queued");
        }

        Ok(ProbeOutcome { result, transition })
    }
}

/// プローブ応答を(ステータス, 成否, エラー内容)に分類
fn classify(response: Result<ProbeResponse, ProbeError>) -> (u16, bool, Option<String>) {
    match response {
        Ok(resp) if resp.status == SUCCESS_STATUS => (resp.status, true, None),
        Ok(resp) => (
            resp.status,
            false,
            Some(format!(
                "HTTP {}: {}",
                resp.status,
                truncate_chars(&resp.body, MAX_ERROR_CHARS)
            )),
        ),
        Err(e) => (0, false, Some(truncate_chars(&e.to_string(), MAX_ERROR_CHARS))),
    }
}
