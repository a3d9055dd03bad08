//! 統合テスト共通ユーティリティ

use async_trait::async_trait;
use llmmon::common::error::{DeliveryError, ProbeError};
use llmmon::db::migrations::run_migrations;
use llmmon::notify::MessageSender;
use llmmon::upstream::{ProbeResponse, ProbeTransport};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// テスト用のインメモリDBプール（マイグレーション済み）
pub async fn create_test_db_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

/// モデルごとに成否の列を順に返すプローブトランスポート
///
/// 列を使い切ったモデルは常に成功を返す。
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<bool>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, model_id: &str, outcomes: &[bool]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(model_id.to_string(), outcomes.iter().copied().collect());
        self
    }
}

#[async_trait]
impl ProbeTransport for ScriptedTransport {
    async fn send_probe(&self, model_id: &str) -> Result<ProbeResponse, ProbeError> {
        let ok = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model_id)
            .and_then(|s| s.pop_front())
            .unwrap_or(true);
        if ok {
            Ok(ProbeResponse {
                status: 200,
                body: "{}".to_string(),
            })
        } else {
            Ok(ProbeResponse {
                status: 503,
                body: "Provider returned error".to_string(),
            })
        }
    }
}

/// 送信内容を記録する送信手段
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient_id.to_string(), text.to_string()));
        Ok(())
    }
}
