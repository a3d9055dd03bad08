//! Integration Test: HTTP API
//!
//! 実際にTCPで待ち受けたサーバーに対して、ヘルスチェックと
//! ステータス一覧を取得する。

use std::sync::Arc;
use std::time::Duration;

use llmmon::db::targets;
use llmmon::health::Prober;
use llmmon::types::Target;
use llmmon::{api, AppState};
use serde_json::Value;

use crate::support::{create_test_db_pool, ScriptedTransport};

#[tokio::test]
async fn test_status_endpoint_over_http() {
    let pool = create_test_db_pool().await;
    for id in ["fast", "broken", "fresh"] {
        targets::upsert_target(&pool, &Target::new(id, id))
            .await
            .unwrap();
    }
    let transport = ScriptedTransport::new().script("broken", &[false]);
    let prober = Prober::new(pool.clone(), Arc::new(transport), Duration::from_secs(5), 1);
    prober.probe_target("fast").await.unwrap();
    prober.probe_target("broken").await.unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = api::create_router(AppState { db_pool: pool });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let health: Value = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let status: Value = client
        .get(format!("http://{}/api/status", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<_> = status
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["fast", "broken", "fresh"]);
    assert_eq!(status[1]["state"], "down");
    assert_eq!(status[2]["state"], "unknown");
}
