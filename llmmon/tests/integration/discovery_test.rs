//! Integration Test: カタログディスカバリー
//!
//! OpenRouterのカタログAPIをモックし、無料モデルの登録と
//! カタログから消えたモデルのソフト無効化を検証する。

use std::sync::Arc;

use llmmon::db::{probe_results, targets};
use llmmon::discovery::Discoverer;
use llmmon::types::ProbeResult;
use llmmon::upstream::OpenRouterClient;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::create_test_db_pool;

async fn mount_catalog(server: &MockServer, catalog: serde_json::Value) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_only_free_model_becomes_target() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        json!({
            "data": [
                {
                    "id": "free/model-a",
                    "name": "Model A",
                    "context_length": 8000,
                    "pricing": {"prompt": "0", "completion": "0"},
                    "architecture": {"input_modalities": ["text", "image"]}
                },
                {
                    "id": "paid/model-b",
                    "name": "Model B",
                    "pricing": {"prompt": "0.001", "completion": "0.002"}
                }
            ]
        }),
    )
    .await;

    let pool = create_test_db_pool().await;
    let client = OpenRouterClient::new(server.uri(), None).unwrap();
    let discoverer = Discoverer::new(pool.clone(), Arc::new(client));

    let report = discoverer.run_cycle().await;
    assert_eq!(report.upserted, 1);

    let all = targets::list_targets(&pool).await.unwrap();
    assert_eq!(all.len(), 1);
    let target = &all[0];
    assert_eq!(target.id, "free/model-a");
    assert_eq!(target.name, "Model A");
    assert_eq!(target.context_length, 8000);
    assert!(target.accepts_images);
    assert!(target.active);
}

#[tokio::test]
async fn test_text_only_free_model_has_no_image_flag() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        json!({
            "data": [{
                "id": "free/model-a",
                "context_length": 8000,
                "pricing": {"prompt": "0", "completion": "0"}
            }]
        }),
    )
    .await;

    let pool = create_test_db_pool().await;
    let client = OpenRouterClient::new(server.uri(), None).unwrap();
    let discoverer = Discoverer::new(pool.clone(), Arc::new(client));

    let report = discoverer.run_cycle().await;
    assert_eq!(report.monitorable, 1);
    assert!(!report.aborted);

    let target = targets::get_target(&pool, "free/model-a")
        .await
        .unwrap()
        .unwrap();
    assert!(target.active);
    assert!(!target.accepts_images);
    assert_eq!(target.context_length, 8000);
    assert_eq!(target.name, "free/model-a");
}

#[tokio::test]
async fn test_paid_only_catalog_deactivates_previous_targets() {
    let server = MockServer::start().await;
    let pool = create_test_db_pool().await;
    let client = OpenRouterClient::new(server.uri(), None).unwrap();
    let discoverer = Discoverer::new(pool.clone(), Arc::new(client));

    mount_catalog(&server, json!({"data": [{"id": "a:free"}]})).await;
    discoverer.run_cycle().await;

    mount_catalog(
        &server,
        json!({"data": [{"id": "paid/model-b", "pricing": {"prompt": "0.001", "completion": "0.002"}}]}),
    )
    .await;
    let report = discoverer.run_cycle().await;
    assert!(!report.aborted);
    assert_eq!(report.deactivated, vec!["a:free".to_string()]);
    assert!(targets::list_active_target_ids(&pool)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_vanished_model_is_deactivated_with_history_kept() {
    let server = MockServer::start().await;
    let pool = create_test_db_pool().await;
    let client = OpenRouterClient::new(server.uri(), None).unwrap();
    let discoverer = Discoverer::new(pool.clone(), Arc::new(client));

    mount_catalog(
        &server,
        json!({"data": [{"id": "a:free"}, {"id": "b:free"}]}),
    )
    .await;
    discoverer.run_cycle().await;

    probe_results::insert_probe_result(
        &pool,
        &ProbeResult {
            id: 0,
            target_id: "b:free".to_string(),
            checked_at: chrono::Utc::now(),
            status_code: 200,
            latency_ms: 42,
            success: true,
            error_text: None,
        },
    )
    .await
    .unwrap();

    mount_catalog(&server, json!({"data": [{"id": "a:free"}]})).await;
    let report = discoverer.run_cycle().await;
    assert_eq!(report.deactivated, vec!["b:free".to_string()]);

    let b = targets::get_target(&pool, "b:free").await.unwrap().unwrap();
    assert!(!b.active);
    assert_eq!(
        probe_results::list_for_target(&pool, "b:free")
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        targets::list_active_target_ids(&pool).await.unwrap(),
        vec!["a:free".to_string()]
    );
}

#[tokio::test]
async fn test_upstream_failure_leaves_targets_untouched() {
    let server = MockServer::start().await;
    let pool = create_test_db_pool().await;
    let client = OpenRouterClient::new(server.uri(), None).unwrap();
    let discoverer = Discoverer::new(pool.clone(), Arc::new(client));

    mount_catalog(&server, json!({"data": [{"id": "a:free"}]})).await;
    discoverer.run_cycle().await;

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = discoverer.run_cycle().await;
    assert!(report.aborted);
    assert_eq!(
        targets::list_active_target_ids(&pool).await.unwrap(),
        vec!["a:free".to_string()]
    );
}
