//! Integration Test: 通知配信
//!
//! N件のイベントとM人の受信者に対して、1回の配信処理で N×M 件の送信が行われ、
//! 全イベントが配信済みになることを検証する。

use std::sync::Arc;
use std::time::Duration;

use llmmon::db::event_queue;
use llmmon::notify::{Notifier, TelegramClient, TelegramSender};
use llmmon::registry::RecipientRegistry;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::{create_test_db_pool, RecordingSender};

#[tokio::test]
async fn test_drain_fans_out_events_in_order() {
    let pool = create_test_db_pool().await;
    let registry = RecipientRegistry::new(pool.clone());
    for id in ["r1", "r2", "r3"] {
        registry.subscribe(id).await.unwrap();
    }
    for message in ["e1", "e2"] {
        event_queue::enqueue_event(&pool, message).await.unwrap();
    }

    let sender = Arc::new(RecordingSender::default());
    let notifier = Notifier::new(pool.clone(), sender.clone(), Duration::from_secs(5));
    let report = notifier.drain_once().await.unwrap();

    assert_eq!(report.events, 2);
    assert_eq!(report.delivered, 6);
    let sent = sender.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 6);
    // e1 はすべて e2 より先に送られる
    let first_e2 = sent.iter().position(|(_, m)| m == "e2").unwrap();
    assert!(sent[..first_e2].iter().all(|(_, m)| m == "e1"));
    assert!(event_queue::list_pending(&pool).await.unwrap().is_empty());

    let again = notifier.drain_once().await.unwrap();
    assert_eq!(again.events, 0);
}

#[tokio::test]
async fn test_drain_without_recipients_marks_everything_sent() {
    let pool = create_test_db_pool().await;
    event_queue::enqueue_event(&pool, "e1").await.unwrap();

    let sender = Arc::new(RecordingSender::default());
    let notifier = Notifier::new(pool.clone(), sender.clone(), Duration::from_secs(5));
    let report = notifier.drain_once().await.unwrap();

    assert_eq!(report.discarded, 1);
    assert!(sender.sent.lock().unwrap().is_empty());
    assert!(event_queue::list_pending(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subscribe_twice_is_idempotent() {
    let pool = create_test_db_pool().await;
    let registry = RecipientRegistry::new(pool);

    registry.subscribe("555").await.unwrap();
    registry.subscribe("555").await.unwrap();

    assert_eq!(registry.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_drain_through_telegram_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTEST/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(4)
        .mount(&server)
        .await;

    let pool = create_test_db_pool().await;
    let registry = RecipientRegistry::new(pool.clone());
    registry.subscribe("100").await.unwrap();
    registry.subscribe("200").await.unwrap();
    event_queue::enqueue_event(&pool, "🔴 m1 down: HTTP 503")
        .await
        .unwrap();
    event_queue::enqueue_event(&pool, "🟢 m1 restored")
        .await
        .unwrap();

    let sender = TelegramSender::new(TelegramClient::new(&server.uri(), "TEST").unwrap());
    let notifier = Notifier::new(pool.clone(), Arc::new(sender), Duration::from_secs(5));
    let report = notifier.drain_once().await.unwrap();

    assert_eq!(report.delivered, 4);
    assert_eq!(report.failed, 0);
}
