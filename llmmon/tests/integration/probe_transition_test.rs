//! Integration Test: プローブと状態遷移
//!
//! 成否の列 [成功, 成功, 失敗, 失敗, 成功] に対して、3回目（停止）と
//! 5回目（復旧）のサイクルでのみ通知イベントが積まれることを検証する。

use std::sync::Arc;
use std::time::Duration;

use llmmon::db::{event_queue, probe_results, targets};
use llmmon::health::Prober;
use llmmon::types::Target;

use crate::support::{create_test_db_pool, ScriptedTransport};

#[tokio::test]
async fn test_events_only_on_transitions() {
    let pool = create_test_db_pool().await;
    targets::upsert_target(&pool, &Target::new("m1", "m1"))
        .await
        .unwrap();

    let transport = ScriptedTransport::new().script("m1", &[true, true, false, false, true]);
    let prober = Prober::new(pool.clone(), Arc::new(transport), Duration::from_secs(5), 4);

    let mut pending_after_cycle = Vec::new();
    for _ in 0..5 {
        prober.run_cycle().await;
        pending_after_cycle.push(event_queue::list_pending(&pool).await.unwrap().len());
    }
    assert_eq!(pending_after_cycle, vec![0, 0, 1, 1, 2]);

    let messages: Vec<_> = event_queue::list_pending(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "🔴 m1 down: HTTP 503: Provider returned error".to_string(),
            "🟢 m1 restored".to_string(),
        ]
    );

    let history = probe_results::list_for_target(&pool, "m1").await.unwrap();
    let outcomes: Vec<_> = history.iter().map(|r| r.success).collect();
    assert_eq!(outcomes, vec![true, true, false, false, true]);
}

#[tokio::test]
async fn test_cycle_probes_only_active_targets() {
    let pool = create_test_db_pool().await;
    for id in ["a", "b", "c"] {
        targets::upsert_target(&pool, &Target::new(id, id))
            .await
            .unwrap();
    }
    let seen = ["a".to_string(), "b".to_string()].into_iter().collect();
    targets::deactivate_missing(&pool, &seen).await.unwrap();

    let prober = Prober::new(
        pool.clone(),
        Arc::new(ScriptedTransport::new()),
        Duration::from_secs(5),
        2,
    );
    let report = prober.run_cycle().await;

    assert_eq!(report.probed, 2);
    assert!(probe_results::list_for_target(&pool, "c")
        .await
        .unwrap()
        .is_empty());
}
