//! 通知配信
//!
//! 通知キューを定期的に読み出し、全受信者へ配信する。
//! 配信はイベント単位で、受信者ごとの失敗は他の受信者に影響しない。
//! 受信者が0人の場合、滞留を防ぐため未配信イベントを配信済みにする。

pub mod sender;
pub mod telegram;

pub use sender::{LogSender, MessageSender};
pub use telegram::{TelegramBot, TelegramClient, TelegramSender};

use crate::db::{event_queue, recipients};
use crate::scheduler::run_periodic;
use crate::shutdown::ShutdownController;
use futures::future::join_all;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 1回の配信処理の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// 処理したイベント数
    pub events: usize,
    /// 成功した配信数（イベント×受信者）
    pub delivered: usize,
    /// 失敗した配信数
    pub failed: usize,
    /// 受信者不在で配信せずに処理済みにしたイベント数
    pub discarded: usize,
}

/// 通知キューの配信担当
#[derive(Clone)]
pub struct Notifier {
    pool: SqlitePool,
    sender: Arc<dyn MessageSender>,
    interval: Duration,
}

impl Notifier {
    /// 新しいNotifierを作成
    pub fn new(pool: SqlitePool, sender: Arc<dyn MessageSender>, interval: Duration) -> Self {
        Self {
            pool,
            sender,
            interval,
        }
    }

    /// 未配信イベントを1回処理
    ///
    /// ストレージエラーが発生した時点でこの回の処理を打ち切る。
    /// 配信済みにする前に中断したイベントは次回再配信される。
    pub async fn drain_once(&self) -> Result<DrainReport, sqlx::Error> {
        let pending = event_queue::list_pending(&self.pool).await?;
        if pending.is_empty() {
            return Ok(DrainReport::default());
        }

        let recipients = recipients::list_recipients(&self.pool).await?;
        if recipients.is_empty() {
            let ids: Vec<i64> = pending.iter().map(|e| e.id).collect();
            event_queue::mark_sent_many(&self.pool, &ids).await?;
            debug!(count = ids.len(), "No recipients, discarded pending events");
            return Ok(DrainReport {
                events: ids.len(),
                discarded: ids.len(),
                ..Default::default()
            });
        }

        let mut report = DrainReport::default();
        for event in pending {
            let deliveries = recipients.iter().map(|recipient| {
                let sender = self.sender.clone();
                let message = event.message.as_str();
                async move {
                    let result = sender.send(&recipient.id, message).await;
                    (recipient.id.as_str(), result)
                }
            });

            for (recipient_id, result) in join_all(deliveries).await {
                match result {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(
                            event_id = event.id,
                            recipient_id = %recipient_id,
                            error = %e,
                            "Failed to deliver notification"
                        );
                    }
                }
            }

            event_queue::mark_sent(&self.pool, event.id).await?;
            report.events += 1;
        }

        info!(
            events = report.events,
            delivered = report.delivered,
            failed = report.failed,
            "Notifications dispatched"
        );
        Ok(report)
    }

    /// シャットダウン要求まで`drain_once`を周期実行
    pub async fn run(self, shutdown: ShutdownController) {
        let notifier = self.clone();
        run_periodic("notify", self.interval, true, shutdown, move || {
            let notifier = notifier.clone();
            async move {
                if let Err(e) = notifier.drain_once().await {
                    error!(error = %e, "Notification drain failed");
                }
            }
        })
        .await;
    }
}
