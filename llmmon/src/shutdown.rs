//! 協調的シャットダウン制御
//!
//! `main.rs`がOSシグナルを受けて要求し、各周期タスクが`wait()`で終了を検知する。

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// 全タスク共有のシャットダウンシグナル
#[derive(Clone, Debug, Default)]
pub struct ShutdownController {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownController {
    /// シャットダウンが要求済みか
    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire)
    }

    /// シャットダウンを要求し、待機中のタスクをすべて起こす
    pub fn request_shutdown(&self) {
        self.inner.requested.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// シャットダウンが要求されるまで待機
    pub async fn wait(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // 要求フラグ確認前に登録しておき、通知の取りこぼしを防ぐ
        notified.as_mut().enable();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_after_request() {
        let shutdown = ShutdownController::default();
        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.wait().await })
        };

        tokio::task::yield_now().await;
        shutdown.request_shutdown();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake up")
            .unwrap();
        assert!(shutdown.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_wait_after_request_returns_immediately() {
        let shutdown = ShutdownController::default();
        shutdown.request_shutdown();
        tokio::time::timeout(Duration::from_millis(100), shutdown.wait())
            .await
            .expect("already requested");
    }
}
