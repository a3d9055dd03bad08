//! 周期実行スケジューラ
//!
//! ディスカバリーとプローブをそれぞれ独立した周期で実行する。
//! ジョブは周期ループ内で直接実行するため、前回の実行中に来たティックは
//! スキップされる（同一ジョブの多重実行は起きない）。

use crate::discovery::Discoverer;
use crate::health::Prober;
use crate::shutdown::ShutdownController;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// パニック後の再起動までの待機時間
const RESTART_DELAY: Duration = Duration::from_secs(1);

/// ジョブを周期実行する（シャットダウン要求まで）
///
/// `delay_first`が`true`の場合、最初の実行は1周期後になる。
/// 実行中のジョブはシャットダウン要求で中断される。
pub async fn run_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    delay_first: bool,
    shutdown: ShutdownController,
    mut job: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        job = name,
        interval_secs = period.as_secs(),
        "Periodic job started"
    );

    if delay_first {
        // `interval()`の初回ティックは即時に完了するため読み捨てる
        timer.tick().await;
    }

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = timer.tick() => {}
        }

        tokio::select! {
            _ = shutdown.wait() => {
                warn!(job = name, "Shutdown requested, abandoning in-flight run");
                break;
            }
            _ = job() => {}
        }
    }

    info!(job = name, "Periodic job stopped");
}

/// 長時間タスクを監視し、パニックした場合は再起動する
///
/// タスクが正常終了した場合、またはシャットダウン要求後は再起動しない。
pub async fn supervise<F, Fut>(name: &'static str, shutdown: ShutdownController, factory: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        match tokio::spawn(factory()).await {
            Ok(()) => return,
            Err(e) if e.is_panic() => {
                error!(task = name, "Task panicked, restarting");
            }
            Err(e) => {
                warn!(task = name, error = %e, "Task cancelled");
                return;
            }
        }

        tokio::select! {
            _ = shutdown.wait() => return,
            _ = tokio::time::sleep(RESTART_DELAY) => {}
        }
    }
}

/// 監視スケジューラ
#[derive(Clone)]
pub struct Scheduler {
    discoverer: Discoverer,
    prober: Prober,
    discovery_interval: Duration,
    probe_interval: Duration,
    shutdown: ShutdownController,
}

impl Scheduler {
    /// 新しいスケジューラを作成
    pub fn new(
        discoverer: Discoverer,
        prober: Prober,
        discovery_interval: Duration,
        probe_interval: Duration,
        shutdown: ShutdownController,
    ) -> Self {
        Self {
            discoverer,
            prober,
            discovery_interval,
            probe_interval,
            shutdown,
        }
    }

    /// スケジューラを実行（シャットダウン要求まで戻らない）
    ///
    /// 初回ディスカバリーを完了させてから、ディスカバリーループ（初回は1周期後）と
    /// プローブループ（初回は即時）を並行して回す。
    pub async fn run(self) {
        tokio::select! {
            _ = self.shutdown.wait() => return,
            _ = self.discoverer.run_cycle() => {}
        }

        let discoverer = self.discoverer.clone();
        let discovery_loop = run_periodic(
            "discovery",
            self.discovery_interval,
            true,
            self.shutdown.clone(),
            move || {
                let discoverer = discoverer.clone();
                async move {
                    discoverer.run_cycle().await;
                }
            },
        );

        let prober = self.prober.clone();
        let probe_loop = run_periodic(
            "probe",
            self.probe_interval,
            false,
            self.shutdown.clone(),
            move || {
                let prober = prober.clone();
                async move {
                    prober.run_cycle().await;
                }
            },
        );

        tokio::join!(discovery_loop, probe_loop);
    }
}
