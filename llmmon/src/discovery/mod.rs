//! カタログディスカバリー
//!
//! 上流カタログから無料モデルを抽出して監視対象として登録し、
//! カタログから消えたモデルを無効化する（削除はしない）。

pub mod parser;

use crate::db::targets;
use crate::types::Target;
use crate::upstream::CatalogSource;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub use parser::{parse_catalog, CatalogEntry, ParsedCatalog};

/// 1サイクルの実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// カタログ中のエントリ数（スキップ分を除く）
    pub fetched: usize,
    /// IDがなくスキップしたエントリ数
    pub skipped: usize,
    /// 監視対象と判定したエントリ数
    pub monitorable: usize,
    /// 登録・更新に成功した件数
    pub upserted: usize,
    /// 無効化した監視対象ID
    pub deactivated: Vec<String>,
    /// カタログ取得失敗または空のカタログで何も変更しなかった
    pub aborted: bool,
}

/// カタログディスカバラー
#[derive(Clone)]
pub struct Discoverer {
    pool: SqlitePool,
    source: Arc<dyn CatalogSource>,
}

impl Discoverer {
    /// 新しいディスカバラーを作成
    pub fn new(pool: SqlitePool, source: Arc<dyn CatalogSource>) -> Self {
        Self { pool, source }
    }

    /// ディスカバリーを1回実行
    pub async fn run_cycle(&self) -> DiscoveryReport {
        info!("Starting model discovery");

        let catalog = match self.source.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed, keeping current targets");
                return DiscoveryReport {
                    aborted: true,
                    ..Default::default()
                };
            }
        };

        let parsed = parse_catalog(&catalog);
        if parsed.skipped > 0 {
            debug!(skipped = parsed.skipped, "Skipped catalog entries without id");
        }

        let mut report = DiscoveryReport {
            fetched: parsed.entries.len(),
            skipped: parsed.skipped,
            ..Default::default()
        };

        if parsed.entries.is_empty() {
            warn!(
                skipped = report.skipped,
                "Catalog returned no models, skipping update"
            );
            report.aborted = true;
            return report;
        }

        let monitorable: Vec<&CatalogEntry> = parsed.monitorable().collect();
        report.monitorable = monitorable.len();

        if monitorable.is_empty() {
            warn!(
                fetched = report.fetched,
                "Discovery found 0 free models, deactivating all targets"
            );
        }

        let seen_at = Utc::now();
        let mut seen_ids = HashSet::with_capacity(monitorable.len());

        for entry in monitorable {
            seen_ids.insert(entry.id.clone());

            let mut target = Target::new(entry.id.clone(), entry.name.clone())
                .with_context_length(entry.context_length)
                .with_accepts_images(entry.accepts_images);
            target.first_seen = seen_at;
            target.last_seen = seen_at;

            match targets::upsert_target(&self.pool, &target).await {
                Ok(()) => report.upserted += 1,
                Err(e) => {
                    error!(target_id = %entry.id, error = %e, "Failed to save target");
                }
            }
        }

        match targets::deactivate_missing(&self.pool, &seen_ids).await {
            Ok(deactivated) => {
                for id in &deactivated {
                    info!(target_id = %id, "Target no longer in catalog, deactivated");
                }
                report.deactivated = deactivated;
            }
            Err(e) => {
                error!(error = %e, "Failed to deactivate missing targets");
            }
        }

        info!(
            monitorable = report.monitorable,
            upserted = report.upserted,
            deactivated = report.deactivated.len(),
            "Discovery complete"
        );

        report
    }
}
