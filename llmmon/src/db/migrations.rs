// データベース初期化とマイグレーション実行

use crate::common::error::{MonitorError, MonitorResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// 書き込み競合時のロック待ち時間
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// プールの最大接続数
const MAX_CONNECTIONS: u32 = 8;

/// SQLiteデータベース接続プールを作成してマイグレーションを実行
///
/// 起動時にのみ呼ばれ、失敗はプロセスにとって致命的なエラーとして扱う。
///
/// # Arguments
/// * `database_url` - データベースURL（例: "sqlite:data/monitor.db"）
pub async fn initialize_database(database_url: &str) -> MonitorResult<SqlitePool> {
    ensure_parent_dir(database_url)?;

    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(connect_options)
        .await?;

    run_migrations(&pool).await?;

    tracing::info!(database_url = %database_url, "Database initialized");
    Ok(pool)
}

/// マイグレーションを実行
pub async fn run_migrations(pool: &SqlitePool) -> MonitorResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// SQLiteファイルはディレクトリが存在しないと作成できないため、先に作成しておく
fn ensure_parent_dir(database_url: &str) -> Result<(), MonitorError> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    // `sqlite::memory:` のような特殊指定はスキップ
    if path.starts_with(':') {
        return Ok(());
    }
    let normalized = path.trim_start_matches("//");
    let path_without_params = normalized.split('?').next().unwrap_or(normalized);
    if let Some(parent) = std::path::Path::new(path_without_params).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
