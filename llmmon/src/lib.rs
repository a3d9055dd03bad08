//! LLM model availability monitor
//!
//! 無料LLMモデルのカタログを定期的に取得し、各モデルへ最小限の推論リクエストを
//! 送って稼働状況を記録する。稼働↔停止の変化は通知キュー経由で購読者へ配信する。

#![warn(missing_docs)]

/// 共通型定義（エラー型）
pub mod common;

/// HTTP API（ステータス・ヘルスチェック）
pub mod api;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// カタログディスカバリー
pub mod discovery;

/// ヘルスプローブと状態遷移検出
pub mod health;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 通知配信
pub mod notify;

/// 通知受信者管理
pub mod registry;

/// 周期実行スケジューラ
pub mod scheduler;

/// 協調的シャットダウン制御
pub mod shutdown;

/// 型定義
pub mod types;

/// 上流プロバイダークライアント
pub mod upstream;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
}
