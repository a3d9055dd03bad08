//! エラー型定義
//!
//! 統一エラー型（thiserror使用）

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// モニター全体のエラー型
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// 外部クライアント向けの安全なエラーメッセージ
    ///
    /// 詳細（`to_string()`）はサーバーログにのみ出力する。
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Database(_) | Self::Migration(_) => "Database error",
            Self::Http(_) => "Upstream service unavailable",
            Self::Io(_) => "Internal server error",
        }
    }

    /// HTTPステータスコード
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// APIエラーレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// エラーメッセージ
    pub error: String,
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        let body = ErrorResponse {
            error: self.external_message().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// カタログ取得エラー
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP接続エラー
    #[error("Connection error: {0}")]
    Connection(String),
    /// HTTPエラーレスポンス
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// パースエラー
    #[error("Parse error: {0}")]
    Parse(String),
}

/// プローブ呼び出しエラー（ネットワーク層に到達しなかった失敗）
#[derive(Debug, Error)]
pub enum ProbeError {
    /// タイムアウト
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
    /// 接続エラー
    #[error("Connection error: {0}")]
    Connection(String),
    /// レスポンス本文の読み取り失敗
    #[error("Malformed response: {0}")]
    Body(String),
}

/// 通知配信エラー
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// 送信先APIへの接続失敗
    #[error("Connection error: {0}")]
    Connection(String),
    /// 送信先APIがエラーを返した
    #[error("Rejected with HTTP {0}: {1}")]
    Rejected(u16, String),
}

/// Result type alias
pub type MonitorResult<T> = Result<T, MonitorError>;
