//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化。各関数は1つの論理操作に閉じた短いトランザクションで、
//! エラーは呼び出し側に返す（呼び出し側はログ出力して次のサイクルで再試行する）。

use chrono::{DateTime, SecondsFormat, Utc};

/// データベース初期化・マイグレーション
pub mod migrations;

/// 監視対象管理
pub mod targets;

/// プローブ結果（追記のみ）
pub mod probe_results;

/// 通知受信者管理
pub mod recipients;

/// 通知キュー
pub mod event_queue;

/// ダッシュボード用の最新状態クエリ
pub mod status;

/// 日時をDB保存用の固定幅RFC3339文字列に変換
///
/// マイクロ秒固定・UTC(`Z`)表記のため、文字列の辞書順が時系列順と一致する。
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// DB保存形式の日時をパース（不正な値は警告を出して現在時刻にフォールバック）
pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(value = %s, error = %e, "Invalid stored timestamp, using current time");
            Utc::now()
        }
    }
}
