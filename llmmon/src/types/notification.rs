//! 通知キュー・受信者の型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知キューに積まれたイベント
///
/// `sent`は false → true にのみ遷移する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueuedEvent {
    /// キューID（作成順に単調増加）
    pub id: i64,
    /// 通知本文
    pub message: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 配信処理済みフラグ
    pub sent: bool,
}

/// 通知受信者（チャットID等の不透明な宛先）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    /// 受信者ID
    pub id: String,
    /// 購読開始日時
    pub subscribed_at: DateTime<Utc>,
}
