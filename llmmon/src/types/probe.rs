//! プローブ結果型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 監視対象の状態
///
/// 最新プローブ結果の成否から導出される。プローブ履歴がなければ`Unknown`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    /// 未確認（プローブ履歴なし）
    #[default]
    Unknown,
    /// 稼働中
    Up,
    /// 停止中
    Down,
}

impl TargetState {
    /// 直前のプローブ成否から状態を導出
    pub fn from_last_success(success: Option<bool>) -> Self {
        match success {
            None => Self::Unknown,
            Some(true) => Self::Up,
            Some(false) => Self::Down,
        }
    }

    /// TargetStateを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl FromStr for TargetState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "up" => Self::Up,
            "down" => Self::Down,
            _ => Self::Unknown,
        })
    }
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 1回のプローブ結果（追記のみ、更新・削除しない）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeResult {
    /// レコードID（DBで自動採番、未保存時は0）
    pub id: i64,
    /// 監視対象ID
    pub target_id: String,
    /// 実行日時
    pub checked_at: DateTime<Utc>,
    /// HTTPステータスコード（ネットワーク層に到達しなかった場合は0）
    pub status_code: u16,
    /// 応答時間（ミリ秒）。失敗時も計測する
    pub latency_ms: u64,
    /// 成功フラグ
    pub success: bool,
    /// エラー内容（切り詰め済み）
    pub error_text: Option<String>,
}

/// 最新プローブ結果付きの監視対象（ダッシュボード表示用）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetStatus {
    /// モデルID
    pub id: String,
    /// 表示名
    pub name: String,
    /// コンテキスト長
    pub context_length: i64,
    /// 画像入力対応
    pub accepts_images: bool,
    /// 現在の状態
    pub state: TargetState,
    /// 最新プローブの成否
    pub success: Option<bool>,
    /// 最新プローブのHTTPステータス
    pub status_code: Option<u16>,
    /// 最新プローブの応答時間
    pub latency_ms: Option<u64>,
    /// 最新プローブの実行日時
    pub checked_at: Option<DateTime<Utc>>,
    /// 最新プローブのエラー内容
    pub error_text: Option<String>,
}
