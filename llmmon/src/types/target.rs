//! 監視対象（Target）型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 監視対象モデル
///
/// ディスカバリーサイクルごとに作成・更新される。物理削除は行わず、
/// カタログから消えた場合は`active = false`でソフト無効化する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    /// モデルID（例: "meta-llama/llama-3.2-3b-instruct:free"）
    pub id: String,
    /// 表示名
    pub name: String,
    /// 宣言されたコンテキスト長
    pub context_length: i64,
    /// 画像入力に対応しているか
    pub accepts_images: bool,
    /// 初回検出日時
    pub first_seen: DateTime<Utc>,
    /// 最終検出日時
    pub last_seen: DateTime<Utc>,
    /// 監視対象として有効か
    pub active: bool,
}

impl Target {
    /// 新しい監視対象を作成（検出時刻 = 現在時刻）
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            context_length: 0,
            accepts_images: false,
            first_seen: now,
            last_seen: now,
            active: true,
        }
    }

    /// コンテキスト長を設定
    pub fn with_context_length(mut self, context_length: i64) -> Self {
        self.context_length = context_length;
        self
    }

    /// 画像入力対応フラグを設定
    pub fn with_accepts_images(mut self, accepts_images: bool) -> Self {
        self.accepts_images = accepts_images;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_target_is_active() {
        let target = Target::new("free/model-a", "Model A").with_context_length(8000);
        assert!(target.active);
        assert!(!target.accepts_images);
        assert_eq!(target.context_length, 8000);
        assert_eq!(target.first_seen, target.last_seen);
    }
}
