//! 型定義モジュール
//!
//! ドメインエンティティの型定義を提供

/// 監視対象モデルの型定義
pub mod target;

/// プローブ結果・ステータスの型定義
pub mod probe;

/// 通知キュー・受信者の型定義
pub mod notification;

pub use notification::{QueuedEvent, Recipient};
pub use probe::{ProbeResult, TargetStatus};
pub use target::Target;
