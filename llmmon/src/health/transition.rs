//! 状態遷移検出
//!
//! 直前のプローブ成否と今回の成否を比較し、稼働↔停止の変化のみを
//! 通知対象の遷移として扱う。初回プローブ（履歴なし）は遷移にならない。

pub use crate::types::probe::TargetState;

/// エラー内容・レスポンス本文の最大文字数
pub const MAX_ERROR_CHARS: usize = 100;

/// 通知対象の状態遷移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 稼働 → 停止
    WentDown,
    /// 停止 → 稼働
    Restored,
}

/// 遷移を検出
pub fn detect_transition(previous: Option<bool>, current: bool) -> Option<Transition> {
    match (previous, current) {
        (Some(true), false) => Some(Transition::WentDown),
        (Some(false), true) => Some(Transition::Restored),
        _ => None,
    }
}

/// 遷移を通知本文に変換
pub fn event_message(target_id: &str, transition: Transition, error: Option<&str>) -> String {
    match transition {
        Transition::WentDown => format!("🔴 {} down: {}", target_id, error.unwrap_or("unknown error")),
        Transition::Restored => format!("🟢 {} restored", target_id),
    }
}

/// 先頭から最大`max`文字に切り詰める（文字境界を保つ）
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
