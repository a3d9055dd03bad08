//! ヘルスプローブ
//!
//! 有効な監視対象へ最小限の推論リクエストを送り、結果を記録する。
//! 稼働↔停止の遷移を検出した場合は通知キューにイベントを積む。

pub mod prober;
pub mod transition;

pub use prober::{ProbeCycleReport, ProbeOutcome, Prober};
pub use transition::{detect_transition, event_message, Transition};
