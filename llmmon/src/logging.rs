//! ロギング初期化
//!
//! 標準出力へのテキスト/JSONログと、`LLMMON_LOG_DIR` 指定時の
//! 日次ローテーションJSONファイルログを構成する。

use crate::config::get_env_with_fallback;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// `LLMMON_LOG_LEVEL` / `RUST_LOG` が未設定の場合のフィルタ
const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// ログファイル名のプレフィックス
const LOG_FILE_PREFIX: &str = "llmmon.log";

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人間向けのコンパクト表示
    Text,
    /// 構造化JSON
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match get_env_with_fallback("LLMMON_LOG_FORMAT", "RUST_LOG_FORMAT")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

fn env_filter() -> EnvFilter {
    get_env_with_fallback("LLMMON_LOG_LEVEL", "RUST_LOG")
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// ロギングを初期化
///
/// ファイル出力が有効な場合は`WorkerGuard`を返す。プロセス終了まで保持すること。
pub fn init() -> Result<Option<WorkerGuard>, tracing_subscriber::util::TryInitError> {
    let stdout_layer = match LogFormat::from_env() {
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
        LogFormat::Text => fmt::layer().compact().with_target(false).boxed(),
    };

    let (file_layer, guard) = match std::env::var("LLMMON_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir.trim(), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .json()
                .boxed();
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
