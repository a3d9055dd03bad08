//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to legacy variable names, and the `MonitorConfig` value that is read once
//! at startup and handed to each component's constructor.

use std::time::Duration;

/// OpenRouter API のデフォルトベースURL
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Telegram Bot API のデフォルトベースURL
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// デフォルトのデータベースURL
pub const DEFAULT_DATABASE_URL: &str = "sqlite:monitor.db";

/// Get an environment variable with fallback to a legacy name
///
/// If the new variable name is set, returns its value.
/// If only the old (legacy) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use llmmon::config::get_env_with_fallback;
///
/// let key = get_env_with_fallback("LLMMON_OPENROUTER_API_KEY", "OPENROUTER_API_KEY");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// 空文字列を未設定として扱う
fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// データベースURLを取得
///
/// `LLMMON_DATABASE_URL` を優先し、未設定の場合は旧来の `DB_PATH`（ファイルパス）
/// を `sqlite:` URL に変換して使用する。
pub fn get_database_url() -> String {
    if let Some(url) = non_empty(std::env::var("LLMMON_DATABASE_URL").ok()) {
        return url;
    }
    if let Some(path) = non_empty(std::env::var("DB_PATH").ok()) {
        tracing::warn!(
            "Environment variable 'DB_PATH' is deprecated, use 'LLMMON_DATABASE_URL' instead"
        );
        if path.starts_with("sqlite:") {
            return path;
        }
        return format!("sqlite:{}", path);
    }
    DEFAULT_DATABASE_URL.to_string()
}

/// モニター設定
///
/// 起動時に一度だけ読み込み、各コンポーネントのコンストラクタに渡す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// SQLiteデータベースURL
    pub database_url: String,
    /// OpenRouter APIベースURL
    pub openrouter_base_url: String,
    /// OpenRouter APIキー（未設定時はプローブをスキップ）
    pub openrouter_api_key: Option<String>,
    /// Telegram Botトークン（未設定時はログ出力のみ）
    pub telegram_bot_token: Option<String>,
    /// Telegram Bot APIベースURL
    pub telegram_api_url: String,
    /// ディスカバリー間隔
    pub discovery_interval: Duration,
    /// プローブ間隔
    pub probe_interval: Duration,
    /// 通知キューのポーリング間隔
    pub notify_interval: Duration,
    /// 1回のプローブのタイムアウト
    pub probe_timeout: Duration,
    /// プローブの最大同時実行数
    pub probe_concurrency: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            openrouter_api_key: None,
            telegram_bot_token: None,
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            discovery_interval: Duration::from_secs(3600),
            probe_interval: Duration::from_secs(600),
            notify_interval: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(10),
            probe_concurrency: 4,
        }
    }
}

impl MonitorConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let discovery_secs = get_env_with_fallback_parse(
            "LLMMON_DISCOVERY_INTERVAL_SECS",
            "DISCOVERY_INTERVAL_SECS",
            defaults.discovery_interval.as_secs(),
        );
        let probe_secs = get_env_with_fallback_parse(
            "LLMMON_PROBE_INTERVAL_SECS",
            "PROBE_INTERVAL_SECS",
            defaults.probe_interval.as_secs(),
        );
        let notify_secs = get_env_with_fallback_parse(
            "LLMMON_NOTIFY_INTERVAL_SECS",
            "NOTIFY_INTERVAL_SECS",
            defaults.notify_interval.as_secs(),
        );
        let timeout_secs = get_env_with_fallback_parse(
            "LLMMON_PROBE_TIMEOUT_SECS",
            "PROBE_TIMEOUT_SECS",
            defaults.probe_timeout.as_secs(),
        );
        let concurrency = get_env_with_fallback_parse(
            "LLMMON_PROBE_CONCURRENCY",
            "PROBE_CONCURRENCY",
            defaults.probe_concurrency,
        );

        Self {
            database_url: get_database_url(),
            openrouter_base_url: get_env_with_fallback_or(
                "LLMMON_OPENROUTER_BASE_URL",
                "OPENROUTER_BASE_URL",
                DEFAULT_OPENROUTER_BASE_URL,
            ),
            openrouter_api_key: non_empty(get_env_with_fallback(
                "LLMMON_OPENROUTER_API_KEY",
                "OPENROUTER_API_KEY",
            )),
            telegram_bot_token: non_empty(get_env_with_fallback(
                "LLMMON_TELEGRAM_BOT_TOKEN",
                "TELEGRAM_BOT_TOKEN",
            )),
            telegram_api_url: get_env_with_fallback_or(
                "LLMMON_TELEGRAM_API_URL",
                "TELEGRAM_API_URL",
                DEFAULT_TELEGRAM_API_URL,
            ),
            // 0秒間隔は tokio::time::interval がパニックするため最低1秒
            discovery_interval: Duration::from_secs(discovery_secs.max(1)),
            probe_interval: Duration::from_secs(probe_secs.max(1)),
            notify_interval: Duration::from_secs(notify_secs.max(1)),
            probe_timeout: Duration::from_secs(timeout_secs.max(1)),
            probe_concurrency: concurrency.max(1),
        }
    }
}
