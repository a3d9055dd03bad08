//! serve サブコマンド
//!
//! モニター本体（周期タスクとHTTP API）を起動します。

use crate::config::{get_env_with_fallback_or, get_env_with_fallback_parse};
use clap::Args;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value = "8000", env = "LLMMON_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "LLMMON_HOST")]
    pub host: String,

    /// Run only the background tasks, without the HTTP API
    #[arg(long, default_value_t = false)]
    pub no_api: bool,
}

impl ServeArgs {
    /// サブコマンド省略時の設定（環境変数から読み込む）
    pub fn from_env() -> Self {
        Self {
            port: get_env_with_fallback_parse("LLMMON_PORT", "PORT", 8000),
            host: get_env_with_fallback_or("LLMMON_HOST", "HOST", "0.0.0.0"),
            no_api: false,
        }
    }

    /// `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
