//! CLI module for llmmon
//!
//! Provides the command-line interface for running the monitor and
//! inspecting or editing its database.

pub mod recipients;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};

/// LLM model availability monitor - tracks free OpenRouter models and alerts on outages
#[derive(Parser, Debug)]
#[command(name = "llmmon")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    LLMMON_HOST                     Bind address (default: 0.0.0.0)
    LLMMON_PORT                     Listen port (default: 8000)
    LLMMON_LOG_LEVEL                Log level (default: info)
    LLMMON_LOG_FORMAT               Log format: text or json (default: text)
    LLMMON_LOG_DIR                  Directory for daily rolling JSON logs
    LLMMON_DATABASE_URL             Database URL (legacy: DB_PATH)
    LLMMON_OPENROUTER_API_KEY       OpenRouter API key (legacy: OPENROUTER_API_KEY)
    LLMMON_OPENROUTER_BASE_URL      OpenRouter API base URL
    LLMMON_TELEGRAM_BOT_TOKEN       Telegram bot token (legacy: TELEGRAM_BOT_TOKEN)
    LLMMON_DISCOVERY_INTERVAL_SECS  Catalog discovery interval (default: 3600)
    LLMMON_PROBE_INTERVAL_SECS      Health probe interval (default: 600)
    LLMMON_NOTIFY_INTERVAL_SECS     Notification queue poll interval (default: 5)
    LLMMON_PROBE_TIMEOUT_SECS       Per-probe timeout (default: 10)
    LLMMON_PROBE_CONCURRENCY        Probes in flight (default: 4)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor (discovery, probing, notifications and HTTP API)
    Serve(serve::ServeArgs),
    /// Print the latest state of every monitored model
    Status(status::StatusArgs),
    /// Add a notification recipient
    Subscribe(recipients::RecipientArgs),
    /// Remove a notification recipient
    Unsubscribe(recipients::RecipientArgs),
    /// List notification recipients
    Recipients,
}
