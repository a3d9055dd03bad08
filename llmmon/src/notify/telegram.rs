//! Telegram Bot API連携
//!
//! `sendMessage`による通知送信と、`getUpdates`ロングポーリングによる
//! 購読コマンド（`/start`・`/subscribe`・`/unsubscribe`・`/status`）の受付。

use super::sender::MessageSender;
use crate::common::error::{DeliveryError, MonitorError};
use crate::db::status::list_target_status;
use crate::health::transition::{truncate_chars, TargetState, MAX_ERROR_CHARS};
use crate::registry::RecipientRegistry;
use crate::shutdown::ShutdownController;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// `getUpdates`のロングポーリング待ち時間（秒）
const POLL_TIMEOUT_SECS: u64 = 30;

/// HTTPリクエストのタイムアウト（ロングポーリング待ち時間より長くする）
const REQUEST_TIMEOUT: Duration = Duration::from_secs(POLL_TIMEOUT_SECS + 10);

/// ポーリング失敗後の再試行間隔
const RETRY_DELAY: Duration = Duration::from_secs(5);

const HELP_TEXT: &str = "👋 I am LLM Monitor Bot.\n\
I watch OpenRouter free models for you.\n\n\
Commands:\n\
/subscribe - Get alerts when models go down/up\n\
/unsubscribe - Stop alerts\n\
/status - Show current stats";

/// Telegram Bot APIクライアント
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    bot_url: String,
}

/// `getUpdates`の1件
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// 更新ID（次回オフセット算出に使う）
    pub update_id: i64,
    /// メッセージ（コマンド以外の更新では存在しない）
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

/// 受信メッセージ
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// 送信元チャット
    pub chat: Chat,
    /// 本文
    #[serde(default)]
    pub text: Option<String>,
}

/// チャット
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// チャットID
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramClient {
    /// 新しいクライアントを作成
    pub fn new(api_url: &str, token: &str) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MonitorError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            bot_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    /// `sendMessage`
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.bot_url))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| DeliveryError::Connection(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected(
            status.as_u16(),
            truncate_chars(&body, MAX_ERROR_CHARS),
        ))
    }

    /// `getUpdates`（ロングポーリング）
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, DeliveryError> {
        let response = self
            .client
            .get(format!("{}/getUpdates", self.bot_url))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
            ])
            .send()
            .await
            .map_err(|e| DeliveryError::Connection(e.without_url().to_string()))?;

        let status = response.status();
        let parsed: UpdatesResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Rejected(status.as_u16(), e.to_string()))?;

        if !parsed.ok {
            return Err(DeliveryError::Rejected(
                status.as_u16(),
                parsed.description.unwrap_or_default(),
            ));
        }
        Ok(parsed.result)
    }
}

/// Telegram経由の通知送信
#[derive(Clone)]
pub struct TelegramSender {
    api: TelegramClient,
}

impl TelegramSender {
    /// 新しい送信手段を作成
    pub fn new(api: TelegramClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryError> {
        self.api.send_message(recipient_id, text).await
    }
}

/// 購読コマンドを受け付けるBot
#[derive(Clone)]
pub struct TelegramBot {
    api: TelegramClient,
    registry: RecipientRegistry,
    pool: SqlitePool,
}

impl TelegramBot {
    /// 新しいBotを作成
    pub fn new(api: TelegramClient, pool: SqlitePool) -> Self {
        Self {
            api,
            registry: RecipientRegistry::new(pool.clone()),
            pool,
        }
    }

    /// シャットダウン要求までコマンドをポーリング
    pub async fn run(self, shutdown: ShutdownController) {
        info!("Telegram command polling started");
        let mut offset = 0;

        loop {
            let polled = tokio::select! {
                _ = shutdown.wait() => break,
                polled = self.poll_once(offset, POLL_TIMEOUT_SECS) => polled,
            };

            match polled {
                Ok(next) => offset = next,
                Err(e) => {
                    warn!(error = %e, "Telegram polling failed, retrying");
                    tokio::select! {
                        _ = shutdown.wait() => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("Telegram command polling stopped");
    }

    /// 更新を1回取得して処理し、次回のオフセットを返す
    pub async fn poll_once(&self, offset: i64, timeout_secs: u64) -> Result<i64, DeliveryError> {
        let updates = self.api.get_updates(offset, timeout_secs).await?;

        let mut next = offset;
        for update in updates {
            next = next.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text.as_deref() else {
                continue;
            };
            let chat_id = message.chat.id.to_string();

            if let Some(reply) = self.handle_command(&chat_id, text).await {
                if let Err(e) = self.api.send_message(&chat_id, &reply).await {
                    warn!(chat_id = %chat_id, error = %e, "Failed to send command reply");
                }
            }
        }
        Ok(next)
    }

    /// コマンドを処理して返信本文を返す（未知のメッセージは`None`）
    pub async fn handle_command(&self, chat_id: &str, text: &str) -> Option<String> {
        let command = parse_command(text)?;
        debug!(chat_id = %chat_id, command = %command, "Received command");

        let reply = match command {
            "start" | "help" => HELP_TEXT.to_string(),
            "subscribe" => match self.registry.subscribe(chat_id).await {
                Ok(_) => "✅ Subscribed to alerts!".to_string(),
                Err(e) => {
                    error!(chat_id = %chat_id, error = %e, "Failed to subscribe");
                    "❌ Database error.".to_string()
                }
            },
            "unsubscribe" => match self.registry.unsubscribe(chat_id).await {
                Ok(_) => "🔕 Unsubscribed.".to_string(),
                Err(e) => {
                    error!(chat_id = %chat_id, error = %e, "Failed to unsubscribe");
                    "❌ Database error.".to_string()
                }
            },
            "status" => match list_target_status(&self.pool).await {
                Ok(rows) => status_summary(rows.iter().map(|r| r.state)),
                Err(e) => {
                    error!(error = %e, "Failed to load status");
                    "❌ Database error.".to_string()
                }
            },
            _ => return None,
        };
        Some(reply)
    }
}

/// `/command@botname args` からコマンド名を取り出す
fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let command = first.strip_prefix('/')?;
    let command = command.split('@').next().unwrap_or(command);
    (!command.is_empty()).then_some(command)
}

/// 状態ごとの件数を1行にまとめる
fn status_summary(states: impl Iterator<Item = TargetState>) -> String {
    let (mut up, mut down, mut unknown) = (0, 0, 0);
    for state in states {
        match state {
            TargetState::Up => up += 1,
            TargetState::Down => down += 1,
            TargetState::Unknown => unknown += 1,
        }
    }
    format!(
        "📊 {} models monitored: 🟢 {} up, 🔴 {} down, ⚪ {} unchecked",
        up + down + unknown,
        up,
        down,
        unknown
    )
}
