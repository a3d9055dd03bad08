//! 上流プロバイダー（OpenRouter）クライアント
//!
//! カタログ取得（`GET {base}/models`）と最小限の推論呼び出し
//! （`POST {base}/chat/completions`）を提供する。
//! ディスカバリーとプローブはそれぞれ`CatalogSource`・`ProbeTransport`
//! trait越しに利用するため、テストでは差し替えが可能。

use crate::common::error::{CatalogError, MonitorError, ProbeError};
use crate::config::MonitorConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// カタログ取得のタイムアウト
const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// 接続確立のタイムアウト
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// プローブで送信するプロンプト
const PROBE_PROMPT: &str = "Hi";

/// リクエスト元として送信するURL（`HTTP-Referer`ヘッダー）
const APP_REFERER: &str = "https://github.com/karpizin/llm-monitor";

/// アプリケーション名（`X-Title`ヘッダー）
const APP_TITLE: &str = "LLM Monitor";

/// モデルカタログの取得元
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// カタログ全体をJSONとして取得
    async fn fetch_catalog(&self) -> Result<Value, CatalogError>;
}

/// プローブ呼び出しのレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTPステータスコード
    pub status: u16,
    /// レスポンス本文
    pub body: String,
}

/// プローブ呼び出しの送信手段
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// プローブを実行可能か（APIキー未設定なら`false`）
    fn is_ready(&self) -> bool {
        true
    }

    /// 指定モデルに最小限の推論リクエストを送信
    ///
    /// HTTPレスポンスを受け取れた場合はステータスに関わらず`Ok`を返す。
    async fn send_probe(&self, model_id: &str) -> Result<ProbeResponse, ProbeError>;
}

/// OpenRouter HTTPクライアント
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenRouterClient {
    /// 新しいクライアントを作成
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| MonitorError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// 設定からクライアントを作成
    pub fn from_config(config: &MonitorConfig) -> Result<Self, MonitorError> {
        Self::new(
            config.openrouter_base_url.clone(),
            config.openrouter_api_key.clone(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl CatalogSource for OpenRouterClient {
    async fn fetch_catalog(&self) -> Result<Value, CatalogError> {
        let response = self
            .client
            .get(self.url("models"))
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Http(status.as_u16(), body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ProbeTransport for OpenRouterClient {
    fn is_ready(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_probe(&self, model_id: &str) -> Result<ProbeResponse, ProbeError> {
        let payload = json!({
            "model": model_id,
            "messages": [{"role": "user", "content": PROBE_PROMPT}],
            "max_tokens": 1
        });

        let mut request = self
            .client
            .post(self.url("chat/completions"))
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::Body(e.to_string()))?;

        Ok(ProbeResponse { status, body })
    }
}
