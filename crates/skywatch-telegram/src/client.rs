//! Telegram Bot API client.

use reqwest::Response;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use skywatch_core::{
    NotificationSink, ReqwestErrorExt, SinkError, TelegramConfig, TelegramCredentials,
};

pub const REQUEST_TIMEOUT_SECS: u64 = 15;
const PARSE_MODE: &str = "Markdown";

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: reqwest::Client,
    credentials: TelegramCredentials,
    base_url: String,
}

impl TelegramClient {
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(
        credentials: TelegramCredentials,
        settings: &TelegramConfig,
    ) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ReqwestErrorExt::into_sink_error)?;

        Ok(Self {
            client,
            credentials,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.credentials.bot_token, method)
    }

    /// Send `text` to the configured chat with Markdown parsing enabled.
    ///
    /// # Errors
    /// `ServerError` on non-2xx, `Rejected` when the API answers `ok: false`,
    /// `Timeout`/`ConnectionFailed` on transport failure.
    #[instrument(skip(self, text), fields(chat_id = %self.credentials.chat_id, len = text.len()), level = "info")]
    pub async fn send_message(&self, text: &str) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .form(&[
                ("chat_id", self.credentials.chat_id.as_str()),
                ("text", text),
                ("parse_mode", PARSE_MODE),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_sink_error)?;

        self.handle_response(response).await?;
        tracing::info!("Message delivered");
        Ok(())
    }

    async fn handle_response(&self, response: Response) -> Result<(), SinkError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ReqwestErrorExt::into_sink_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse>(&body)
                .ok()
                .and_then(|r| r.description)
                .unwrap_or(body);
            return Err(SinkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let api: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| SinkError::Rejected(format!("unreadable response: {}", e)))?;

        if api.ok {
            Ok(())
        } else {
            Err(SinkError::Rejected(
                api.description.unwrap_or_else(|| "ok=false".to_string()),
            ))
        }
    }
}

impl NotificationSink for TelegramClient {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), SinkError> {
        self.send_message(text).await
    }
}
