pub mod command_handler;
pub mod listener;
pub mod sender;

use crate::config::AppConfig;
use crate::model::NotifyError;
use command_handler::{Replier, TaPipeline};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Telegram Bot API client shared by the listener and every command task.
pub struct TelegramNotifier {
    pub bot_token: String,
    pub api_url: String,
    pub client: Client,
    pub poll_timeout_seconds: u64,
    /// Filled in by `identify`; commands addressed to other bots are ignored.
    pub bot_username: String,
}

#[derive(Debug, Deserialize)]
struct GetMeResponse {
    ok: bool,
    result: Option<BotUser>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    username: Option<String>,
}

/// Pulls the bot's username out of a `getMe` answer.
pub fn parse_username(body: &str) -> Result<String, NotifyError> {
    let me: GetMeResponse =
        serde_json::from_str(body).map_err(|e| NotifyError::Malformed(e.to_string()))?;
    if !me.ok {
        return Err(NotifyError::Malformed(
            me.description.unwrap_or_else(|| "getMe failed".into()),
        ));
    }
    me.result
        .and_then(|user| user.username)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| NotifyError::Malformed("getMe returned no username".into()))
}

impl TelegramNotifier {
    pub fn new(config: &AppConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_seconds))
            .build()?;
        Ok(Self {
            bot_token: config.telegram_bot_token.clone(),
            api_url: config.telegram_api_url.trim_end_matches('/').to_string(),
            client,
            poll_timeout_seconds: config.poll_timeout_seconds,
            bot_username: String::new(),
        })
    }

    /// Asks Telegram who we are and remembers the username.
    pub async fn identify(&mut self) -> Result<(), NotifyError> {
        let response = self.client.get(self.method_url("getMe")).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        self.bot_username = parse_username(&body)?;
        tracing::info!("🤖 Running as @{}", self.bot_username);
        Ok(())
    }

    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    pub async fn set_my_commands(&self) -> Result<(), NotifyError> {
        let commands = serde_json::json!({
            "commands": [
                { "command": "ta", "description": "Technical analysis: /ta [symbol] [interval] [exchange] [screener]" },
                { "command": "start", "description": "Welcome message" },
                { "command": "help", "description": "Command list" }
            ]
        });
        let response = self
            .client
            .post(self.method_url("setMyCommands"))
            .json(&commands)
            .send()
            .await?;
        sender::check_response(response, "setMyCommands").await
    }

    /// Polls for updates until the process stops.
    pub async fn listen_for_commands(notifier: Arc<TelegramNotifier>, pipeline: Arc<TaPipeline>) {
        tracing::info!("▶️ Starting Telegram listener...");
        listener::listen_for_commands(notifier, pipeline).await;
        tracing::info!("🛑 Telegram listener ended.");
    }
}

#[async_trait::async_trait]
impl Replier for TelegramNotifier {
    async fn reply_text(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        sender::send_text(self, chat_id, text).await
    }

    async fn reply_photo(&self, chat_id: i64, png: Vec<u8>, caption: &str) -> Result<(), NotifyError> {
        sender::send_photo(self, chat_id, png, caption).await
    }
}
