// notifier/telegram/listener.rs

use crate::notifier::telegram::TelegramNotifier;
use crate::notifier::telegram::command_handler::{TaPipeline, handle_command};
use serde::Deserialize;
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct TelegramApiResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<TelegramUpdate>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

/// Long-polls `getUpdates` and hands every text message to its own task.
pub async fn listen_for_commands(notifier: Arc<TelegramNotifier>, pipeline: Arc<TaPipeline>) {
    let url = notifier.method_url("getUpdates");
    let poll = notifier.poll_timeout_seconds;
    let mut offset: i64 = 0;

    loop {
        let response = notifier
            .client
            .get(&url)
            .query(&[("offset", offset.to_string()), ("timeout", poll.to_string())])
            .timeout(Duration::from_secs(poll + 10))
            .send()
            .await;

        let api_response = match response {
            Ok(resp) => resp.json::<TelegramApiResponse>().await,
            Err(e) => {
                warn!("getUpdates failed: {:?}", e);
                sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        let updates = match api_response {
            Ok(api) if api.ok => api.result,
            Ok(api) => {
                warn!("getUpdates rejected: {}", api.description.unwrap_or_default());
                sleep(Duration::from_secs(5)).await;
                continue;
            }
            Err(e) => {
                warn!("getUpdates returned unreadable body: {:?}", e);
                sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        for update in updates {
            offset = update.update_id + 1;
            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };

            let chat_id = message.chat.id;
            info!("Received `{}` from chat {}", text, chat_id);
            let notifier = notifier.clone();
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                let outcome = handle_command(
                    &text,
                    chat_id,
                    &notifier.bot_username,
                    &pipeline,
                    notifier.as_ref(),
                )
                .await;
                info!("Chat {} `{}` -> {:?}", chat_id, text, outcome);
            });
        }
    }
}
