// notifier/telegram/sender.rs

use crate::model::NotifyError;
use crate::notifier::telegram::TelegramNotifier;
use reqwest::Response;
use reqwest::multipart::{Form, Part};
use tracing::{info, warn};

/// Turns a non-2xx Bot API answer into `NotifyError::Rejected`.
pub async fn check_response(response: Response, what: &str) -> Result<(), NotifyError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        warn!("❌ Telegram {} error [{}]: {}", what, status, body);
        return Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    info!("✅ Telegram {} sent [{}]", what, status);
    Ok(())
}

/// Sends a plain text message.
pub async fn send_text(
    notifier: &TelegramNotifier,
    chat_id: i64,
    text: &str,
) -> Result<(), NotifyError> {
    let params = [("chat_id", chat_id.to_string()), ("text", text.to_string())];
    let response = notifier
        .client
        .post(notifier.method_url("sendMessage"))
        .form(&params)
        .send()
        .await?;
    check_response(response, "text").await
}

/// Sends the chart as a photo with a Markdown caption.
pub async fn send_photo(
    notifier: &TelegramNotifier,
    chat_id: i64,
    png: Vec<u8>,
    caption: &str,
) -> Result<(), NotifyError> {
    info!("📤 Sending chart ({} bytes) to chat {}", png.len(), chat_id);
    let photo = Part::bytes(png)
        .file_name("chart.png")
        .mime_str("image/png")?;
    let form = Form::new()
        .text("chat_id", chat_id.to_string())
        .text("caption", caption.to_string())
        .text("parse_mode", "Markdown")
        .part("photo", photo);

    let response = notifier
        .client
        .post(notifier.method_url("sendPhoto"))
        .multipart(form)
        .send()
        .await?;
    check_response(response, "photo").await
}
